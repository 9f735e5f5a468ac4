// Cross-module scenario tests for the garden simulation.
//
// Each test drives a `SimState` only through its public surface (commands,
// `step` / `advance_to`, snapshots) and checks one end-to-end property:
// breeding, pause isolation, seed caps, seed conservation, combination
// idempotence, bounds over long runs.

use enchanted_garden_sim::command::{CommandEffect, CommandError, SimAction, SimCommand};
use enchanted_garden_sim::config::GameConfig;
use enchanted_garden_sim::economy::ResourcePool;
use enchanted_garden_sim::event::{SimEvent, SimEventKind};
use enchanted_garden_sim::prng::GameRng;
use enchanted_garden_sim::sim::SimState;
use enchanted_garden_sim::types::{GridCoord, Rarity, Severity, Species, WeatherKind};
use enchanted_garden_sim::PlantCatalog;

fn at(x: i32, y: i32) -> GridCoord {
    GridCoord::new(x, y)
}

fn plant(sim: &mut SimState, x: i32, y: i32, species: Species) -> Vec<SimEvent> {
    let result = sim.apply(&SimAction::Plant {
        coord: at(x, y),
        species,
    });
    assert!(result.is_ok(), "planting {species} at ({x}, {y}): {:?}", result.outcome);
    result.events
}

fn select(sim: &mut SimState, x: i32, y: i32) -> (Result<CommandEffect, CommandError>, Vec<SimEvent>) {
    let result = sim.apply(&SimAction::SelectForCrossPollination { coord: at(x, y) });
    (result.outcome, result.events)
}

fn combo_events(events: &[SimEvent], id: &str) -> usize {
    events
        .iter()
        .filter(|e| matches!(&e.kind, SimEventKind::CombinationDiscovered { combo_id } if combo_id == id))
        .count()
}

#[test]
fn rose_and_moonflower_cross_pollinate() {
    for seed in 0..20 {
        let mut sim = SimState::new(seed);
        let mut events = Vec::new();
        events.extend(plant(&mut sim, 5, 5, Species::Rose));
        events.extend(plant(&mut sim, 5, 6, Species::Moonflower));
        assert_eq!(sim.resources.magic, 50.0);

        let (first, first_events) = select(&mut sim, 5, 5);
        assert_eq!(first, Ok(CommandEffect::SelectionPending { coord: at(5, 5) }));
        events.extend(first_events);
        let (outcome, bred_events) = select(&mut sim, 5, 6);
        events.extend(bred_events);

        let Ok(CommandEffect::Bred { offspring, at: child, .. }) = outcome else {
            panic!("seed {seed}: breeding failed: {outcome:?}");
        };
        assert_eq!(sim.resources.magic, 40.0);
        assert_eq!(sim.grid.plant_count(), 3);
        assert!(child.is_adjacent_to(at(5, 5)) || child.is_adjacent_to(at(5, 6)));
        assert!([Species::RainbowIris, Species::Rose, Species::Moonflower].contains(&offspring));
        assert_eq!(sim.grid.species_at(child), Some(offspring));

        assert_eq!(combo_events(&events, "ROSE_MOONFLOWER"), 1);
        assert!(sim.discoveries.combos_discovered.contains("ROSE_MOONFLOWER"));
        let entries = sim
            .achievements
            .entries()
            .iter()
            .filter(|e| e.name == "Moonlit Wonder")
            .count();
        assert_eq!(entries, 1);
    }
}

#[test]
fn low_magic_always_fails_breeding() {
    let mut sim = SimState::new(4);
    plant(&mut sim, 5, 5, Species::Rose);
    plant(&mut sim, 5, 6, Species::Moonflower);
    plant(&mut sim, 12, 12, Species::Thistle);
    sim.resources.magic = 9.99;

    for (a, b) in [((5, 5), (5, 6)), ((5, 5), (12, 12)), ((5, 6), (5, 6))] {
        let (pending, _) = select(&mut sim, a.0, a.1);
        assert_eq!(pending, Ok(CommandEffect::SelectionPending { coord: at(a.0, a.1) }));
        let (outcome, _) = select(&mut sim, b.0, b.1);
        assert_eq!(outcome, Err(CommandError::InsufficientResource));
        assert_eq!(sim.resources.magic, 9.99);
    }
    assert_eq!(sim.grid.plant_count(), 3);
}

#[test]
fn paused_tick_changes_nothing() {
    let mut sim = SimState::new(21);
    plant(&mut sim, 3, 3, Species::Sunflower);
    plant(&mut sim, 4, 3, Species::Sage);
    plant(&mut sim, 3, 4, Species::Moonflower);
    sim.advance_to(4500);
    sim.apply(&SimAction::Pause);

    let capture = |sim: &SimState| {
        (
            serde_json::to_string(&sim.grid).unwrap(),
            serde_json::to_string(&sim.resources).unwrap(),
            sim.score,
            serde_json::to_string(&sim.discoveries).unwrap(),
        )
    };
    let before = capture(&sim);
    let ticks = sim.elapsed_ticks;
    sim.advance_to(20_000);
    assert_eq!(capture(&sim), before);
    assert_eq!(sim.elapsed_ticks, ticks);
}

#[test]
fn seed_regeneration_respects_caps() {
    let config = GameConfig::default();
    let mut pool = ResourcePool::from_config(&config);
    let mut rng = GameRng::new(99);
    for i in 0..50_000 {
        let weather = WeatherKind::ALL[i % WeatherKind::ALL.len()];
        pool.regenerate(weather, &config, &mut rng);
        for (tier, count) in pool.seeds.iter() {
            assert!(count <= config.rarity(tier).seed_cap, "{tier} at {count}");
        }
        assert!((0.0..=100.0).contains(&pool.water));
        assert!((0.0..=100.0).contains(&pool.magic));
    }
    assert_eq!(pool.seeds.count(Rarity::Common), 20);
}

#[test]
fn remove_then_replant_conserves_seeds() {
    let mut sim = SimState::new(8);
    for (species, tier) in [(Species::Rose, Rarity::Common), (Species::ShadowVine, Rarity::Rare)] {
        plant(&mut sim, 7, 7, species);
        let held = sim.resources.seeds.count(tier);
        let removed = sim.apply(&SimAction::Remove { coord: at(7, 7) });
        assert_eq!(removed.outcome, Ok(CommandEffect::Removed { coord: at(7, 7), species }));
        assert_eq!(sim.resources.seeds.count(tier), held + 1);
        plant(&mut sim, 7, 7, species);
        assert_eq!(sim.resources.seeds.count(tier), held);
        sim.apply(&SimAction::Remove { coord: at(7, 7) });
    }
}

#[test]
fn combination_is_discovered_once() {
    let mut sim = SimState::new(13);
    let mut events = Vec::new();
    events.extend(plant(&mut sim, 5, 5, Species::Lavender));
    events.extend(plant(&mut sim, 6, 5, Species::Sage));
    events.extend(sim.apply(&SimAction::Remove { coord: at(6, 5) }).events);
    events.extend(plant(&mut sim, 6, 5, Species::Sage));
    events.extend(plant(&mut sim, 4, 5, Species::Sage));
    events.extend(sim.advance_to(10_000));

    assert_eq!(combo_events(&events, "LAVENDER_SAGE"), 1);
    assert_eq!(sim.achievements.len(), 1);
    let flavor = events
        .iter()
        .filter(|e| matches!(e.kind, SimEventKind::Notification { severity: Severity::Special, .. }))
        .count();
    assert_eq!(flavor, 1);
}

#[test]
fn long_run_keeps_stats_in_bounds() {
    let mut sim = SimState::new(2024);
    let species = [
        Species::Rose,
        Species::Sunflower,
        Species::Sage,
        Species::Lavender,
        Species::Thistle,
        Species::Moonflower,
        Species::ShadowVine,
        Species::RainbowIris,
    ];
    let commands: Vec<SimCommand> = species
        .iter()
        .enumerate()
        .map(|(i, &species)| SimCommand {
            at_ms: 0,
            action: SimAction::Plant {
                coord: at(8 + (i as i32 % 4), 6 + (i as i32 / 4)),
                species,
            },
        })
        .collect();
    sim.step(&commands, 0);

    let caps: Vec<(Rarity, u32)> = Rarity::ALL
        .into_iter()
        .map(|tier| (tier, sim.config.rarity(tier).seed_cap))
        .collect();
    for tick in 1..=900u64 {
        sim.advance_to(tick * 1000);
        for (coord, p) in sim.grid.plants() {
            assert!((0.0..=100.0).contains(&p.health), "health at {coord}: {}", p.health);
            assert!((0.0..=100.0).contains(&p.water), "water at {coord}: {}", p.water);
            assert!((0.0..=100.0).contains(&p.magic), "magic at {coord}: {}", p.magic);
            assert!(p.growth >= 0.0);
        }
        for &(tier, cap) in &caps {
            assert!(sim.resources.seeds.count(tier) <= cap);
        }
        assert!((0.0..=100.0).contains(&sim.magic_level));
        assert!((0.0..=100.0).contains(&sim.ecosystem_health));
    }
    assert_eq!(sim.elapsed_ticks, 900);
}

#[test]
fn scripted_session_replays_identically() {
    let commands = vec![
        SimCommand {
            at_ms: 0,
            action: SimAction::Plant {
                coord: at(2, 2),
                species: Species::Sunflower,
            },
        },
        SimCommand {
            at_ms: 1200,
            action: SimAction::Plant {
                coord: at(3, 2),
                species: Species::Rose,
            },
        },
        SimCommand {
            at_ms: 30_000,
            action: SimAction::Water { coord: at(3, 2) },
        },
        SimCommand {
            at_ms: 45_000,
            action: SimAction::Pause,
        },
        SimCommand {
            at_ms: 50_000,
            action: SimAction::Resume,
        },
    ];
    let run = || {
        let mut sim = SimState::new(77);
        let result = sim.step(&commands, 200_000);
        (result.events, sim.snapshot().to_json().unwrap())
    };
    assert_eq!(run(), run());
}

#[test]
fn config_and_catalog_load_from_json() {
    let config = GameConfig::from_json(r#"{ "tick_interval_ms": 250, "grid_width": 8, "grid_height": 6 }"#)
        .unwrap();
    let catalog = PlantCatalog::from_json(&PlantCatalog::default().to_json().unwrap()).unwrap();
    let mut sim = SimState::with_config(5, config, catalog);
    sim.advance_to(1000);
    assert_eq!(sim.elapsed_ticks, 4);
    assert_eq!(sim.grid.cell_count(), 48);
}
