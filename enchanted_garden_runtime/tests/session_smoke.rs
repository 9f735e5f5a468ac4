// Integration smoke test for the garden session actor.
//
// Starts a session with a fast tick (20 ms garden ticks), plants through the
// handle, watches the output channel for ticks and snapshots, pauses and
// resumes, and stops the actor to take the garden back. Timings are generous
// so the test is stable on a loaded machine.

use std::thread;
use std::time::{Duration, Instant};

use enchanted_garden_runtime::session::{SessionError, start_session};
use enchanted_garden_sim::command::{CommandEffect, CommandError, SimAction};
use enchanted_garden_sim::config::GameConfig;
use enchanted_garden_sim::event::SimEventKind;
use enchanted_garden_sim::sim::SimState;
use enchanted_garden_sim::types::{GridCoord, Species};
use enchanted_garden_sim::PlantCatalog;

fn fast_sim() -> SimState {
    let config = GameConfig {
        tick_interval_ms: 20,
        ..GameConfig::default()
    };
    SimState::with_config(5, config, PlantCatalog::default())
}

#[test]
fn full_session_lifecycle() {
    // 1. Start the actor.
    let (handle, outputs) = start_session(fast_sim());

    // 2. Plant through the handle; the result comes back synchronously.
    let planted = handle
        .command(SimAction::Plant {
            coord: GridCoord::new(5, 5),
            species: Species::Rose,
        })
        .unwrap();
    assert_eq!(
        planted.outcome,
        Ok(CommandEffect::Planted {
            coord: GridCoord::new(5, 5),
            species: Species::Rose
        })
    );

    // 3. Ticks arrive on the output channel with snapshots attached.
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut ticks = 0;
    while ticks < 3 && Instant::now() < deadline {
        if let Ok(output) = outputs.recv_timeout(Duration::from_millis(200)) {
            ticks += output
                .events
                .iter()
                .filter(|e| matches!(e.kind, SimEventKind::TickCompleted { .. }))
                .count();
            assert!(output.snapshot.plant_at(GridCoord::new(5, 5)).is_some());
        }
    }
    assert!(ticks >= 3, "only saw {ticks} ticks");

    // 4. Pause: commands are rejected and ticks stop.
    let paused = handle.command(SimAction::Pause).unwrap();
    assert_eq!(paused.outcome, Ok(CommandEffect::Paused));
    let rejected = handle
        .command(SimAction::Water {
            coord: GridCoord::new(5, 5),
        })
        .unwrap();
    assert_eq!(rejected.outcome, Err(CommandError::Paused));
    let ticks_at_pause = handle.snapshot().unwrap().elapsed_ticks;
    thread::sleep(Duration::from_millis(150));
    assert_eq!(handle.snapshot().unwrap().elapsed_ticks, ticks_at_pause);

    // 5. Resume and stop; the garden comes back with its history.
    handle.command(SimAction::Resume).unwrap();
    thread::sleep(Duration::from_millis(100));
    let sim = handle.stop().unwrap();
    assert!(sim.elapsed_ticks > ticks_at_pause);
    assert_eq!(sim.grid.species_at(GridCoord::new(5, 5)), Some(Species::Rose));
}

#[test]
fn snapshot_without_commands() {
    let (handle, _outputs) = start_session(fast_sim());
    thread::sleep(Duration::from_millis(70));
    let snapshot = handle.snapshot().unwrap();
    assert!(snapshot.elapsed_ticks >= 1);
    assert!(snapshot.plants.is_empty());
    assert!(snapshot.resources.magic >= 50.0);
    handle.stop().unwrap();
}

#[test]
fn session_error_messages() {
    assert_eq!(
        SessionError::Stopped.to_string(),
        "garden session is no longer running"
    );
}
