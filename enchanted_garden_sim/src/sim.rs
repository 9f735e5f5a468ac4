// Core simulation state, clock and command handling.
//
// `SimState` is the single source of truth for the whole garden. It owns the
// grid, the weather and moon, the resource pool, discovery sets, score,
// achievement log, the active notification, the event queue, the PRNG, the
// config and the plant catalog. The sim is a pure function:
// `(state, commands, target_ms) -> (state', events)`.
//
// ## Clock
//
// Garden time is `now_ms`, a millisecond counter that only moves when the
// caller asks (`step()` / `advance_to()`). The sim never reads system time.
// Everything periodic or delayed is an entry on the `EventQueue`:
//
//   - `GardenTick { generation }` every `tick_interval_ms`, only while not
//     paused. Pausing removes the pending tick from the queue and bumps
//     `tick_generation`, so any tick that survives (a restored save) is
//     stale; resuming schedules a fresh tick one interval later.
//   - `WeatherCheck` at each weather change time. Not gated by pause.
//   - `DeliverNotification` for delayed messages (a combination's flavor
//     text follows its discovery banner).
//   - `DismissNotification` to clear the active notification.
//
// Within one millisecond, commands apply before events, and events fire in
// `(time_ms, sequence)` order.
//
// ## Garden tick
//
// `run_garden_tick()`: count the tick, run the ecosystem over every plant
// (see `ecosystem.rs`), advance the moon, unlock milestones, regenerate
// resources.
//
// ## Commands
//
// `apply()` handles one `SimAction` atomically and returns a
// `CommandResult`. Failures change nothing except the notification slot.
// While paused every action except `Pause`/`Resume` fails with `Paused`.
//
// See also: `ecosystem.rs` for the per-plant update, `breeding.rs`,
// `combination.rs`, `achievement.rs`, `economy.rs` for the subsystems the
// handlers call into, `snapshot.rs` for the read-only view.
//
// **Critical constraint: determinism.** All randomness comes from `rng`; all
// ordered collections are `BTreeMap`/`BTreeSet` or row-major vectors. Two
// sims with the same seed, config, catalog and command script produce
// identical snapshots.

use crate::achievement::{self, AchievementEntry, AchievementKind, AchievementLog, Progress};
use crate::breeding;
use crate::catalog::PlantCatalog;
use crate::combination::DiscoverySets;
use crate::command::{CommandEffect, CommandError, CommandResult, SimAction, SimCommand};
use crate::config::GameConfig;
use crate::economy::ResourcePool;
use crate::event::{EventQueue, ScheduledEventKind, SimEvent, SimEventKind};
use crate::grid::{GardenGrid, PlantInstance};
use crate::moon::MoonClock;
use crate::types::{GridCoord, Rarity, Severity, Species};
use crate::weather::WeatherSystem;
use enchanted_garden_prng::{GameRng, RandomSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The notification currently on screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveNotification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub shown_at_ms: u64,
}

/// Top-level simulation state. This is the entire garden.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimState<R = GameRng> {
    /// Current garden time.
    pub now_ms: u64,

    /// Garden ticks run so far (pause does not count).
    pub elapsed_ticks: u64,

    pub rng: R,

    /// Immutable after construction.
    pub config: GameConfig,
    pub catalog: PlantCatalog,

    pub paused: bool,

    /// Only `GardenTick` events carrying this generation run.
    pub tick_generation: u64,

    pub event_queue: EventQueue,

    pub grid: GardenGrid,
    pub weather: WeatherSystem,
    pub moon: MoonClock,
    pub resources: ResourcePool,
    pub discoveries: DiscoverySets,
    pub score: u64,
    pub achievements: AchievementLog,

    /// First cell of a two-step cross-pollination, if one is selected.
    pub pending_selection: Option<GridCoord>,

    /// Mean cell magic over the whole grid, capped at 100. Feeds the next
    /// tick's magical influence.
    pub magic_level: f32,
    /// Mean health of living plants (100 when the garden is empty).
    pub ecosystem_health: f32,
    /// Sum of every plant's pollinator count on the last tick.
    pub pollinators: u32,

    pub active_notification: Option<ActiveNotification>,
    next_notification_id: u64,
}

/// The result of processing commands and advancing the simulation.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    /// Every event emitted during the step, in order, including those of
    /// the commands.
    pub events: Vec<SimEvent>,
    /// One result per applied command, in application order.
    pub command_results: Vec<CommandResult>,
}

impl SimState {
    /// Create a garden with the default config and catalog.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GameConfig::default(), PlantCatalog::default())
    }

    pub fn with_config(seed: u64, config: GameConfig, catalog: PlantCatalog) -> Self {
        Self::with_rng(GameRng::new(seed), config, catalog)
    }
}

impl<R: RandomSource> SimState<R> {
    /// Create a garden drawing from an arbitrary random source. Config and
    /// catalog are assumed validated (their `from_json` constructors do so).
    pub fn with_rng(rng: R, config: GameConfig, catalog: PlantCatalog) -> Self {
        let grid = GardenGrid::new(config.grid_width, config.grid_height);
        let weather = WeatherSystem::new(config.initial_weather, 0);
        let moon = MoonClock::new(config.magic.moon_cycle_length);
        let resources = ResourcePool::from_config(&config);

        let mut state = Self {
            now_ms: 0,
            elapsed_ticks: 0,
            rng,
            config,
            catalog,
            paused: false,
            tick_generation: 0,
            event_queue: EventQueue::new(),
            grid,
            weather,
            moon,
            resources,
            discoveries: DiscoverySets::default(),
            score: 0,
            achievements: AchievementLog::default(),
            pending_selection: None,
            magic_level: 0.0,
            ecosystem_health: 100.0,
            pollinators: 0,
            active_notification: None,
            next_notification_id: 0,
        };

        state.schedule_garden_tick();
        let first_change = state
            .weather
            .next_change_ms(state.config.weather_change_interval_ms);
        state
            .event_queue
            .schedule(first_change, ScheduledEventKind::WeatherCheck);
        state
    }

    // -----------------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------------

    /// Apply a batch of commands and advance garden time to `target_ms`,
    /// processing every scheduled event due on the way.
    ///
    /// Commands must be sorted by `at_ms`. A command stamped earlier than
    /// `now_ms` applies at `now_ms`; commands later than `target_ms` are
    /// ignored (caller error).
    pub fn step(&mut self, commands: &[SimCommand], target_ms: u64) -> StepResult {
        let mut result = StepResult::default();
        let mut cmd_idx = 0;

        loop {
            let next_cmd = commands.get(cmd_idx).filter(|c| c.at_ms <= target_ms);
            let next_event = self.event_queue.peek_time().filter(|&t| t <= target_ms);

            match (next_cmd, next_event) {
                (Some(cmd), Some(event_ms)) if cmd.at_ms > event_ms => {
                    self.process_next_event(target_ms, &mut result.events);
                }
                (Some(cmd), _) => {
                    cmd_idx += 1;
                    self.now_ms = self.now_ms.max(cmd.at_ms);
                    let applied = self.apply(&cmd.action);
                    result.events.extend(applied.events.iter().cloned());
                    result.command_results.push(applied);
                }
                (None, Some(_)) => self.process_next_event(target_ms, &mut result.events),
                (None, None) => break,
            }
        }

        self.now_ms = self.now_ms.max(target_ms);
        result
    }

    /// Advance garden time without commands.
    pub fn advance_to(&mut self, target_ms: u64) -> Vec<SimEvent> {
        self.step(&[], target_ms).events
    }

    /// Time of the next scheduled event, if any.
    pub fn next_event_ms(&self) -> Option<u64> {
        self.event_queue.peek_time()
    }

    fn process_next_event(&mut self, target_ms: u64, events: &mut Vec<SimEvent>) {
        if let Some(event) = self.event_queue.pop_due(target_ms) {
            self.now_ms = self.now_ms.max(event.time_ms);
            self.process_event(event.kind, events);
        }
    }

    fn process_event(&mut self, kind: ScheduledEventKind, events: &mut Vec<SimEvent>) {
        match kind {
            ScheduledEventKind::GardenTick { generation } => {
                if self.paused || generation != self.tick_generation {
                    return;
                }
                self.run_garden_tick(events);
                self.schedule_garden_tick();
            }
            ScheduledEventKind::WeatherCheck => {
                let interval = self.config.weather_change_interval_ms;
                if let Some(weather) = self.weather.update(self.now_ms, interval, &mut self.rng) {
                    debug!(%weather, at_ms = self.now_ms, "weather changed");
                    self.emit(events, SimEventKind::WeatherChanged { weather });
                    let icon = self.config.weather(weather).icon.clone();
                    self.notify(format!("{icon} Weather changed to {weather}"), Severity::Info, events);
                }
                let next = self.weather.next_change_ms(interval);
                self.event_queue.schedule(next, ScheduledEventKind::WeatherCheck);
            }
            ScheduledEventKind::DeliverNotification { message, severity } => {
                self.notify(message, severity, events);
            }
            ScheduledEventKind::DismissNotification { id } => {
                if self.active_notification.as_ref().is_some_and(|n| n.id == id) {
                    self.active_notification = None;
                    self.emit(events, SimEventKind::NotificationDismissed { id });
                }
            }
        }
    }

    fn schedule_garden_tick(&mut self) {
        let at = self.now_ms + self.config.tick_interval_ms;
        self.event_queue.schedule(
            at,
            ScheduledEventKind::GardenTick {
                generation: self.tick_generation,
            },
        );
    }

    fn run_garden_tick(&mut self, events: &mut Vec<SimEvent>) {
        self.elapsed_ticks += 1;
        self.simulate_ecosystem(events);
        self.moon.advance();
        self.unlock_milestones(events);
        let weather = self.weather.current;
        self.resources.regenerate(weather, &self.config, &mut self.rng);
        let tick = self.elapsed_ticks;
        self.emit(events, SimEventKind::TickCompleted { tick });
    }

    fn unlock_milestones(&mut self, events: &mut Vec<SimEvent>) {
        let progress = Progress {
            elapsed_ticks: self.elapsed_ticks,
            score: self.score,
            rare_discoveries: self.discoveries.rare_plants_seen.len(),
        };
        let pending =
            achievement::pending_milestones(&progress, &self.config.achievements, &self.achievements);
        for milestone in pending {
            let name = milestone.name().to_string();
            self.achievements.unlock(AchievementEntry {
                name: name.clone(),
                kind: AchievementKind::Milestone(milestone),
                unlocked_at_tick: self.elapsed_ticks,
            });
            info!(achievement = %name, tick = self.elapsed_ticks, "achievement unlocked");
            self.emit(events, SimEventKind::AchievementUnlocked { name: name.clone() });
            self.notify(format!("🏅 Achievement Unlocked: {name}"), Severity::Success, events);
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply one action at the current garden time.
    pub fn apply(&mut self, action: &SimAction) -> CommandResult {
        let mut events = Vec::new();
        let outcome = self.apply_action(action, &mut events);
        if let Err(err) = &outcome {
            debug!(?action, %err, "command rejected");
            self.notify(format!("❌ {}", capitalize(&err.to_string())), Severity::Error, &mut events);
        }
        CommandResult { outcome, events }
    }

    fn apply_action(
        &mut self,
        action: &SimAction,
        events: &mut Vec<SimEvent>,
    ) -> Result<CommandEffect, CommandError> {
        match *action {
            SimAction::Pause => return Ok(self.pause(events)),
            SimAction::Resume => return Ok(self.resume(events)),
            _ if self.paused => return Err(CommandError::Paused),
            _ => {}
        }

        match *action {
            SimAction::Plant { coord, species } => {
                self.pending_selection = None;
                self.plant(coord, species, events)
            }
            SimAction::Water { coord } => {
                self.pending_selection = None;
                self.water(coord, events)
            }
            SimAction::Remove { coord } => {
                self.pending_selection = None;
                self.remove(coord, events)
            }
            SimAction::SelectForCrossPollination { coord } => self.select(coord, events),
            SimAction::Pause | SimAction::Resume => Ok(CommandEffect::Unchanged),
        }
    }

    fn pause(&mut self, events: &mut Vec<SimEvent>) -> CommandEffect {
        if self.paused {
            return CommandEffect::Unchanged;
        }
        self.paused = true;
        self.tick_generation += 1;
        self.event_queue.cancel_garden_ticks();
        self.emit(events, SimEventKind::SimPaused);
        CommandEffect::Paused
    }

    fn resume(&mut self, events: &mut Vec<SimEvent>) -> CommandEffect {
        if !self.paused {
            return CommandEffect::Unchanged;
        }
        self.paused = false;
        self.schedule_garden_tick();
        self.emit(events, SimEventKind::SimResumed);
        CommandEffect::Resumed
    }

    fn plant(
        &mut self,
        coord: GridCoord,
        species: Species,
        events: &mut Vec<SimEvent>,
    ) -> Result<CommandEffect, CommandError> {
        if !self.grid.is_empty(coord) {
            return Err(CommandError::TileOccupied);
        }
        let rarity = self.catalog.get(species).rarity;
        self.resources.spend_seed(rarity)?;

        self.place_plant(coord, species, events);
        self.score += self.config.rarity(rarity).score;
        self.emit(events, SimEventKind::PlantPlaced { coord, species });
        let name = self.catalog.get(species).name.clone();
        self.notify(format!("🌱 Planted {name}!"), Severity::Success, events);
        self.check_combinations(coord, events);
        Ok(CommandEffect::Planted { coord, species })
    }

    fn water(
        &mut self,
        coord: GridCoord,
        events: &mut Vec<SimEvent>,
    ) -> Result<CommandEffect, CommandError> {
        if self.grid.is_empty(coord) {
            return Err(CommandError::EmptyCellSelected);
        }
        self.resources.spend_water(self.config.economy.water_cost)?;

        let amount = self.config.economy.water_amount;
        let max = self.config.plant.stat_max;
        let mut water = 0.0;
        if let Some(plant) = self.grid.get_mut(coord) {
            plant.water = (plant.water + amount).min(max);
            water = plant.water;
        }
        self.notify("💧 Watered plant!".to_string(), Severity::Info, events);
        Ok(CommandEffect::Watered { coord, water })
    }

    fn remove(
        &mut self,
        coord: GridCoord,
        events: &mut Vec<SimEvent>,
    ) -> Result<CommandEffect, CommandError> {
        let plant = self.grid.take(coord).ok_or(CommandError::EmptyCellSelected)?;
        let species = plant.species;
        let data = self.catalog.get(species);
        let (rarity, name) = (data.rarity, data.name.clone());
        self.resources.refund_seed(rarity, &self.config);
        self.emit(events, SimEventKind::PlantRemoved { coord, species });
        self.notify(format!("🗑️ Removed {name}"), Severity::Warning, events);
        Ok(CommandEffect::Removed { coord, species })
    }

    fn select(
        &mut self,
        coord: GridCoord,
        events: &mut Vec<SimEvent>,
    ) -> Result<CommandEffect, CommandError> {
        if self.grid.is_empty(coord) {
            return Err(CommandError::EmptyCellSelected);
        }
        match self.pending_selection.take() {
            None => {
                self.pending_selection = Some(coord);
                self.notify(
                    format!("🔍 Selected first plant at {coord}. Select another adjacent plant."),
                    Severity::Info,
                    events,
                );
                Ok(CommandEffect::SelectionPending { coord })
            }
            Some(first) => self.breed_manual(first, coord, events),
        }
    }

    fn breed_manual(
        &mut self,
        first: GridCoord,
        second: GridCoord,
        events: &mut Vec<SimEvent>,
    ) -> Result<CommandEffect, CommandError> {
        let cost = self.config.economy.breeding_magic_cost;
        let plan = breeding::plan_manual(
            &self.grid,
            &self.catalog,
            &self.resources,
            cost,
            first,
            second,
            &mut self.rng,
        )?;
        self.resources.spend_magic(cost)?;

        let parents = [first, second];
        self.announce_breeding(parents, plan.offspring, plan.target, false, events);
        Ok(CommandEffect::Bred {
            parents,
            offspring: plan.offspring,
            at: plan.target,
        })
    }

    /// Place a bred plant and report it. Shared by manual breeding and
    /// automatic spread.
    pub(crate) fn announce_breeding(
        &mut self,
        parents: [GridCoord; 2],
        offspring: Species,
        at: GridCoord,
        automatic: bool,
        events: &mut Vec<SimEvent>,
    ) {
        let name_of = |c: GridCoord, grid: &GardenGrid, catalog: &PlantCatalog| {
            grid.species_at(c)
                .map(|s| catalog.get(s).name.clone())
                .unwrap_or_default()
        };
        let a = name_of(parents[0], &self.grid, &self.catalog);
        let b = name_of(parents[1], &self.grid, &self.catalog);
        let child = self.catalog.get(offspring).name.clone();

        self.place_plant(at, offspring, events);
        debug!(?parents, %offspring, %at, automatic, "plant bred");
        self.emit(
            events,
            SimEventKind::PlantBred {
                parents,
                offspring,
                at,
                automatic,
            },
        );
        self.notify(
            format!("💕 Cross-pollinated {a} and {b} to create {child}!"),
            Severity::Special,
            events,
        );
        self.check_combinations(at, events);
    }

    // -----------------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------------

    /// Put a new sprout on an empty cell and record it if it is the first
    /// of a rare-or-better species. Callers follow up with
    /// `check_combinations()` once their own notification is out.
    pub(crate) fn place_plant(
        &mut self,
        coord: GridCoord,
        species: Species,
        events: &mut Vec<SimEvent>,
    ) {
        let data = self.catalog.get(species);
        let rarity = data.rarity;
        let name = data.name.clone();
        self.grid
            .place(coord, PlantInstance::sprout(species, data, &self.config));

        if rarity != Rarity::Common && self.discoveries.see_rare(species) {
            self.score += self.config.rarity(rarity).score;
            info!(%species, %rarity, "rare species discovered");
            self.emit(events, SimEventKind::RareSpeciesDiscovered { species, rarity });
            self.notify(format!("🏆 New discovery: {name}!"), Severity::Success, events);
        }
    }

    /// Discover every special combination completed around a newly placed
    /// plant. The banner shows now; the flavor message follows after
    /// `flavor_message_delay_ms`.
    pub(crate) fn check_combinations(&mut self, coord: GridCoord, events: &mut Vec<SimEvent>) {
        let found: Vec<_> = self
            .discoveries
            .discover_around(&self.grid, &self.catalog, coord)
            .into_iter()
            .cloned()
            .collect();
        for combo in found {
            self.achievements.unlock(AchievementEntry {
                name: combo.achievement.clone(),
                kind: AchievementKind::Combination {
                    combo_id: combo.id.clone(),
                    message: combo.message.clone(),
                },
                unlocked_at_tick: self.elapsed_ticks,
            });
            info!(combo = %combo.id, achievement = %combo.achievement, "combination discovered");
            self.emit(
                events,
                SimEventKind::CombinationDiscovered {
                    combo_id: combo.id.clone(),
                },
            );
            self.notify(
                format!("💝 {} Discovered!", combo.achievement),
                Severity::Magic,
                events,
            );
            let deliver_at = self.now_ms + self.config.notifications.flavor_message_delay_ms;
            self.event_queue.schedule(
                deliver_at,
                ScheduledEventKind::DeliverNotification {
                    message: combo.message,
                    severity: Severity::Special,
                },
            );
        }
    }

    /// Make `message` the active notification and schedule its dismissal.
    pub(crate) fn notify(&mut self, message: String, severity: Severity, events: &mut Vec<SimEvent>) {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        let params = &self.config.notifications;
        let delay = if severity == Severity::Special {
            params.special_dismiss_ms
        } else {
            params.dismiss_ms
        };
        self.event_queue
            .schedule(self.now_ms + delay, ScheduledEventKind::DismissNotification { id });
        self.active_notification = Some(ActiveNotification {
            id,
            message: message.clone(),
            severity,
            shown_at_ms: self.now_ms,
        });
        self.emit(
            events,
            SimEventKind::Notification {
                id,
                message,
                severity,
            },
        );
    }

    pub(crate) fn emit(&self, events: &mut Vec<SimEvent>, kind: SimEventKind) {
        events.push(SimEvent {
            at_ms: self.now_ms,
            kind,
        });
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
