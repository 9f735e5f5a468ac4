// enchanted_garden_sim: pure Rust garden simulation library.
//
// This crate contains all simulation logic for the Enchanted Garden: the
// plant catalog, the grid, weather and moon, the per-tick ecosystem update,
// breeding, combination discovery, the seed/water/magic economy,
// achievements, notifications and the command interface. It has no threads
// and no I/O and can be tested, benchmarked, and run headless.
//
// Module overview:
// - `sim.rs`:         Top-level SimState, event loop, command handlers, notifications.
// - `ecosystem.rs`:   Per-tick plant update (needs, magic, moonlight, resonance, evolution, spread).
// - `grid.rs`:        GardenGrid + PlantInstance, row-major cell storage.
// - `catalog.rs`:     PlantCatalog: data-driven species and special combinations.
// - `breeding.rs`:    Manual cross-pollination plans and automatic spread.
// - `combination.rs`: Special-combination discovery and rare-species bookkeeping.
// - `economy.rs`:     ResourcePool: water, magic, per-tier seed bank.
// - `achievement.rs`: Milestones and the achievement log.
// - `weather.rs`:     Weather cycle on its own timer.
// - `moon.rs`:        Moon phase and strength.
// - `command.rs`:     SimCommand / SimAction, CommandError, CommandResult.
// - `event.rs`:       EventQueue (priority queue) + SimEvents for the view layer.
// - `config.rs`:      GameConfig: every tunable balance number.
// - `snapshot.rs`:    GardenSnapshot, the read-only view of the garden.
// - `prng`:           Re-exported from `enchanted_garden_prng`.
// - `types.rs`:       GridCoord, Species, Rarity, WeatherKind and other small enums.
//
// The companion crate `enchanted_garden_runtime` drives a SimState in real
// time on its own thread and provides the `garden` binary.
//
// **Critical constraint: determinism.** The simulation is a pure function:
// `(state, commands, target time) -> (new_state, events)`. All randomness
// comes from a seeded `RandomSource` owned by the state. No `HashMap`, no
// system time, no OS entropy. Use `BTreeMap` for ordered collections.

pub mod achievement;
pub mod breeding;
pub mod catalog;
pub mod combination;
pub mod command;
pub mod config;
pub mod economy;
pub mod ecosystem;
pub mod event;
pub mod grid;
pub mod moon;
pub use enchanted_garden_prng as prng;
pub mod sim;
pub mod snapshot;
pub mod types;
pub mod weather;

pub use catalog::PlantCatalog;
pub use command::{CommandError, CommandResult, SimAction, SimCommand};
pub use config::GameConfig;
pub use event::{SimEvent, SimEventKind};
pub use sim::{SimState, StepResult};
pub use snapshot::GardenSnapshot;
