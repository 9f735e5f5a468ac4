// Commands that mutate the garden.
//
// All external mutations go through `SimCommand`. The sim is a function
// `(state, commands, time) -> (state', events)`; commands are the only input
// from the view layer. Each command is applied atomically between event
// batches and yields a `CommandResult`: either a `CommandEffect` describing
// what changed or a `CommandError` naming why nothing changed. Domain
// failures are never fatal; the sim also surfaces them as error
// notifications.
//
// Actions:
// - `Plant`: consume a seed of the species' tier and place a sprout.
// - `Water`: spend pool water to raise one plant's water.
// - `Remove`: clear a cell and refund one seed.
// - `SelectForCrossPollination`: two-step manual breeding (see
//   `breeding.rs`).
// - `Pause` / `Resume`: gate the garden tick.
//
// See also: `sim.rs` for `apply()` which dispatches these, `event.rs` for the
// events a command can emit.
//
// **Critical constraint: determinism.** Commands are the sole external input
// to the sim. Everything else comes from scheduled events.

use crate::event::SimEvent;
use crate::types::{GridCoord, Rarity, Species};
use serde::{Deserialize, Serialize};

/// A view-layer command stamped with the garden time it applies at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimCommand {
    pub at_ms: u64,
    pub action: SimAction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimAction {
    Plant { coord: GridCoord, species: Species },
    Water { coord: GridCoord },
    Remove { coord: GridCoord },
    /// First call records a pending selection; the second attempts manual
    /// breeding between the two cells.
    SelectForCrossPollination { coord: GridCoord },
    Pause,
    Resume,
}

impl SimAction {
    /// The grid cell this action targets, if any.
    pub fn coord(&self) -> Option<GridCoord> {
        match self {
            SimAction::Plant { coord, .. }
            | SimAction::Water { coord }
            | SimAction::Remove { coord }
            | SimAction::SelectForCrossPollination { coord } => Some(*coord),
            SimAction::Pause | SimAction::Resume => None,
        }
    }
}

/// Named reasons a command changed nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CommandError {
    #[error("no {rarity} seeds left")]
    InsufficientSeeds { rarity: Rarity },
    #[error("not enough water")]
    InsufficientWater,
    #[error("not enough magic")]
    InsufficientResource,
    #[error("that tile is already occupied")]
    TileOccupied,
    #[error("there is no plant on that tile")]
    EmptyCellSelected,
    #[error("plants must be adjacent to cross-pollinate")]
    NotAdjacent,
    #[error("these plants cannot produce offspring")]
    NoOffspringPossible,
    #[error("no empty space available for offspring")]
    NoEmptySpace,
    #[error("the garden is paused")]
    Paused,
}

/// What a successful command did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CommandEffect {
    Planted { coord: GridCoord, species: Species },
    Watered { coord: GridCoord, water: f32 },
    Removed { coord: GridCoord, species: Species },
    /// First half of a cross-pollination: the cell is now selected.
    SelectionPending { coord: GridCoord },
    Bred {
        parents: [GridCoord; 2],
        offspring: Species,
        at: GridCoord,
    },
    Paused,
    Resumed,
    /// Pause while paused, or resume while running.
    Unchanged,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub outcome: Result<CommandEffect, CommandError>,
    /// Events emitted while applying the command, including the error
    /// notification on failure.
    pub events: Vec<SimEvent>,
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_json_roundtrip() {
        let cmd = SimCommand {
            at_ms: 2500,
            action: SimAction::Plant {
                coord: GridCoord::new(3, 4),
                species: Species::Moonflower,
            },
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"MOONFLOWER\""));
        let restored: SimCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cmd);
    }

    #[test]
    fn unit_actions_parse_from_strings() {
        let action: SimAction = serde_json::from_str("\"Pause\"").unwrap();
        assert_eq!(action, SimAction::Pause);
        assert_eq!(action.coord(), None);
    }

    #[test]
    fn error_messages_read_as_notifications() {
        assert_eq!(
            CommandError::InsufficientSeeds {
                rarity: Rarity::Epic
            }
            .to_string(),
            "no epic seeds left"
        );
        assert_eq!(
            CommandError::NoEmptySpace.to_string(),
            "no empty space available for offspring"
        );
    }
}
