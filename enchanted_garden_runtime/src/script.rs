// Command scripts for headless and real-time runs.
//
// A script is a JSON array of `SimCommand`s:
//
//   [
//     { "at_ms": 0, "action": { "Plant": { "coord": { "x": 5, "y": 5 }, "species": "ROSE" } } },
//     { "at_ms": 2000, "action": "Pause" }
//   ]
//
// Loading checks every targeted coordinate against the grid size, so an
// out-of-range cell never reaches the sim (where it would panic), and sorts
// the commands by `at_ms` (stable, so same-time commands keep file order).

use std::path::{Path, PathBuf};

use enchanted_garden_sim::command::SimCommand;
use enchanted_garden_sim::types::GridCoord;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("script JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("command {index} targets {coord}, outside the {width}x{height} garden")]
    OutOfBounds {
        index: usize,
        coord: GridCoord,
        width: u32,
        height: u32,
    },
}

pub fn load_script(path: &Path, width: u32, height: u32) -> Result<Vec<SimCommand>, ScriptError> {
    let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&json, width, height)
}

pub fn parse_script(json: &str, width: u32, height: u32) -> Result<Vec<SimCommand>, ScriptError> {
    let mut commands: Vec<SimCommand> = serde_json::from_str(json)?;
    for (index, command) in commands.iter().enumerate() {
        if let Some(coord) = command.action.coord() {
            let inside = coord.x >= 0
                && coord.y >= 0
                && (coord.x as u32) < width
                && (coord.y as u32) < height;
            if !inside {
                return Err(ScriptError::OutOfBounds {
                    index,
                    coord,
                    width,
                    height,
                });
            }
        }
    }
    commands.sort_by_key(|c| c.at_ms);
    Ok(commands)
}
