// enchanted_garden_runtime: drives a garden simulation in real time.
//
// The sim crate is a pure function of commands and garden time. This crate
// supplies the parts that touch the outside world: a session actor that owns
// a `SimState` on its own thread and feeds it real elapsed time, command
// scripts loaded from disk, and the `garden` binary (`main.rs`).
//
// Module overview:
// - `session.rs`: Actor thread, `SessionHandle` (command / snapshot / stop),
//                 and the output channel of events plus snapshots.
// - `script.rs`:  JSON command scripts, validated against the grid size.
//
// The library never installs a tracing subscriber; the binary does.

pub mod script;
pub mod session;

pub use session::{SessionError, SessionHandle, SessionOutput, start_session};
