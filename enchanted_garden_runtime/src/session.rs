// Real-time session actor for a garden simulation.
//
// Architecture: one actor thread owns the `SimState`; everything else talks
// to it through an `mpsc` channel.
//
// - **Actor thread**: converts real elapsed time into garden time
//   (`base_ms + elapsed`), calls `advance_to()`, and publishes any events on
//   the output channel together with a fresh snapshot. It then waits on the
//   request channel with `recv_timeout` until the next scheduled sim event,
//   so ticks, weather checks and notification timers fire on time without a
//   separate timer thread.
// - **Requests** (`SessionHandle`): commands and snapshot queries carry a
//   reply channel. A command is applied at the current garden time, after
//   every event due by then, so no tick ever interleaves with a half-applied
//   command. A command aimed outside the grid is refused before it reaches
//   the sim, whose grid indexing panics on such a cell.
//
// Shutdown: `SessionHandle::stop()` sends `Shutdown` and joins the thread,
// getting the final `SimState` back. Dropping every handle also ends the
// loop (the request channel disconnects).

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use enchanted_garden_sim::command::{CommandResult, SimAction};
use enchanted_garden_sim::event::SimEvent;
use enchanted_garden_sim::sim::SimState;
use enchanted_garden_sim::snapshot::GardenSnapshot;
use enchanted_garden_sim::types::GridCoord;
use tracing::{debug, info, warn};

/// Longest the actor sleeps when nothing is scheduled.
const IDLE_WAIT: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("garden session is no longer running")]
    Stopped,
    #[error("garden session thread panicked")]
    Panicked,
    #[error("{coord} is outside the {width}x{height} garden")]
    OutOfBounds {
        coord: GridCoord,
        width: u32,
        height: u32,
    },
}

/// Events produced by one batch of garden time or one command, plus the
/// garden as it looks afterwards.
#[derive(Clone, Debug)]
pub struct SessionOutput {
    pub events: Vec<SimEvent>,
    pub snapshot: GardenSnapshot,
}

enum Request {
    Command {
        action: SimAction,
        reply: Sender<Result<CommandResult, SessionError>>,
    },
    Snapshot {
        reply: Sender<GardenSnapshot>,
    },
    Shutdown,
}

/// Handle returned by `start_session` to drive the running garden.
pub struct SessionHandle {
    requests: Sender<Request>,
    thread: Option<thread::JoinHandle<SimState>>,
}

impl SessionHandle {
    /// Apply one action at the current garden time and wait for its result.
    pub fn command(&self, action: SimAction) -> Result<CommandResult, SessionError> {
        let (reply, result) = mpsc::channel();
        self.requests
            .send(Request::Command { action, reply })
            .map_err(|_| SessionError::Stopped)?;
        result.recv().map_err(|_| SessionError::Stopped)?
    }

    pub fn snapshot(&self) -> Result<GardenSnapshot, SessionError> {
        let (reply, result) = mpsc::channel();
        self.requests
            .send(Request::Snapshot { reply })
            .map_err(|_| SessionError::Stopped)?;
        result.recv().map_err(|_| SessionError::Stopped)
    }

    /// Signal the actor to stop, wait for it, and take back the garden.
    pub fn stop(mut self) -> Result<SimState, SessionError> {
        let _ = self.requests.send(Request::Shutdown);
        let thread = self.thread.take().ok_or(SessionError::Stopped)?;
        thread.join().map_err(|_| SessionError::Panicked)
    }
}

/// Start the actor on a background thread. Garden time continues from the
/// state's current `now_ms`.
pub fn start_session(sim: SimState) -> (SessionHandle, Receiver<SessionOutput>) {
    let (requests, inbox) = mpsc::channel();
    let (outputs, output_rx) = mpsc::channel();
    let thread = thread::spawn(move || run_session(sim, inbox, outputs));
    (
        SessionHandle {
            requests,
            thread: Some(thread),
        },
        output_rx,
    )
}

/// Maps real elapsed time onto garden time.
struct GardenClock {
    started: Instant,
    base_ms: u64,
}

impl GardenClock {
    fn now_ms(&self) -> u64 {
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.base_ms.saturating_add(elapsed)
    }
}

fn run_session(mut sim: SimState, inbox: Receiver<Request>, outputs: Sender<SessionOutput>) -> SimState {
    let clock = GardenClock {
        started: Instant::now(),
        base_ms: sim.now_ms,
    };
    info!(at_ms = sim.now_ms, "garden session started");

    loop {
        catch_up(&mut sim, &clock, &outputs);

        let wait = sim
            .next_event_ms()
            .map(|due| Duration::from_millis(due.saturating_sub(clock.now_ms())))
            .unwrap_or(IDLE_WAIT)
            .min(IDLE_WAIT);

        match inbox.recv_timeout(wait) {
            Ok(Request::Command { action, reply }) => {
                catch_up(&mut sim, &clock, &outputs);
                let _ = reply.send(apply_command(&mut sim, &action, &outputs));
            }
            Ok(Request::Snapshot { reply }) => {
                catch_up(&mut sim, &clock, &outputs);
                let _ = reply.send(sim.snapshot());
            }
            Ok(Request::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    info!(at_ms = sim.now_ms, ticks = sim.elapsed_ticks, "garden session stopped");
    sim
}

fn apply_command(
    sim: &mut SimState,
    action: &SimAction,
    outputs: &Sender<SessionOutput>,
) -> Result<CommandResult, SessionError> {
    if let Some(coord) = action.coord().filter(|&c| !sim.grid.in_bounds(c)) {
        warn!(?action, "command outside the garden");
        return Err(SessionError::OutOfBounds {
            coord,
            width: sim.grid.width(),
            height: sim.grid.height(),
        });
    }
    let result = sim.apply(action);
    match &result.outcome {
        Ok(effect) => debug!(?action, ?effect, at_ms = sim.now_ms, "command applied"),
        Err(err) => warn!(?action, %err, "command rejected"),
    }
    publish(outputs, result.events.clone(), sim);
    Ok(result)
}

/// Advance the garden to the clock and publish whatever happened.
fn catch_up(sim: &mut SimState, clock: &GardenClock, outputs: &Sender<SessionOutput>) {
    let events = sim.advance_to(clock.now_ms());
    if !events.is_empty() {
        publish(outputs, events, sim);
    }
}

fn publish(outputs: &Sender<SessionOutput>, events: Vec<SimEvent>, sim: &SimState) {
    // A dropped output receiver just means nobody is watching.
    let _ = outputs.send(SessionOutput {
        events,
        snapshot: sim.snapshot(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use enchanted_garden_sim::types::Species;

    #[test]
    fn stop_returns_the_garden() {
        let sim = SimState::new(3);
        let (handle, _outputs) = start_session(sim);
        let snapshot = handle.snapshot().unwrap();
        assert!(!snapshot.paused);
        let sim = handle.stop().unwrap();
        assert_eq!(sim.grid.plant_count(), 0);
    }

    #[test]
    fn out_of_bounds_command_keeps_session_alive() {
        let (handle, _outputs) = start_session(SimState::new(3));
        let err = handle
            .command(SimAction::Water {
                coord: GridCoord::new(20, 0),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::OutOfBounds {
                width: 20,
                height: 15,
                ..
            }
        ));
        assert!(handle
            .command(SimAction::Remove {
                coord: GridCoord::new(-1, 3),
            })
            .is_err());

        // The actor is still running and the garden is intact.
        let planted = handle
            .command(SimAction::Plant {
                coord: GridCoord::new(19, 14),
                species: Species::Rose,
            })
            .unwrap();
        assert!(planted.is_ok());
        let sim = handle.stop().unwrap();
        assert_eq!(sim.grid.species_at(GridCoord::new(19, 14)), Some(Species::Rose));
    }

    #[test]
    fn clock_starts_from_state_time() {
        let clock = GardenClock {
            started: Instant::now(),
            base_ms: 5_000,
        };
        assert!(clock.now_ms() >= 5_000);
    }
}
