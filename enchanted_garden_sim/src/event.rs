// Garden events: the internal delayed-event queue and the events the sim
// emits to the view layer.
//
// The sim runs on a millisecond clock. Everything that happens "later" (the
// next garden tick, the next weather change, a flavor message that must
// follow its discovery banner, a notification dismissal) is a
// `ScheduledEvent` in a priority queue ordered by `(time_ms, sequence)`.
// `SimState::advance_to()` pops due entries in that order.
//
// This file defines two related but distinct concepts:
// - `ScheduledEvent`: internal queue entries that drive the sim.
// - `SimEvent`: view-facing events emitted as output.
//
// See also: `sim.rs` for `advance_to()` and `process_event()`,
// `command.rs` for the command side of the boundary.
//
// **Critical constraint: determinism.** The `(time_ms, sequence)` key is a
// total order, so two entries scheduled for the same millisecond always fire
// in the order they were scheduled.

use crate::types::{GridCoord, Rarity, Severity, Species, WeatherKind};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

// ---------------------------------------------------------------------------
// Internal scheduled events (priority queue)
// ---------------------------------------------------------------------------

/// An event scheduled for future processing by the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Garden time at which this event fires.
    pub time_ms: u64,
    /// Tiebreak within a millisecond. Lower values fire first.
    pub sequence: u64,
    pub kind: ScheduledEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScheduledEventKind {
    /// Periodic garden tick. Ticks whose generation no longer matches
    /// `SimState::tick_generation` were cancelled by a pause and are dropped.
    GardenTick { generation: u64 },
    /// Check whether the weather is due to change.
    WeatherCheck,
    /// Show a notification that was scheduled with a delay.
    DeliverNotification { message: String, severity: Severity },
    /// Clear the active notification if it is still notification `id`.
    DismissNotification { id: u64 },
}

impl ScheduledEvent {
    /// Firing order: garden time, then scheduling order.
    fn key(&self) -> (u64, u64) {
        (self.time_ms, self.sequence)
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Pending garden timers. `BinaryHeap` is a max-heap, so entries are stored
/// reversed and the earliest key sits on top.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time_ms: u64, kind: ScheduledEventKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(ScheduledEvent {
            time_ms,
            sequence,
            kind,
        }));
    }

    /// Time of the earliest pending event.
    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(e)| e.time_ms)
    }

    /// Pop the next event if it is due at or before `up_to_ms`.
    pub fn pop_due(&mut self, up_to_ms: u64) -> Option<ScheduledEvent> {
        if self.peek_time().is_some_and(|t| t <= up_to_ms) {
            self.heap.pop().map(|Reverse(e)| e)
        } else {
            None
        }
    }

    /// Drop every pending garden tick. Weather checks and notification
    /// timers are untouched. Returns how many ticks were removed.
    pub fn cancel_garden_ticks(&mut self) -> usize {
        let before = self.heap.len();
        self.heap
            .retain(|Reverse(e)| !matches!(e.kind, ScheduledEventKind::GardenTick { .. }));
        before - self.heap.len()
    }

    /// Number of pending garden ticks (at most one outside of a pause race).
    pub fn pending_garden_ticks(&self) -> usize {
        self.heap
            .iter()
            .filter(|Reverse(e)| matches!(e.kind, ScheduledEventKind::GardenTick { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ---------------------------------------------------------------------------
// View-facing events (output)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub at_ms: u64,
    pub kind: SimEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A notification became the active one.
    Notification {
        id: u64,
        message: String,
        severity: Severity,
    },
    NotificationDismissed { id: u64 },
    CombinationDiscovered { combo_id: String },
    ResonanceDetected { coord: GridCoord },
    PlantWithered {
        coord: GridCoord,
        species: Species,
        was_legendary: bool,
    },
    WeatherChanged { weather: WeatherKind },
    PlantEvolved { coord: GridCoord, species: Species },
    PlantBred {
        parents: [GridCoord; 2],
        offspring: Species,
        at: GridCoord,
        automatic: bool,
    },
    RareSpeciesDiscovered { species: Species, rarity: Rarity },
    AchievementUnlocked { name: String },
    PlantPlaced { coord: GridCoord, species: Species },
    PlantRemoved { coord: GridCoord, species: Species },
    /// A garden tick finished; `tick` is the new elapsed tick count.
    TickCompleted { tick: u64 },
    SimPaused,
    SimResumed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_queue_ordering() {
        let mut queue = EventQueue::new();
        queue.schedule(2000, ScheduledEventKind::WeatherCheck);
        queue.schedule(1000, ScheduledEventKind::GardenTick { generation: 0 });
        queue.schedule(1000, ScheduledEventKind::DismissNotification { id: 4 });

        let first = queue.pop_due(5000).unwrap();
        assert_eq!(first.time_ms, 1000);
        assert_eq!(first.kind, ScheduledEventKind::GardenTick { generation: 0 });

        let second = queue.pop_due(5000).unwrap();
        assert_eq!(second.time_ms, 1000);
        assert_eq!(second.sequence, 2);

        let third = queue.pop_due(5000).unwrap();
        assert_eq!(third.kind, ScheduledEventKind::WeatherCheck);
        assert!(queue.pop_due(5000).is_none());
    }

    #[test]
    fn pop_due_respects_time_limit() {
        let mut queue = EventQueue::new();
        queue.schedule(1500, ScheduledEventKind::WeatherCheck);
        assert_eq!(queue.peek_time(), Some(1500));
        assert!(queue.pop_due(1499).is_none());
        assert!(queue.pop_due(1500).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_garden_ticks_keeps_other_timers() {
        let mut queue = EventQueue::new();
        queue.schedule(1000, ScheduledEventKind::GardenTick { generation: 0 });
        queue.schedule(1200, ScheduledEventKind::DismissNotification { id: 1 });
        queue.schedule(3000, ScheduledEventKind::WeatherCheck);
        assert_eq!(queue.pending_garden_ticks(), 1);

        assert_eq!(queue.cancel_garden_ticks(), 1);
        assert_eq!(queue.pending_garden_ticks(), 0);
        assert_eq!(queue.peek_time(), Some(1200));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.cancel_garden_ticks(), 0);
    }

    #[test]
    fn event_queue_serialization() {
        let mut queue = EventQueue::new();
        queue.schedule(
            10,
            ScheduledEventKind::DeliverNotification {
                message: "hello".into(),
                severity: Severity::Special,
            },
        );
        queue.schedule(5, ScheduledEventKind::WeatherCheck);

        let json = serde_json::to_string(&queue).unwrap();
        let mut restored: EventQueue = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.pop_due(100).unwrap().time_ms, 5);
    }

    #[test]
    fn sim_event_json_shape() {
        let event = SimEvent {
            at_ms: 3000,
            kind: SimEventKind::PlantWithered {
                coord: GridCoord::new(1, 2),
                species: Species::CrystalLotus,
                was_legendary: true,
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"]["PlantWithered"]["species"], "CRYSTAL_LOTUS");
        assert_eq!(value["kind"]["PlantWithered"]["coord"]["x"], 1);
    }
}
