// Weather state machine.
//
// Five weather kinds, each with a profile in `GameConfig::weather` (water
// delta, growth multiplier, effect tags). The weather changes on a timer
// that is independent of the garden tick: once `weather_change_interval_ms`
// has elapsed since the last change, a new kind is drawn uniformly from all
// five (the current kind may be drawn again) and the timer resets.
//
// The sim drives `update()` from a `WeatherCheck` event on the event queue,
// so pausing the garden does not stop the weather.

use crate::types::WeatherKind;
use enchanted_garden_prng::RandomSource;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSystem {
    pub current: WeatherKind,
    pub last_change_ms: u64,
}

impl WeatherSystem {
    pub fn new(initial: WeatherKind, now_ms: u64) -> Self {
        Self {
            current: initial,
            last_change_ms: now_ms,
        }
    }

    /// Time at which the next change is due.
    pub fn next_change_ms(&self, interval_ms: u64) -> u64 {
        self.last_change_ms.saturating_add(interval_ms)
    }

    /// Roll a new weather kind if the interval has elapsed. Returns the new
    /// kind (possibly equal to the old one) when a change happened.
    pub fn update(
        &mut self,
        now_ms: u64,
        interval_ms: u64,
        rng: &mut impl RandomSource,
    ) -> Option<WeatherKind> {
        if now_ms < self.next_change_ms(interval_ms) {
            return None;
        }
        let next = WeatherKind::ALL[rng.pick_index(WeatherKind::ALL.len())];
        self.current = next;
        self.last_change_ms = now_ms;
        Some(next)
    }
}
