// Lunar phase counter.
//
// Advanced once per garden tick and wrapped modulo the cycle length. The
// moonlight effect on plants that need moonlight scales with
// `strength() = sin(phase / cycle * PI) + 1`, which ranges over [0, 2].

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoonClock {
    pub phase: u32,
    pub cycle_length: u32,
}

impl MoonClock {
    pub fn new(cycle_length: u32) -> Self {
        Self {
            phase: 0,
            cycle_length: cycle_length.max(1),
        }
    }

    pub fn advance(&mut self) {
        self.phase = (self.phase + 1) % self.cycle_length;
    }

    pub fn strength(&self) -> f32 {
        let angle = self.phase as f32 / self.cycle_length as f32 * std::f32::consts::PI;
        angle.sin() + 1.0
    }
}
