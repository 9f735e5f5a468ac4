// A replaying random source for tests and reproductions.
//
// `ScriptedRng` hands out a caller-chosen list of unit floats first, encoded
// so that `next_f64()` returns each value (rounded down to 53 bits) and
// `chance(p)` / `pick_index(n)` resolve exactly as the script intends. Once
// the script runs dry it continues from a seeded `GameRng`, so code that
// draws more than the test anticipated still behaves deterministically.

use std::collections::VecDeque;

use crate::source::RandomSource;
use crate::xoshiro::GameRng;

/// Random source that replays scripted unit floats, then a seeded stream.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    script: VecDeque<f64>,
    fallback: GameRng,
}

impl ScriptedRng {
    /// Replay `values` (each clamped into [0, 1)) before falling back to
    /// `GameRng::new(0)`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self::with_fallback_seed(values, 0)
    }

    pub fn with_fallback_seed(values: impl IntoIterator<Item = f64>, seed: u64) -> Self {
        Self {
            script: values.into_iter().collect(),
            fallback: GameRng::new(seed),
        }
    }

    /// A unit float that makes `pick_index(len)` return `index`.
    pub fn index_of(index: usize, len: usize) -> f64 {
        assert!(index < len, "index_of: {index} is not below {len}");
        (index as f64 + 0.5) / len as f64
    }

    /// Number of scripted values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl RandomSource for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        match self.script.pop_front() {
            Some(v) => {
                let unit = v.clamp(0.0, 1.0 - f64::EPSILON);
                ((unit * (1u64 << 53) as f64) as u64) << 11
            }
            None => self.fallback.next_u64(),
        }
    }
}
