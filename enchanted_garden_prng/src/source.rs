// The abstract random source the simulation is written against.
//
// Implementors only supply `next_u64()`. Everything else (unit floats,
// probability rolls, uniform picks) is derived here, so the mapping from raw
// bits to game decisions is defined in exactly one place.

/// A deterministic stream of random `u64` values plus derived helpers.
pub trait RandomSource {
    /// Produce the next raw 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Uniform `f64` in [0, 1) from the upper 53 bits.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform `f32` in [0, 1) from the upper 24 bits.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Return `true` with probability `p`. `p <= 0` never fires and
    /// `p >= 1` always does.
    fn chance(&mut self, p: f32) -> bool {
        self.next_f64() < f64::from(p)
    }

    /// Uniform index in `[0, len)`, scaled from one unit float.
    ///
    /// Panics if `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "pick_index: cannot pick from an empty range");
        let scaled = (self.next_f64() * len as f64) as usize;
        scaled.min(len - 1)
    }

    /// Uniformly pick one element of a slice, or `None` if it is empty.
    /// Consumes no randomness for an empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.pick_index(items.len())])
        }
    }
}
