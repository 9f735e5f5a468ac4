// enchanted_garden_prng: random sources for the garden simulation.
//
// Every random decision the garden makes (weather rolls, evolution chance,
// offspring choice, seed regeneration, auto-spread) draws from a
// `RandomSource`. The simulation owns exactly one seeded `GameRng`, so a
// garden replays identically given the same seed and the same command
// script. Tests swap in a `ScriptedRng` to force specific outcomes.
//
// Module overview:
// - `source.rs`:   The `RandomSource` trait and its derived helpers
//                  (unit floats, chance rolls, uniform index picks).
// - `xoshiro.rs`:  `GameRng`, xoshiro256++ with SplitMix64 seeding.
// - `scripted.rs`: `ScriptedRng`, replays a fixed list of unit floats and
//                  then falls back to a seeded `GameRng`.
//
// **Critical constraint: determinism.** No OS entropy, no stdlib hasher
// randomness, no system time. All helpers are defined in terms of
// `next_u64()` so any two sources that agree on raw output agree on every
// derived value.

mod scripted;
mod source;
mod xoshiro;

pub use scripted::ScriptedRng;
pub use source::RandomSource;
pub use xoshiro::GameRng;
