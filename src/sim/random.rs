//! Seeded randomness helpers
//!
//! The simulation owns a single `Pcg32` stream. These helpers give the
//! generation and spawner code lenient ranges: an empty or inverted range
//! yields its lower bound instead of panicking.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// RNG type used by the simulation
pub type SimRng = Pcg32;

/// Build the simulation RNG for a run seed
pub fn seeded(seed: u64) -> SimRng {
    Pcg32::seed_from_u64(seed)
}

/// Lenient range sampling on top of [`rand::Rng`]
pub trait RngExt {
    /// Uniform float in `[min, max)`
    fn frange(&mut self, min: f32, max: f32) -> f32;
    /// Uniform integer in `[min, max]` (inclusive)
    fn irange(&mut self, min: i32, max: i32) -> i32;
    /// Uniform float in `[0, 1)`
    fn unit(&mut self) -> f32;
    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn frange(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.random_range(min..max)
    }

    fn irange(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.random_range(min..=max)
    }

    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }
}
