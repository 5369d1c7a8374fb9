//! Candidate representation and random generation.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{Interval, SamplingMode, SearchBounds};

/// A point in the search space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub x: f64,
    pub y: f64,
}

impl Candidate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates lie within `bounds`.
    pub fn within(&self, bounds: &SearchBounds) -> bool {
        bounds.x.contains(self.x) && bounds.y.contains(self.y)
    }
}

/// One generation of candidates.
pub type Population = Vec<Candidate>;

/// Which coordinate an operator touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Random number generator wrapper for candidate operations.
///
/// Every random draw of a run goes through one instance, so a fixed seed
/// reproduces the run exactly.
pub struct CandidateRng {
    rng: StdRng,
    sampling: SamplingMode,
}

impl CandidateRng {
    /// Create from seed.
    pub fn new(seed: u64, sampling: SamplingMode) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sampling,
        }
    }

    /// Draw a coordinate for `interval`.
    pub fn random_point(&mut self, interval: Interval) -> f64 {
        match self.sampling {
            SamplingMode::Legacy => legacy_point(self.rng.r#gen::<f64>(), interval),
            SamplingMode::Uniform => self.rng.gen_range(interval.min..=interval.max),
        }
    }

    /// Generate a candidate, x drawn before y.
    pub fn individual(&mut self, bounds: &SearchBounds) -> Candidate {
        let x = self.random_point(bounds.x);
        let y = self.random_point(bounds.y);
        Candidate { x, y }
    }

    /// Generate `size` independent candidates.
    pub fn population(&mut self, size: usize, bounds: &SearchBounds) -> Population {
        (0..size).map(|_| self.individual(bounds)).collect()
    }

    /// Bernoulli trial with success probability `p`.
    ///
    /// Succeeds when a `[0, 1)` draw falls below `p`, so `p = 0` never fires
    /// and `p = 1` always does.
    pub fn chance(&mut self, p: f64) -> bool {
        p > self.rng.r#gen::<f64>()
    }

    /// Pick x or y with equal probability.
    pub fn axis(&mut self) -> Axis {
        if self.rng.gen_range(0..2) == 0 {
            Axis::X
        } else {
            Axis::Y
        }
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Return `candidate` with one coordinate redrawn.
    pub fn mutate(&mut self, candidate: Candidate, bounds: &SearchBounds) -> Candidate {
        match self.axis() {
            Axis::X => Candidate {
                x: self.random_point(bounds.x),
                ..candidate
            },
            Axis::Y => Candidate {
                y: self.random_point(bounds.y),
                ..candidate
            },
        }
    }
}

/// `u * max + 1`, lifted by `min` when it falls short and capped at `max`.
///
/// The lift can overshoot `max` when `2 * min > max`; the final clamp keeps
/// the point in bounds and is a no-op otherwise.
fn legacy_point(u: f64, interval: Interval) -> f64 {
    let Interval { min, max } = interval;
    let mut num = u * max + 1.0;
    if num < min {
        num += min;
    } else if num > max {
        num = max;
    }
    num.clamp(min, max)
}

/// Single-point crossover at the midpoint of the two-gene genome.
///
/// Slot 0 keeps the donor's x and the parent's y; slot 1 keeps the parent's
/// x and the donor's y.
pub fn crossover(donor: Candidate, parent: Candidate, parent_slot: usize) -> Candidate {
    if parent_slot == 0 {
        Candidate::new(donor.x, parent.y)
    } else {
        Candidate::new(parent.x, donor.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn default_bounds() -> SearchBounds {
        SearchBounds::default()
    }

    #[test]
    fn test_legacy_point_formula() {
        let x = Interval::new(3.0, 10.0);
        // 0.5 * 10 + 1 = 6, already inside
        assert_eq!(legacy_point(0.5, x), 6.0);
        // 0.1 * 10 + 1 = 2 < 3, lifted to 5
        assert_eq!(legacy_point(0.1, x), 5.0);
        // 0.95 * 10 + 1 = 10.5 > 10, capped
        assert_eq!(legacy_point(0.95, x), 10.0);

        let y = Interval::new(4.0, 8.0);
        // 0.25 * 8 + 1 = 3 < 4, lifted to 7
        assert_eq!(legacy_point(0.25, y), 7.0);
    }

    #[test]
    fn test_legacy_point_clamps_overshoot() {
        // 0 * 10 + 1 = 1 < 8, lifted to 9 which is still inside
        assert_eq!(legacy_point(0.0, Interval::new(8.0, 10.0)), 9.0);
        // 0.5 * 10 + 1 = 6 < 7, lifted to 13, clamped
        assert_eq!(legacy_point(0.5, Interval::new(7.0, 10.0)), 10.0);
    }

    #[test]
    fn test_population_size_and_bounds() {
        let mut rng = CandidateRng::new(42, SamplingMode::Legacy);
        let bounds = default_bounds();
        let pop = rng.population(200, &bounds);
        assert_eq!(pop.len(), 200);
        assert!(pop.iter().all(|c| c.within(&bounds)));
    }

    #[test]
    fn test_same_seed_same_population() {
        let bounds = default_bounds();
        let a = CandidateRng::new(9, SamplingMode::Uniform).population(20, &bounds);
        let b = CandidateRng::new(9, SamplingMode::Uniform).population(20, &bounds);
        assert_eq!(a, b);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = CandidateRng::new(1, SamplingMode::Legacy);
        assert!((0..1000).all(|_| !rng.chance(0.0)));
        assert!((0..1000).all(|_| rng.chance(1.0)));
    }

    #[test]
    fn test_mutate_changes_one_coordinate() {
        let mut rng = CandidateRng::new(5, SamplingMode::Uniform);
        let bounds = default_bounds();
        let original = Candidate::new(3.0, 4.0);
        for _ in 0..100 {
            let mutated = rng.mutate(original, &bounds);
            assert!(mutated.within(&bounds));
            assert!(mutated.x == original.x || mutated.y == original.y);
        }
    }

    #[test]
    fn test_crossover_slots() {
        let donor = Candidate::new(1.0, 2.0);
        let parent = Candidate::new(3.0, 4.0);
        assert_eq!(crossover(donor, parent, 0), Candidate::new(1.0, 4.0));
        assert_eq!(crossover(donor, parent, 1), Candidate::new(3.0, 2.0));
    }

    proptest! {
        /// Generated candidates always respect the bounds, in both modes.
        #[test]
        fn prop_individual_within_bounds(
            seed in any::<u64>(),
            x_min in -50.0_f64..50.0,
            x_width in 0.01_f64..50.0,
            y_min in -50.0_f64..50.0,
            y_width in 0.01_f64..50.0,
            uniform in any::<bool>(),
        ) {
            let bounds = SearchBounds {
                x: Interval::new(x_min, x_min + x_width),
                y: Interval::new(y_min, y_min + y_width),
            };
            let sampling = if uniform { SamplingMode::Uniform } else { SamplingMode::Legacy };
            let mut rng = CandidateRng::new(seed, sampling);
            for _ in 0..32 {
                let c = rng.individual(&bounds);
                prop_assert!(c.within(&bounds), "{:?} outside {:?}", c, bounds);
            }
        }
    }
}
