//! Quick-scan refinement of state of health.
//!
//! A quick scan re-measures SoH and reports a slightly lower, more precise
//! figure: the snapshot value minus 0.5 to 2.0 points, to two decimals.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::mock::round_to;

const MIN_DROP: f64 = 0.5;
const DROP_SPREAD: f64 = 1.5;

pub struct QuickScan<R = StdRng> {
    rng: R,
}

impl QuickScan {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(StdRng::seed_from_u64(seed)),
            None => Self::new(StdRng::from_entropy()),
        }
    }
}

impl<R: Rng> QuickScan<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Refined SoH in `(soh - 2.0, soh - 0.5]`, rounded to 2 dp.
    pub fn refine(&mut self, state_of_health: f64) -> f64 {
        let drop = self.rng.gen::<f64>() * DROP_SPREAD + MIN_DROP;
        round_to(state_of_health - drop, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refined_soh_drops_within_band() {
        let mut quick = QuickScan::from_seed(Some(4));
        for _ in 0..200 {
            let soh = quick.refine(91.3);
            assert!((89.3..=90.8).contains(&soh), "soh={soh}");
            assert_eq!(round_to(soh, 2), soh);
        }
    }

    #[test]
    fn same_seed_same_refinement() {
        let a = QuickScan::from_seed(Some(11)).refine(88.0);
        let b = QuickScan::from_seed(Some(11)).refine(88.0);
        assert_eq!(a, b);
    }
}
