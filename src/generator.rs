use crate::REWARD_UNIT;
use rand::Rng;
use std::collections::VecDeque;

/// Bounds on randomly drawn pledge magnitudes, in reward units.
const MIN_UNITS: u128 = 70_000_000_000_000_000_000_000_000;
const MAX_UNITS: u128 = 100_000_000_000_000_000_000_000_000;

/// Produces the pledge triplet for each submission round.
///
/// Pre-seeded triplets are drained first, in order; once the queue is empty
/// the generator synthesizes rounds from the provided RNG. Exhausting the
/// queue is not an error.
pub struct Generator {
    validators: u32,
    seeded: VecDeque<Vec<u128>>,
}

impl Generator {
    pub fn new(validators: u32, sequence: Vec<Vec<u128>>) -> Self {
        assert!(validators > 0, "at least one validator is required");
        Self {
            validators,
            seeded: sequence.into(),
        }
    }

    /// Returns the next round of pledges, one per validator.
    ///
    /// Synthesized rounds fund one or two validators and leave the rest
    /// unstaked: two indices are drawn with replacement (a repeat overwrites
    /// the first draw) and each is assigned a magnitude scaled by
    /// [REWARD_UNIT], keeping generated amounts divisible by the unit.
    pub fn next<R: Rng>(&mut self, rng: &mut R) -> Vec<u128> {
        if let Some(pledges) = self.seeded.pop_front() {
            return pledges;
        }
        let mut pledges = vec![0u128; self.validators as usize];
        for _ in 0..2 {
            let validator = rng.gen_range(0..self.validators) as usize;
            pledges[validator] = rng.gen_range(MIN_UNITS..=MAX_UNITS) * REWARD_UNIT;
        }
        pledges
    }
}
