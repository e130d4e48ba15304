//! Rolling a group of identical dice.

use rand::Rng;
use rand::rngs::StdRng;

use super::Die;
use super::roll::{DieResult, RollResult};

/// `count` dice of one kind, rolled together.
#[derive(Debug, Clone, Copy)]
pub struct DicePool {
    die: Die,
    count: u32,
}

impl DicePool {
    /// A pool of `count` dice of kind `die`.
    pub fn new(die: Die, count: u32) -> Self {
        Self { die, count }
    }

    /// Roll every die in the pool.
    pub fn roll(&self, rng: &mut StdRng) -> RollResult {
        let dice = (0..self.count)
            .map(|_| DieResult {
                die: self.die,
                value: rng.random_range(1..=self.die.sides()),
            })
            .collect();
        RollResult { dice }
    }
}
