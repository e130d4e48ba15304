//! Dice rolling for dice groups such as `2d6` or `d%`.
//!
//! A die may have any positive number of sides; `d1` always rolls 1, which
//! keeps story tests deterministic. Dice notation inside `[...]` terms is
//! handled by [`roll_terms`].

pub mod notation;
pub mod pool;
pub mod roll;

pub use notation::{DiceRoll, RolledText, roll_expression, roll_terms};
pub use pool::DicePool;
pub use roll::{DieResult, RollResult};

use serde::{Deserialize, Serialize};

/// Upper bound on the number of dice in a single group such as `1000d6`.
pub const MAX_DICE_PER_GROUP: u32 = 1000;

/// A die with a fixed number of sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Die(u32);

impl Die {
    /// Percentile die, written `d%`.
    pub const PERCENTILE: Self = Self(100);

    /// The die with the given number of sides, or `None` for zero.
    pub fn from_sides(sides: u32) -> Option<Self> {
        (sides > 0).then_some(Self(sides))
    }

    /// Number of sides.
    pub fn sides(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::PERCENTILE {
            write!(f, "d%")
        } else {
            write!(f, "d{}", self.0)
        }
    }
}
