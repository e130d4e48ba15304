//! Dice roll results.

use serde::{Deserialize, Serialize};

use super::Die;

/// One rolled die.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DieResult {
    /// Die that was rolled.
    pub die: Die,
    /// Face shown, between 1 and the die's sides.
    pub value: u32,
}

/// The result of rolling one group of dice, such as the `2d6` in `2d6+3`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollResult {
    /// Individual die results.
    pub dice: Vec<DieResult>,
}

impl RollResult {
    /// Sum of all faces.
    pub fn total(&self) -> u64 {
        self.dice.iter().map(|d| u64::from(d.value)).sum()
    }

    /// The faces as an audit group, e.g. `[4, 2]`.
    pub fn values(&self) -> String {
        let values: Vec<String> = self.dice.iter().map(|d| d.value.to_string()).collect();
        format!("[{}]", values.join(", "))
    }
}

impl std::fmt::Display for RollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.values(), self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rolled(values: &[u32]) -> RollResult {
        let d6 = Die::from_sides(6).unwrap();
        RollResult {
            dice: values.iter().map(|&value| DieResult { die: d6, value }).collect(),
        }
    }

    #[test]
    fn audit_group() {
        let r = rolled(&[3, 5]);
        assert_eq!(r.total(), 8);
        assert_eq!(r.values(), "[3, 5]");
        assert_eq!(r.to_string(), "[3, 5] = 8");
    }

    #[test]
    fn empty_group() {
        let r = RollResult::default();
        assert_eq!(r.total(), 0);
        assert_eq!(r.values(), "[]");
    }

    #[test]
    fn total_of_huge_faces_does_not_wrap() {
        let die = Die::from_sides(u32::MAX).unwrap();
        let r = RollResult {
            dice: vec![DieResult { die, value: u32::MAX }; 2],
        };
        assert_eq!(r.total(), 2 * u64::from(u32::MAX));
    }
}
