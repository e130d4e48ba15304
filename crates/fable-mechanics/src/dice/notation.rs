//! Dice notation: bare expressions like `2d6+3` and `[...]` terms in text.

use std::fmt;

use fable_core::format_number;
use rand::rngs::StdRng;

use super::roll::RollResult;
use crate::error::{MechError, MechResult};
use crate::expr::{evaluate_with_dice, parse_expression};

/// The outcome of rolling one dice expression.
#[derive(Debug, Clone, PartialEq)]
pub struct DiceRoll {
    /// The expression total.
    pub total: f64,
    /// One result per dice group, in expression order.
    pub groups: Vec<RollResult>,
}

impl DiceRoll {
    /// The audit trail: each group's values, e.g. `[4, 2][3]`.
    pub fn audit(&self) -> String {
        self.groups.iter().map(RollResult::values).collect()
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.audit(), format_number(self.total))
    }
}

/// Roll a dice expression such as `2d6+3`, `d%` or `d6+d4`.
pub fn roll_expression(text: &str, rng: &mut StdRng) -> MechResult<DiceRoll> {
    let expr = parse_expression(text).map_err(|e| MechError::InvalidDice(format!("{text}: {e}")))?;
    let (value, groups) = evaluate_with_dice(&expr, rng)?;
    Ok(DiceRoll {
        total: value.as_number(),
        groups,
    })
}

/// Text after its `[...]` dice terms were rolled.
#[derive(Debug, Clone, PartialEq)]
pub struct RolledText {
    /// The text with every term replaced by its total, or the input unchanged
    /// when a term failed.
    pub text: String,
    /// Concatenated audit groups, or the error message of the failing term.
    /// `None` when nothing was rolled.
    pub rolls: Option<String>,
}

/// Roll every `[...]` term in `text`, left to right.
///
/// A term that fails to roll stops processing: the text is returned
/// unchanged with the error message as the audit trail.
pub fn roll_terms(text: &str, rng: &mut StdRng) -> RolledText {
    let mut result = String::with_capacity(text.len());
    let mut audit = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let Some(len) = rest[open + 1..].find(']') else {
            break;
        };
        let term = &rest[open + 1..open + 1 + len];
        match roll_expression(term, rng) {
            Ok(roll) => {
                result.push_str(&rest[..open]);
                result.push_str(&format_number(roll.total));
                audit.push_str(&roll.audit());
            }
            Err(e) => {
                tracing::debug!(term, error = %e, "dice term failed to roll");
                return RolledText {
                    text: text.to_string(),
                    rolls: Some(e.to_string()),
                };
            }
        }
        rest = &rest[open + len + 2..];
    }
    result.push_str(rest);

    RolledText {
        text: result,
        rolls: if audit.is_empty() { None } else { Some(audit) },
    }
}
