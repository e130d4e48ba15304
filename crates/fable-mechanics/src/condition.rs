//! Evaluation of condition expressions.

use fable_core::FlatState;
use rand::rngs::StdRng;

use crate::dice::roll_terms;
use crate::expr::evaluate_str;
use crate::substitute::substitute;

/// The result of evaluating a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionOutcome {
    /// Whether the true branch applies.
    pub is_true: bool,
    /// Audit text: `raw -> substituted -> result`.
    pub text: String,
}

/// Evaluate a condition expression against the flat state.
///
/// Variables are substituted, whitespace removed, `&&`/`||` normalized and
/// dice rolled before evaluation. A condition that cannot be evaluated is
/// false, and its audit text ends with the literal that failed.
pub fn evaluate_condition(condition: &str, state: &FlatState, rng: &mut StdRng) -> ConditionOutcome {
    let substituted = substitute(condition, state);
    let compact: String = substituted.chars().filter(|c| !c.is_whitespace()).collect();
    let logic = compact.replace("&&", " and ").replace("||", " or ");
    let rolled = roll_terms(&logic, rng);

    let (is_true, result) = match evaluate_str(&rolled.text) {
        Ok(value) => (value.is_truthy(), value.to_string()),
        Err(e) => {
            tracing::debug!(condition, reason = %e, "condition is not evaluable");
            (false, rolled.text.clone())
        }
    };

    ConditionOutcome {
        is_true,
        text: format!("{condition} -> {} -> {result}", rolled.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn check(condition: &str, state: &FlatState) -> ConditionOutcome {
        evaluate_condition(condition, state, &mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn with_dice() {
        let outcome = check("4+[d1] < 4", &FlatState::new());
        assert_eq!(outcome.text, "4+[d1] < 4 -> 4+1<4 -> false");
        assert!(!outcome.is_true);
    }

    #[test]
    fn with_dice_in_variable() {
        let outcome = check("4+[{damage}] < 4", &FlatState::new().with("damage", "d1"));
        assert_eq!(outcome.text, "4+[{damage}] < 4 -> 4+1<4 -> false");
        assert!(!outcome.is_true);
    }

    #[test]
    fn with_variable() {
        let outcome = check("{strength} >= 12", &FlatState::new().with("strength", 14));
        assert_eq!(outcome.text, "{strength} >= 12 -> 14>=12 -> true");
        assert!(outcome.is_true);
    }

    #[test]
    fn with_variable_and_dice() {
        let outcome = check("{strength} <= [2d1+20]", &FlatState::new().with("strength", 14));
        assert_eq!(outcome.text, "{strength} <= [2d1+20] -> 14<=22 -> true");
        assert!(outcome.is_true);
    }

    #[test]
    fn with_logical_and() {
        let state = FlatState::new().with("strength", 14).with("agility", 9);
        let outcome = check("{strength} >= 12 && {agility} <= 10", &state);
        assert_eq!(
            outcome.text,
            "{strength} >= 12 && {agility} <= 10 -> 14>=12 and 9<=10 -> true"
        );
        assert!(outcome.is_true);
    }

    #[test]
    fn with_logical_or() {
        let state = FlatState::new().with("gold", 0);
        let outcome = check("{gold} > 5 || {gold} == 0", &state);
        assert_eq!(outcome.text, "{gold} > 5 || {gold} == 0 -> 0>5 or 0==0 -> true");
        assert!(outcome.is_true);
    }

    #[test]
    fn numeric_result_uses_truthiness() {
        let outcome = check("{coins}", &FlatState::new().with("coins", 3));
        assert_eq!(outcome.text, "{coins} -> 3 -> 3");
        assert!(outcome.is_true);
        assert!(!check("0", &FlatState::new()).is_true);
    }

    #[test]
    fn unresolved_is_false() {
        let outcome = check("{missing} > 1", &FlatState::new());
        assert_eq!(outcome.text, "{missing} > 1 -> {missing}>1 -> {missing}>1");
        assert!(!outcome.is_true);
    }

    #[test]
    fn text_comparison_is_unevaluable() {
        let outcome = check("{name} == Tom", &FlatState::new().with("name", "Tom"));
        assert!(!outcome.is_true);
    }
}
