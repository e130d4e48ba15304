//! Evaluation of action parts against the flat story state.

use fable_core::{Action, FlatState, Scalar};
use rand::rngs::StdRng;

use crate::dice::roll_terms;
use crate::expr::{Evaluated, evaluate_str};
use crate::substitute::substitute;

/// The computed value of one action key.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValue {
    /// The new value.
    pub value: Scalar,
    /// Dice audit trail, when dice were rolled.
    pub rolls: Option<String>,
}

/// The result of applying an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// The working state with every action key applied.
    pub state: FlatState,
    /// Comma-joined audit entries.
    pub text: String,
}

impl ActionOutcome {
    /// The action as it should be rendered, carrying the audit text.
    pub fn render(&self, action: &Action) -> Action {
        Action {
            text: Some(self.text.clone()),
            ..action.clone()
        }
    }
}

fn rewrite_prefix(key: &str, raw: &Scalar) -> String {
    match raw {
        Scalar::Number(_) => raw.to_string(),
        Scalar::Text(text) => {
            if let Some(rest) = text.strip_prefix("+=") {
                format!("{{{key}}} + {rest}")
            } else if let Some(rest) = text.strip_prefix("-=") {
                format!("{{{key}}} - ({rest})")
            } else {
                text.clone()
            }
        }
    }
}

/// Compute the new value of `key` from its raw action value.
///
/// `+=X` and `-=X` are rewritten against the key itself, variables are
/// substituted, dice terms rolled and the result evaluated. Text that does
/// not evaluate is kept (substituted once more, so a rolled lookup like
/// `{fruits.[d6]}` resolves) and turned into a number if it reads as one.
pub fn evaluate_action_value(
    key: &str,
    raw: &Scalar,
    state: &FlatState,
    rng: &mut StdRng,
) -> ActionValue {
    let rewritten = rewrite_prefix(key, raw);
    let substituted = substitute(&rewritten, state);
    let rolled = roll_terms(&substituted, rng);
    let compact: String = rolled.text.chars().filter(|c| !c.is_whitespace()).collect();

    let value = match evaluate_str(&compact) {
        Ok(Evaluated::Number(n)) => Scalar::Number(n),
        Ok(Evaluated::Bool(b)) => Scalar::Text(b.to_string()),
        Err(e) => {
            tracing::trace!(key, text = %rolled.text, reason = %e, "keeping literal action value");
            Scalar::coerce(substitute(&rolled.text, state))
        }
    };

    ActionValue {
        value,
        rolls: rolled.rolls,
    }
}

/// Apply every key of `action` to `state`, in declaration order.
///
/// Keys are evaluated against the working state, so later keys see the
/// results of earlier ones. Keys of the action missing from the state count
/// as `0` while evaluating.
pub fn evaluate_action(action: &Action, state: &FlatState, rng: &mut StdRng) -> ActionOutcome {
    let assignments = action.state.flatten();
    let mut working = state.clone();
    let mut entries = Vec::new();

    for (key, raw) in assignments.iter() {
        let mut scope: FlatState = assignments.keys().map(|k| (k.clone(), 0)).collect();
        scope.overlay(&working);

        let prior = working.get(key).cloned();
        let ActionValue { value, rolls } = evaluate_action_value(key, raw, &scope, rng);

        let entry = match (&prior, &rolls) {
            (None, Some(rolls)) => Some(format!("{key}: {rolls}-> {value}")),
            (None, None) => Some(format!("{key}: {value}")),
            (Some(old), None) if old.to_string() == value.to_string() => None,
            (Some(old), Some(rolls)) => Some(format!("{key}: {old} -{rolls}-> {value}")),
            (Some(old), None) => Some(format!("{key}: {old} -> {value}")),
        };
        entries.extend(entry);
        working.insert(key.clone(), value);
    }

    let text = entries.join(", ");
    tracing::debug!(audit = %text, "applied action");
    ActionOutcome {
        state: working,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fable_core::{State, flatten};
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn action(state: State) -> Action {
        Action {
            state,
            ..Action::default()
        }
    }

    fn apply(state: State, flat: FlatState) -> ActionOutcome {
        evaluate_action(&action(state), &flat, &mut rng())
    }

    #[test]
    fn simple_set() {
        let outcome = apply(State::new().with("rope", 1), FlatState::new());
        assert_eq!(outcome.state, FlatState::new().with("rope", 1));
        assert_eq!(outcome.text, "rope: 1");
    }

    #[test]
    fn increase() {
        let outcome = apply(State::new().with("rope", "+=2"), FlatState::new().with("rope", 1));
        assert_eq!(outcome.state, FlatState::new().with("rope", 3));
        assert_eq!(outcome.text, "rope: 1 -> 3");
    }

    #[test]
    fn increase_from_string() {
        let outcome = apply(State::new().with("rope", "+=2"), FlatState::new().with("rope", "1"));
        assert_eq!(outcome.state, FlatState::new().with("rope", 3));
        assert_eq!(outcome.text, "rope: 1 -> 3");
    }

    #[test]
    fn decrease() {
        let outcome = apply(State::new().with("rope", "-=3"), FlatState::new().with("rope", 6));
        assert_eq!(outcome.state, FlatState::new().with("rope", 3));
        assert_eq!(outcome.text, "rope: 6 -> 3");
    }

    #[test]
    fn decrease_wraps_expression() {
        let outcome = apply(State::new().with("hp", "-=1+2"), FlatState::new().with("hp", 10));
        assert_eq!(outcome.state.get("hp"), Some(&Scalar::Number(7.0)));
    }

    #[test]
    fn multiple_keys() {
        let outcome = apply(
            State::new()
                .with("pancakes", "+=1")
                .with("egg", "-=1")
                .with("milk", "-=1"),
            FlatState::new().with("egg", 3).with("milk", 1),
        );
        assert_eq!(
            outcome.state,
            FlatState::new().with("egg", 2).with("milk", 0).with("pancakes", 1)
        );
        assert_eq!(outcome.text, "pancakes: 1, egg: 3 -> 2, milk: 1 -> 0");
    }

    #[test]
    fn dice_count_from_variable() {
        let outcome = apply(
            State::new().with("rollVarableD1", "[{strength}d1]"),
            FlatState::new().with("strength", 1),
        );
        assert_eq!(
            outcome.state,
            FlatState::new().with("strength", 1).with("rollVarableD1", 1)
        );
        assert_eq!(outcome.text, "rollVarableD1: [1]-> 1");
    }

    #[test]
    fn calculation_with_later_keys() {
        let outcome = apply(
            State::new()
                .with("cupper", "{gold} * 100 + {silver} * 10 + {cupper}")
                .with("gold", 0)
                .with("silver", 0),
            FlatState::new().with("gold", 3).with("silver", 14).with("cupper", 4),
        );
        assert_eq!(
            outcome.state,
            FlatState::new().with("cupper", 444).with("gold", 0).with("silver", 0)
        );
        assert_eq!(outcome.text, "cupper: 4 -> 444, gold: 3 -> 0, silver: 14 -> 0");
    }

    #[test]
    fn dice_free_actions_ignore_the_rng() {
        let action = action(
            State::new()
                .with("gold", "+=5")
                .with("hp", "{hp} - {damage}")
                .with("name", "Mara"),
        );
        let state = FlatState::new().with("gold", 2).with("hp", 10).with("damage", 3);
        let first = evaluate_action(&action, &state, &mut StdRng::seed_from_u64(1));
        let second = evaluate_action(&action, &state, &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
        assert_eq!(first.text, "gold: 2 -> 7, hp: 10 -> 7, name: Mara");
    }

    #[test]
    fn dice() {
        let outcome = apply(State::new().with("rolld6", "[d1]"), FlatState::new());
        assert_eq!(outcome.state.get("rolld6"), Some(&Scalar::Number(1.0)));
        assert_eq!(outcome.text, "rolld6: [1]-> 1");
    }

    #[test]
    fn dice_from_variable() {
        let outcome = apply(
            State::new().with("rolld6", "[{damage}]+1"),
            FlatState::new().with("damage", "d1"),
        );
        assert_eq!(outcome.state.get("rolld6"), Some(&Scalar::Number(2.0)));
        assert_eq!(outcome.text, "rolld6: [1]-> 2");
    }

    fn fruits() -> State {
        State::new().with("fruits", State::new().with("1", "apple").with("2", "banana"))
    }

    #[test]
    fn lookup_table() {
        let outcome = apply(State::new().with("fruit", "{fruits.2}"), flatten(&fruits()));
        assert_eq!(outcome.state.get("fruit"), Some(&Scalar::from("banana")));
        assert_eq!(outcome.text, "fruit: banana");
    }

    #[test]
    fn lookup_table_with_dice() {
        let outcome = apply(State::new().with("fruit", "{fruits.[d1]}"), flatten(&fruits()));
        assert_eq!(outcome.state.get("fruit"), Some(&Scalar::from("apple")));
        assert_eq!(outcome.text, "fruit: [1]-> apple");
    }

    #[test]
    fn lookup_table_with_variable() {
        let outcome = apply(
            State::new().with("fruit", "{fruits.{rolld6}}"),
            flatten(&fruits().with("rolld6", "[d1]")),
        );
        assert_eq!(outcome.state.get("fruit"), Some(&Scalar::from("apple")));
        assert_eq!(outcome.text, "fruit: [1]-> apple");
    }

    #[test]
    fn unchanged_values_are_not_reported() {
        let outcome = apply(
            State::new().with("rope", 1).with("torch", "+=1"),
            FlatState::new().with("rope", 1).with("torch", 0),
        );
        assert_eq!(outcome.text, "torch: 0 -> 1");
    }

    #[test]
    fn text_keeps_whitespace() {
        let outcome = apply(State::new().with("name", "Tom Bombadil"), FlatState::new());
        assert_eq!(outcome.state.get("name"), Some(&Scalar::from("Tom Bombadil")));
        assert_eq!(outcome.text, "name: Tom Bombadil");
    }

    #[test]
    fn booleans_are_stored_as_text() {
        let outcome = apply(State::new().with("brave", "2 > 1"), FlatState::new());
        assert_eq!(outcome.state.get("brave"), Some(&Scalar::from("true")));
    }

    #[test]
    fn nested_action_keys() {
        let outcome = apply(
            State::new().with("bag", State::new().with("rope", "+=1")),
            FlatState::new().with("bag.rope", 2),
        );
        assert_eq!(outcome.state.get("bag.rope"), Some(&Scalar::Number(3.0)));
        assert_eq!(outcome.text, "bag.rope: 2 -> 3");
    }

    #[test]
    fn render_carries_audit_text() {
        let action = action(State::new().with("rope", 1));
        let outcome = evaluate_action(&action, &FlatState::new(), &mut rng());
        let rendered = outcome.render(&action);
        assert_eq!(rendered.text.as_deref(), Some("rope: 1"));
        assert_eq!(rendered.state, action.state);
    }
}
