//! Story mechanics for Fable.
//!
//! Provides dice rolling, a small expression language for conditions and
//! computed values, `{variable}` substitution against the flat story state,
//! and the evaluation of action and condition parts with their audit text.

pub mod action;
pub mod condition;
pub mod dice;
pub mod error;
pub mod expr;
pub mod substitute;

pub use action::{ActionOutcome, ActionValue, evaluate_action, evaluate_action_value};
pub use condition::{ConditionOutcome, evaluate_condition};
pub use dice::{DicePool, DiceRoll, Die, DieResult, RollResult, RolledText, roll_expression, roll_terms};
pub use error::{MechError, MechResult};
pub use expr::{BinaryOp, Evaluated, Expr, UnaryOp, evaluate_str, parse_expression};
pub use substitute::substitute;
