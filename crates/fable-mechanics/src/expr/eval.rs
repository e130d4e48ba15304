use std::cmp::Ordering;

use rand::rngs::StdRng;

use super::{BinaryOp, Evaluated, Expr, UnaryOp};
use crate::dice::{DicePool, Die, MAX_DICE_PER_GROUP, RollResult};
use crate::error::{MechError, MechResult};

struct Roller<'r> {
    rng: &'r mut StdRng,
    groups: Vec<RollResult>,
}

/// Evaluate an expression that must not contain dice.
pub fn evaluate(expr: &Expr) -> MechResult<Evaluated> {
    check_closed(expr)?;
    eval(expr, None)
}

/// Evaluate an expression, rolling its dice groups left to right.
///
/// Returns the value and one [`RollResult`] per dice group.
pub fn evaluate_with_dice(
    expr: &Expr,
    rng: &mut StdRng,
) -> MechResult<(Evaluated, Vec<RollResult>)> {
    check_closed(expr)?;
    let mut roller = Roller {
        rng,
        groups: Vec::new(),
    };
    let value = eval(expr, Some(&mut roller))?;
    Ok((value, roller.groups))
}

fn check_closed(expr: &Expr) -> MechResult<()> {
    match expr.first_variable() {
        Some(name) => Err(MechError::Unresolved(name.to_string())),
        None => Ok(()),
    }
}

fn finite(n: f64) -> MechResult<Evaluated> {
    if n.is_finite() {
        Ok(Evaluated::Number(n))
    } else {
        Err(MechError::NonFinite)
    }
}

fn eval(expr: &Expr, mut roller: Option<&mut Roller<'_>>) -> MechResult<Evaluated> {
    match expr {
        Expr::Number(n) => finite(*n),
        Expr::Bool(b) => Ok(Evaluated::Bool(*b)),
        Expr::Var(name) => Err(MechError::Unresolved(name.clone())),
        Expr::Dice { count, sides } => {
            let Some(roller) = roller else {
                return Err(MechError::UnrolledDice(format!("{count}d{sides}")));
            };
            roll_group(*count, *sides, roller)
        }
        Expr::Unary(op, operand) => {
            let value = eval(operand, roller)?;
            match op {
                UnaryOp::Neg => finite(-value.as_number()),
                UnaryOp::Not => Ok(Evaluated::Bool(!value.is_truthy())),
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let left = eval(lhs, roller.as_deref_mut())?;
            match op {
                BinaryOp::And if !left.is_truthy() => return Ok(Evaluated::Bool(false)),
                BinaryOp::Or if left.is_truthy() => return Ok(Evaluated::Bool(true)),
                _ => {}
            }
            let right = eval(rhs, roller)?;
            apply(*op, left, right)
        }
    }
}

fn roll_group(count: u32, sides: u32, roller: &mut Roller<'_>) -> MechResult<Evaluated> {
    if count > MAX_DICE_PER_GROUP {
        return Err(MechError::TooManyDice {
            count,
            max: MAX_DICE_PER_GROUP,
        });
    }
    let die = Die::from_sides(sides)
        .ok_or_else(|| MechError::InvalidDice(format!("{count}d{sides}")))?;
    let result = DicePool::new(die, count).roll(&mut *roller.rng);
    tracing::trace!(dice = %format!("{count}{die}"), rolled = %result, "rolled dice group");
    let total = result.total() as f64;
    roller.groups.push(result);
    Ok(Evaluated::Number(total))
}

fn compare(left: Evaluated, right: Evaluated) -> Option<Ordering> {
    left.as_number().partial_cmp(&right.as_number())
}

fn apply(op: BinaryOp, left: Evaluated, right: Evaluated) -> MechResult<Evaluated> {
    let (a, b) = (left.as_number(), right.as_number());
    match op {
        BinaryOp::Add => finite(a + b),
        BinaryOp::Sub => finite(a - b),
        BinaryOp::Mul => finite(a * b),
        BinaryOp::Div => finite(a / b),
        BinaryOp::Rem => finite(a % b),
        BinaryOp::Pow => finite(a.powf(b)),
        BinaryOp::Lt => Ok(Evaluated::Bool(compare(left, right) == Some(Ordering::Less))),
        BinaryOp::Le => Ok(Evaluated::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinaryOp::Gt => Ok(Evaluated::Bool(compare(left, right) == Some(Ordering::Greater))),
        BinaryOp::Ge => Ok(Evaluated::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        BinaryOp::Eq => Ok(Evaluated::Bool(compare(left, right) == Some(Ordering::Equal))),
        BinaryOp::Ne => Ok(Evaluated::Bool(compare(left, right) != Some(Ordering::Equal))),
        BinaryOp::And => Ok(Evaluated::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Evaluated::Bool(left.is_truthy() || right.is_truthy())),
    }
}
