//! The story expression language.
//!
//! Expressions are what remains of a condition or action value after
//! `{variable}` substitution and dice rolling: arithmetic, comparisons and
//! boolean logic over numbers. Any remaining bare identifier makes an
//! expression unevaluable, and callers fall back to the literal text.

pub mod eval;
pub mod lexer;
pub mod parser;

use std::fmt;

use fable_core::format_number;

use crate::error::MechResult;

pub use eval::{evaluate, evaluate_with_dice};

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Logical negation.
    Not,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `^`
    Pow,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `and`
    And,
    /// `or`
    Or,
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
    /// A free variable.
    Var(String),
    /// A dice group, only rollable inside a dice term.
    Dice {
        /// Number of dice.
        count: u32,
        /// Sides per die.
        sides: u32,
    },
    /// Unary operation.
    Unary(UnaryOp, Box<Expr>),
    /// Binary operation.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Build a binary node.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// The first free variable in the tree, if any.
    pub fn first_variable(&self) -> Option<&str> {
        match self {
            Self::Var(name) => Some(name),
            Self::Number(_) | Self::Bool(_) | Self::Dice { .. } => None,
            Self::Unary(_, operand) => operand.first_variable(),
            Self::Binary(_, lhs, rhs) => lhs.first_variable().or_else(|| rhs.first_variable()),
        }
    }
}

/// The value of an evaluated expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluated {
    /// A finite number.
    Number(f64),
    /// A boolean.
    Bool(bool),
}

impl Evaluated {
    /// Numeric view; booleans count as 1 and 0.
    pub fn as_number(self) -> f64 {
        match self {
            Self::Number(n) => n,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
        }
    }

    /// C-style truthiness: zero, NaN and `false` are false.
    pub fn is_truthy(self) -> bool {
        match self {
            Self::Number(n) => n != 0.0 && !n.is_nan(),
            Self::Bool(b) => b,
        }
    }
}

impl fmt::Display for Evaluated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Lex and parse an expression.
pub fn parse_expression(source: &str) -> MechResult<Expr> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens)
}

/// Parse and evaluate an expression that contains no dice.
pub fn evaluate_str(source: &str) -> MechResult<Evaluated> {
    evaluate(&parse_expression(source)?)
}
