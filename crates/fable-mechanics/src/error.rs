//! Error types for the mechanics engine.

/// Errors that can occur while rolling dice or evaluating expressions.
///
/// Action and condition evaluation never surface these: they fall back to the
/// literal text instead.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A dice term could not be understood.
    #[error("invalid dice notation: {0}")]
    InvalidDice(String),

    /// A single dice group asked for more dice than allowed.
    #[error("too many dice: {count} (max {max})")]
    TooManyDice {
        /// Requested dice count.
        count: u32,
        /// The allowed maximum.
        max: u32,
    },

    /// The expression contains characters the lexer does not accept.
    #[error("unexpected input '{text}' at offset {offset}")]
    Lex {
        /// Byte offset of the bad input.
        offset: usize,
        /// The offending text.
        text: String,
    },

    /// The expression is not well formed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The expression refers to a variable that was not substituted.
    #[error("unresolved variable: {0}")]
    Unresolved(String),

    /// The result is infinite or not a number.
    #[error("result is not a finite number")]
    NonFinite,

    /// A dice term appeared where no dice may be rolled.
    #[error("dice cannot be rolled here: {0}")]
    UnrolledDice(String),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
