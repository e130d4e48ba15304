//! Error types for story play.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while playing a story.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The story has no sections to start from.
    #[error("story has no sections")]
    EmptyStory,

    /// No section has the requested id.
    #[error("section not found: {0}")]
    SectionNotFound(String),

    /// The chosen option does not exist on the current screen.
    #[error("invalid choice {index}: {available} available")]
    InvalidChoice {
        /// Zero-based index that was requested.
        index: usize,
        /// Number of choices on screen.
        available: usize,
    },

    /// Bookmark could not be decoded.
    #[error("{0}")]
    Bookmark(#[from] fable_core::CoreError),
}
