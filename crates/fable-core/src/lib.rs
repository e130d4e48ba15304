//! Core types for Fable: stories, sections, parts, and the state model.
//!
//! This crate defines the data model the Markdown parser produces and the
//! resolver consumes. A [`Story`] can also be built programmatically or
//! deserialized from JSON.

/// Player progress bookmarks and the `state=` query encoding.
pub mod bookmark;
/// Error types used throughout the crate.
pub mod error;
/// Nested key/value state and its flat dot-path projection.
pub mod state;
/// Stories, sections, and the typed parts they are made of.
pub mod story;

/// Re-export bookmark helpers.
pub use bookmark::{Bookmark, decode_state, encode_state, state_query};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export state model types.
pub use state::{FlatState, Scalar, State, Value, flatten, format_number, merge, unflatten};
/// Re-export story model types.
pub use story::{
    Action, Comment, Condition, Header, Image, Link, Navigation, Paragraph, ParagraphVariant, Part,
    Section, Story, slugify,
};
