//! Story resolution for Fable.
//!
//! The [`Resolver`] turns a section plus the current state into the parts a
//! player sees and the state that follows, auto-advancing through sections
//! with a single way out. [`PlaySession`] keeps track of where the player is
//! and follows their choices.

pub mod config;
pub mod error;
pub mod resolver;
pub mod session;

pub use config::{CyclePolicy, ResolverConfig};
pub use error::{EngineError, EngineResult};
pub use resolver::{NextResult, Resolver, SectionResult, narration};
pub use session::{Choice, PlaySession, choices_of};
