//! Annotated Markdown for Fable stories.
//!
//! [`parse`] turns a story document into a [`Story`]; [`story_to_markdown`]
//! writes one back out so that parsing the output yields the same story.
//! [`story_to_flowchart`] renders the section graph as a mermaid flowchart.

pub mod config;
pub mod diagnostics;
pub mod flowchart;
pub mod lexer;
pub mod parser;
pub mod serializer;

use fable_core::Story;

pub use config::{Dialect, ParserConfig, SerializeConfig};
pub use diagnostics::{Diagnostic, Severity, render_diagnostics, summary};
pub use flowchart::story_to_flowchart;
pub use parser::{ParseResult, parse_with};
pub use serializer::{parts_to_markdown, section_to_markdown, story_to_markdown};

/// Parse a story with the default dialect, discarding diagnostics.
pub fn parse(source: &str) -> Story {
    parse_with(source, &ParserConfig::default()).story
}
