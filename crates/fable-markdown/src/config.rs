//! Parser and serializer configuration.

use std::fmt;
use std::str::FromStr;

/// Which heading levels start sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Headings of level 2 to 6 start sections; a level-2 heading also shows
    /// its text as a header part.
    #[default]
    Chapter,
    /// Headings of level 3 to 6 start sections; level-2 headings are visible
    /// headers inside the current section.
    Scene,
}

impl Dialect {
    /// Whether a heading of `level` starts a new section.
    pub fn starts_section(self, level: u8) -> bool {
        match self {
            Self::Chapter => (2..=6).contains(&level),
            Self::Scene => (3..=6).contains(&level),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chapter => write!(f, "chapter"),
            Self::Scene => write!(f, "scene"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chapter" => Ok(Self::Chapter),
            "scene" => Ok(Self::Scene),
            other => Err(format!("unknown dialect: {other} (expected chapter or scene)")),
        }
    }
}

/// Configuration for [`crate::parse_with`].
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Heading dialect.
    pub dialect: Dialect,
}

impl ParserConfig {
    /// Set the heading dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

/// Configuration for [`crate::story_to_markdown`].
#[derive(Debug, Clone)]
pub struct SerializeConfig {
    /// Heading dialect.
    pub dialect: Dialect,
    /// Append an autogenerated mermaid flowchart.
    pub flowchart: bool,
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            flowchart: true,
        }
    }
}

impl SerializeConfig {
    /// Set the heading dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Enable or disable the flowchart block.
    pub fn with_flowchart(mut self, flowchart: bool) -> Self {
        self.flowchart = flowchart;
        self
    }
}
