//! The story document model.
//!
//! A [`Story`] is what the Markdown parser produces and what the resolver
//! walks. Every piece of content inside a section is a [`Part`]; parts are
//! plain values and resolution always produces new ones.

use serde::{Deserialize, Serialize};

use crate::state::State;

/// A parsed story document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Text of the level-1 heading.
    pub title: String,
    /// Front matter before the first section.
    #[serde(default)]
    pub description: Vec<Part>,
    /// Global defaults merged in before every resolution.
    #[serde(default)]
    pub settings: Action,
    /// Sections in declaration order.
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Every image in the sections, including those inside condition branches.
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Story {
    /// Find a section by id.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Recompute [`Story::images`] from the sections.
    pub fn index_images(&mut self) {
        let mut images = Vec::new();
        for section in &self.sections {
            collect_images(&section.parts, &mut images);
        }
        self.images = images;
    }
}

fn collect_images(parts: &[Part], images: &mut Vec<Image>) {
    for part in parts {
        match part {
            Part::Image(image) => images.push(image.clone()),
            Part::Condition(condition) => {
                collect_images(&condition.when_true, images);
                collect_images(&condition.when_false, images);
            }
            _ => {}
        }
    }
}

/// A named, addressable node of the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique id, either a slug of the heading or an explicit override.
    pub id: String,
    /// Heading text without any id override comment.
    pub heading: String,
    /// Content in document order.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Section {
    /// Create an empty section, deriving the id from the heading.
    pub fn new(heading: impl Into<String>) -> Self {
        let heading = heading.into();
        Self {
            id: slugify(&heading),
            heading,
            parts: Vec::new(),
        }
    }

    /// Builder-style id override.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder-style part append.
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Links and navigations at the top level of this section.
    pub fn links(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_link())
    }

    /// Whether any part, including inside condition branches, is an action.
    pub fn has_action(&self) -> bool {
        any_part(&self.parts, &|p| matches!(p, Part::Action(_)))
    }

    /// Whether any part is a condition.
    pub fn has_condition(&self) -> bool {
        any_part(&self.parts, &|p| matches!(p, Part::Condition(_)))
    }
}

fn any_part(parts: &[Part], pred: &dyn Fn(&Part) -> bool) -> bool {
    parts.iter().any(|part| {
        pred(part)
            || match part {
                Part::Condition(c) => any_part(&c.when_true, pred) || any_part(&c.when_false, pred),
                _ => false,
            }
    })
}

/// One typed unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// A visible sub-heading.
    Header(Header),
    /// A player choice pointing at another section.
    Link(Link),
    /// An illustration.
    Image(Image),
    /// Narrative text.
    Paragraph(Paragraph),
    /// An author comment, never shown to players.
    Comment(Comment),
    /// An automatic jump to another section.
    Navigation(Navigation),
    /// A conditional branch.
    Condition(Condition),
    /// A state mutation.
    Action(Action),
}

impl Part {
    /// Plain paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(Paragraph {
            text: text.into(),
            variant: None,
        })
    }

    /// Link without a key.
    pub fn link(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Link(Link {
            text: text.into(),
            target: target.into(),
            key: None,
        })
    }

    /// Navigation.
    pub fn navigation(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Navigation(Navigation {
            text: text.into(),
            target: target.into(),
        })
    }

    /// Action setting the given state.
    pub fn action(state: State) -> Self {
        Self::Action(Action {
            state,
            ..Action::default()
        })
    }

    /// Whether this part leads to another section.
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_) | Self::Navigation(_))
    }

    /// Target of a link or navigation, with any leading `#` removed.
    pub fn link_target(&self) -> Option<&str> {
        match self {
            Self::Link(Link { target, .. }) | Self::Navigation(Navigation { target, .. }) => {
                Some(target.strip_prefix('#').unwrap_or(target))
            }
            _ => None,
        }
    }

    /// Display text of a link or navigation.
    pub fn link_text(&self) -> Option<&str> {
        match self {
            Self::Link(Link { text, .. }) | Self::Navigation(Navigation { text, .. }) => Some(text),
            _ => None,
        }
    }
}

/// A visible sub-heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Heading text.
    pub text: String,
}

/// A player choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Choice label.
    pub text: String,
    /// Target section id, usually `#id`.
    pub target: String,
    /// Optional shortcut key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// An illustration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Alt text.
    pub text: String,
    /// Opaque image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Longer description from an attached comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// How a paragraph was quoted in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphVariant {
    /// Written as `> text`.
    Blockquote,
    /// Written as a list item `- text`.
    Citation,
}

/// Narrative text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// The text, with `\n` for line breaks.
    pub text: String,
    /// Quote style, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<ParagraphVariant>,
}

/// An author comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment body.
    pub text: String,
}

/// An automatic jump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    /// Label.
    pub text: String,
    /// Target section id, usually `#id`.
    pub target: String,
}

/// A conditional branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Raw condition expression.
    pub condition: String,
    /// Parts shown when the condition holds.
    #[serde(rename = "true", default)]
    pub when_true: Vec<Part>,
    /// Parts shown otherwise.
    #[serde(rename = "false", default)]
    pub when_false: Vec<Part>,
    /// Audit text set by resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Original source when the marker could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Parse error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A state mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Keys to set, with raw expression values.
    #[serde(default)]
    pub state: State,
    /// Audit text set by resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Original source when the block could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Parse error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Action {
    /// An action with no state, no source and no error.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty() && self.markdown.is_none() && self.error.is_none()
    }
}

/// Derive a section id from heading text.
///
/// Lower-cases, replaces spaces with `-` and percent-encodes everything
/// outside `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn slugify(heading: &str) -> String {
    let lowered = heading.to_lowercase().replace(' ', "-");
    let mut slug = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() || "-_.!~*'()".contains(c) {
            slug.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                slug.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    slug
}
