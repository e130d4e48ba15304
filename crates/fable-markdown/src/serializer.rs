//! Write a [`Story`] back to annotated Markdown.
//!
//! Output parses back into the same story: section ids are pinned with
//! `<!--- #id -->` comments, and malformed actions and conditions are written
//! from their preserved source.

use fable_core::{Action, Condition, Paragraph, ParagraphVariant, Part, Section, Story};

use crate::config::{Dialect, SerializeConfig};
use crate::flowchart::story_to_flowchart;
use crate::lexer::{FLOWCHART_INFO, FLOWCHART_SENTINEL};
use crate::parser::is_open_marker;

/// Serialize a whole story.
pub fn story_to_markdown(story: &Story, config: &SerializeConfig) -> String {
    let mut out = String::new();
    if !story.title.is_empty() {
        out.push_str(&format!("# {}\n\n", story.title));
    }
    if !story.settings.is_empty() {
        out.push_str(&action_to_markdown(&story.settings));
        out.push_str("\n\n");
    }
    out.push_str(&parts_to_markdown(&story.description, config.dialect));
    for section in &story.sections {
        out.push_str(&section_to_markdown(section, config.dialect));
    }
    if config.flowchart {
        out.push_str(FLOWCHART_SENTINEL);
        out.push_str(&format!("\n```{FLOWCHART_INFO}\n"));
        out.push_str(&story_to_flowchart(story));
        out.push_str("```\n");
    }
    out
}

/// Serialize one section with its heading.
///
/// In the chapter dialect a section whose first part is a header repeating
/// the heading is written as a level-2 heading and that part is implied.
pub fn section_to_markdown(section: &Section, dialect: Dialect) -> String {
    let visible = dialect == Dialect::Chapter
        && matches!(section.parts.first(), Some(Part::Header(h)) if h.text == section.heading);
    let (marker, parts) = if visible {
        ("##", &section.parts[1..])
    } else {
        ("###", &section.parts[..])
    };
    format!(
        "{marker} {} <!--- #{} -->\n\n{}",
        section.heading,
        section.id,
        parts_to_markdown(parts, dialect)
    )
}

/// Serialize a run of parts, each block followed by a blank line.
pub fn parts_to_markdown(parts: &[Part], dialect: Dialect) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        match part {
            Part::Paragraph(paragraph) => out.push_str(&paragraph_to_markdown(paragraph)),
            Part::Comment(comment) => out.push_str(&format!("<!--- {} -->\n\n", comment.text)),
            Part::Image(image) => {
                out.push_str(&format!(
                    "![{}]({})",
                    image.text,
                    image.url.as_deref().unwrap_or_default()
                ));
                if let Some(description) = &image.description {
                    out.push_str(&format!("<!--- {description} -->"));
                }
                out.push_str("\n\n");
            }
            Part::Link(link) => {
                let gap = if matches!(parts.get(i + 1), Some(Part::Link(_))) {
                    "\n"
                } else {
                    "\n\n"
                };
                out.push_str(&format!("- [{}]({}){gap}", link.text, link.target));
            }
            Part::Navigation(navigation) => out.push_str(&format!(
                "`->[{}]({})`\n\n",
                navigation.text, navigation.target
            )),
            Part::Action(action) => {
                out.push_str(&action_to_markdown(action));
                out.push_str("\n\n");
            }
            Part::Condition(condition) => {
                out.push_str(&condition_to_markdown(condition, dialect));
            }
            Part::Header(header) => match dialect {
                Dialect::Scene => out.push_str(&format!("## {}\n\n", header.text)),
                Dialect::Chapter => {
                    tracing::warn!(text = %header.text, "header part has no place in the chapter dialect");
                }
            },
        }
    }
    out
}

fn paragraph_to_markdown(paragraph: &Paragraph) -> String {
    match paragraph.variant {
        Some(ParagraphVariant::Blockquote) => format!("> {}\n\n", paragraph.text),
        Some(ParagraphVariant::Citation) => format!("- {}\n\n", paragraph.text),
        None => format!("{}\n\n", paragraph.text),
    }
}

fn action_to_markdown(action: &Action) -> String {
    let body = match &action.markdown {
        Some(markdown) => {
            let error = action.error.as_deref().unwrap_or_default();
            if markdown.is_empty() || markdown.ends_with('\n') {
                format!("{markdown}{error}")
            } else {
                format!("{markdown}\n{error}")
            }
        }
        None => serde_json::to_string_pretty(&action.state).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "action state could not be serialized");
            String::from("{}")
        }),
    };
    format!("```json\n{}\n```", body.trim_end_matches('\n'))
}

fn condition_to_markdown(condition: &Condition, dialect: Dialect) -> String {
    let opener = match &condition.markdown {
        Some(marker) if !is_open_marker(marker) => return format!("`{marker}`\n\n"),
        Some(marker) => marker.clone(),
        None => format!("{} {{", condition.condition),
    };
    let mut out = format!("`{opener}`\n\n");
    out.push_str(&parts_to_markdown(&condition.when_true, dialect));
    if !condition.when_false.is_empty() {
        out.push_str("`}:{`\n\n");
        out.push_str(&parts_to_markdown(&condition.when_false, dialect));
    }
    out.push_str("`}`\n\n");
    out
}
