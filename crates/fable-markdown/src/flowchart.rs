//! Mermaid flowchart of the section graph.

use fable_core::{Part, Story};

fn label(text: &str) -> String {
    text.replace('"', "#quot;")
}

/// Render the story as a mermaid `flowchart TD`.
///
/// One node per section, marked `⭐` when it contains an action and `⎇` when
/// it contains a condition. Links and navigations become solid edges; a
/// condition whose true branch leads somewhere becomes a dotted edge labelled
/// with the condition.
pub fn story_to_flowchart(story: &Story) -> String {
    let mut out = String::from("flowchart TD\n");
    for section in &story.sections {
        let mut icons = String::new();
        if section.has_action() {
            icons.push_str(" ⭐");
        }
        if section.has_condition() {
            icons.push_str(" ⎇");
        }
        let id = &section.id;
        out.push_str(&format!("    {id}[\"{}{icons}\"]\n", label(&section.heading)));
        out.push_str(&format!("    click {id} \"#{id}\"\n"));

        for part in &section.parts {
            match part {
                Part::Link(_) | Part::Navigation(_) => {
                    if let (Some(text), Some(target)) = (part.link_text(), part.link_target()) {
                        out.push_str(&format!("    {id} -->|\"{}\"| {target}\n", label(text)));
                    }
                }
                Part::Condition(condition) => {
                    if let Some(target) = condition.when_true.iter().find_map(Part::link_target) {
                        out.push_str(&format!(
                            "    {id} -.->|\"{}\"| {target}\n",
                            label(&condition.condition)
                        ));
                    }
                }
                _ => {}
            }
        }
    }
    out
}
