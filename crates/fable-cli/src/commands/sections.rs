use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use fable_core::Part;
use fable_markdown::Dialect;

pub fn run(path: &Path, dialect: Dialect) -> Result<(), String> {
    let story = super::load_story(path, dialect)?;

    if story.sections.is_empty() {
        println!("  No sections found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Heading", "Parts", "Links"]);

    for section in &story.sections {
        let links: Vec<String> = section
            .links()
            .filter_map(Part::link_target)
            .map(|target| format!("#{target}"))
            .collect();
        let links = if links.is_empty() {
            "—".to_string()
        } else {
            links.join(", ")
        };
        table.add_row(vec![
            section.id.clone(),
            section.heading.clone(),
            section.parts.len().to_string(),
            links,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} sections", story.sections.len());

    Ok(())
}
