use std::path::Path;

use fable_markdown::Dialect;

pub fn run(path: &Path, dialect: Dialect) -> Result<(), String> {
    let result = super::parse_file(path, dialect)?;
    if result.has_errors() {
        return Err("story has errors".into());
    }

    let story = &result.story;
    let name = if story.title.is_empty() {
        path.display().to_string()
    } else {
        story.title.clone()
    };
    let links: usize = story.sections.iter().map(|s| s.links().count()).sum();

    println!("  All checks passed for '{name}'.");
    println!(
        "  {} sections, {} links, {} images",
        story.sections.len(),
        links,
        story.images.len()
    );

    Ok(())
}
