use std::path::Path;

use colored::Colorize;
use fable_core::{decode_state, state_query};
use fable_engine::{Resolver, ResolverConfig, choices_of};
use fable_markdown::Dialect;

pub fn run(
    path: &Path,
    dialect: Dialect,
    section: &str,
    state: Option<&str>,
    config: ResolverConfig,
    json: bool,
) -> Result<(), String> {
    let story = super::load_story(path, dialect)?;
    let id = section.trim_start_matches('#');
    if story.section(id).is_none() {
        return Err(format!("section '{id}' not found"));
    }
    let state = decode_state(state.unwrap_or_default()).map_err(|e| e.to_string())?;

    let mut resolver = Resolver::new(config);
    let result = resolver.resolve_next(&story, id, &state);

    if json {
        let export = serde_json::json!({
            "section": result.section.as_ref().map(|s| &s.id),
            "parts": result.parts,
            "state": result.state,
            "narration": result.narration,
        });
        let text = serde_json::to_string_pretty(&export).map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    super::print_parts(&result.parts);
    let choices = choices_of(&result.parts);
    if !choices.is_empty() {
        super::print_choices(&choices);
    }

    let query = state_query(&result.state).map_err(|e| e.to_string())?;
    println!("  {} {query}", "State:".dimmed());
    Ok(())
}
