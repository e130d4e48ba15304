pub mod check;
pub mod export;
pub mod graph;
pub mod play;
pub mod resolve;
pub mod roll;
pub mod sections;

use std::path::Path;

use colored::Colorize;
use fable_core::{ParagraphVariant, Part, Story};
use fable_engine::{Choice, CyclePolicy, ResolverConfig};
use fable_markdown::{Dialect, ParseResult, ParserConfig, render_diagnostics, summary};

/// Build the resolver configuration shared by `resolve` and `play`.
pub fn resolver_config(seed: Option<u64>, max_depth: usize, reject_revisits: bool) -> ResolverConfig {
    let mut config = ResolverConfig::default().with_max_depth(max_depth);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if reject_revisits {
        config = config.with_cycle_policy(CyclePolicy::RejectRevisits);
    }
    config
}

/// Read and parse a story file, printing its diagnostics to stderr.
fn parse_file(path: &Path, dialect: Dialect) -> Result<ParseResult, String> {
    let source =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let result = fable_markdown::parse_with(&source, &ParserConfig::default().with_dialect(dialect));
    tracing::debug!(
        file = %path.display(),
        sections = result.story.sections.len(),
        diagnostics = result.diagnostics.len(),
        "parsed story"
    );
    print_diagnostics(&source, path, &result);
    Ok(result)
}

/// Parse a story for commands that work on it even when it has errors.
fn load_story(path: &Path, dialect: Dialect) -> Result<Story, String> {
    Ok(parse_file(path, dialect)?.story)
}

/// Print diagnostics to stderr using ariadne.
fn print_diagnostics(source: &str, path: &Path, result: &ParseResult) {
    let Some(summary) = summary(&result.diagnostics) else {
        return;
    };
    let rendered = render_diagnostics(source, &path.display().to_string(), &result.diagnostics);
    eprint!("{rendered}");
    eprintln!("  {summary}");
}

/// Print resolved parts for a reader. Links are left to [`print_choices`].
fn print_parts(parts: &[Part]) {
    for part in parts {
        match part {
            Part::Header(header) => println!("  {}\n", header.text.bold()),
            Part::Paragraph(paragraph) => {
                let text = match paragraph.variant {
                    Some(ParagraphVariant::Blockquote) => format!("> {}", paragraph.text),
                    Some(ParagraphVariant::Citation) => format!("- {}", paragraph.text),
                    None => paragraph.text.clone(),
                };
                for line in text.lines() {
                    println!("  {line}");
                }
                println!();
            }
            Part::Image(image) => println!("  {}\n", format!("[image: {}]", image.text).dimmed()),
            Part::Action(action) => {
                if let Some(error) = &action.error {
                    println!("  {}\n", error.yellow());
                } else if let Some(text) = &action.text {
                    println!("  {}\n", text.dimmed());
                }
            }
            Part::Condition(condition) => {
                if let Some(error) = &condition.error {
                    println!("  {}\n", error.yellow());
                } else if let Some(text) = &condition.text {
                    println!("  {}\n", text.dimmed());
                }
            }
            Part::Link(_) | Part::Navigation(_) | Part::Comment(_) => {}
        }
    }
}

/// Print numbered choices, starting at 1.
fn print_choices(choices: &[Choice]) {
    for (i, choice) in choices.iter().enumerate() {
        println!("  {}. {} {}", i + 1, choice.text, format!("(#{})", choice.target).dimmed());
    }
    println!();
}
