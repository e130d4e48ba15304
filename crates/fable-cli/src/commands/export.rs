use std::path::Path;

use fable_markdown::{Dialect, SerializeConfig};

pub fn run(
    path: &Path,
    dialect: Dialect,
    format: &str,
    output: Option<&Path>,
    flowchart: bool,
) -> Result<(), String> {
    let story = super::load_story(path, dialect)?;

    let content = match format {
        "json" => {
            let mut json =
                serde_json::to_string_pretty(&story).map_err(|e| format!("JSON serialization error: {e}"))?;
            json.push('\n');
            json
        }
        "markdown" | "md" => {
            let config = SerializeConfig::default()
                .with_dialect(dialect)
                .with_flowchart(flowchart);
            fable_markdown::story_to_markdown(&story, &config)
        }
        _ => {
            return Err(format!("unsupported format: \"{format}\". Use: json, markdown"));
        }
    };

    if let Some(path) = output {
        std::fs::write(path, &content).map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported to {}", path.display());
    } else {
        print!("{content}");
    }

    Ok(())
}
