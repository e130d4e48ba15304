use std::path::Path;

use fable_markdown::Dialect;

pub fn run(path: &Path, dialect: Dialect) -> Result<(), String> {
    let story = super::load_story(path, dialect)?;
    print!("{}", fable_markdown::story_to_flowchart(&story));
    Ok(())
}
