use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use fable_core::Bookmark;
use fable_engine::{EngineError, PlaySession, ResolverConfig};
use fable_markdown::Dialect;

pub fn run(
    path: &Path,
    dialect: Dialect,
    section: Option<&str>,
    bookmark: Option<&str>,
    config: ResolverConfig,
) -> Result<(), String> {
    let story = super::load_story(path, dialect)?;
    let title = story.title.clone();

    let mut session = match bookmark {
        Some(text) => {
            let bookmark = text.parse::<Bookmark>().map_err(|e| e.to_string())?;
            PlaySession::from_bookmark(story, config, &bookmark).map_err(|e| e.to_string())?
        }
        None => {
            let mut session = PlaySession::new(story, config);
            session.start(section).map_err(|e| e.to_string())?;
            session
        }
    };

    if !title.is_empty() {
        println!("  {}\n", title.bold());
    }
    println!("  Type a choice number, 'b' for a bookmark, 'q' to quit.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();
    let mut show = true;

    loop {
        if show {
            show = false;
            super::print_parts(&session.screen().parts);
            let choices = session.choices();
            if choices.is_empty() {
                println!("  {}", "The End.".bold());
                break;
            }
            super::print_choices(&choices);
        }

        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.eq_ignore_ascii_case("b") || input.eq_ignore_ascii_case("bookmark") {
            if let Some(bookmark) = session.bookmark() {
                println!("  {bookmark}\n");
            }
            continue;
        }

        let index = input.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
        let Some(index) = index else {
            println!("{}\n", format!("unknown command '{input}'").yellow());
            continue;
        };
        match session.choose(index) {
            Ok(_) => show = true,
            Err(EngineError::InvalidChoice { available, .. }) => {
                println!("{}\n", format!("choose a number from 1 to {available}").yellow());
            }
            Err(e) => println!("{}\n", e.to_string().yellow()),
        }
    }

    Ok(())
}
