//! CLI frontend for Fable stories.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use fable_markdown::Dialect;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fable",
    about = "Fable: check, export and play annotated Markdown stories",
    version,
    propagate_version = true
)]
struct Cli {
    /// Heading dialect: chapter (## starts sections) or scene (### starts sections)
    #[arg(long, global = true, default_value = "chapter", value_parser = parse_dialect)]
    dialect: Dialect,

    /// Log resolution decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a story and report diagnostics
    Check {
        /// Story file
        file: PathBuf,
    },

    /// List the sections of a story
    Sections {
        /// Story file
        file: PathBuf,
    },

    /// Export a story to a different format
    Export {
        /// Story file
        file: PathBuf,

        /// Output format: json, markdown
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave out the autogenerated flowchart
        #[arg(long)]
        no_flowchart: bool,
    },

    /// Print the section graph as a mermaid flowchart
    Graph {
        /// Story file
        file: PathBuf,
    },

    /// Resolve one screen starting at a section
    Resolve {
        /// Story file
        file: PathBuf,

        /// Section id (leading `#` optional)
        section: String,

        /// Starting state as `state=<base64>` or bare base64
        #[arg(short, long)]
        state: Option<String>,

        /// RNG seed for reproducible dice
        #[arg(long)]
        seed: Option<u64>,

        /// How many single links to follow at most
        #[arg(long, default_value = "10")]
        max_depth: usize,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a story interactively
    Play {
        /// Story file
        file: PathBuf,

        /// Section to start at (default: the first section)
        #[arg(long)]
        section: Option<String>,

        /// Resume from a bookmark such as `#cave?state=...`
        #[arg(short, long, conflicts_with = "section")]
        bookmark: Option<String>,

        /// RNG seed for reproducible dice
        #[arg(long)]
        seed: Option<u64>,

        /// How many single links to follow at most
        #[arg(long, default_value = "10")]
        max_depth: usize,

        /// Stop auto-advancing into a section already visited on this screen
        #[arg(long)]
        reject_revisits: bool,
    },

    /// Roll a dice expression such as `2d6+3`
    Roll {
        /// Dice expression
        expr: String,

        /// RNG seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_dialect(s: &str) -> Result<Dialect, String> {
    s.parse()
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FABLE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let dialect = cli.dialect;

    let result = match cli.command {
        Commands::Check { file } => commands::check::run(&file, dialect),
        Commands::Sections { file } => commands::sections::run(&file, dialect),
        Commands::Export {
            file,
            format,
            output,
            no_flowchart,
        } => commands::export::run(&file, dialect, &format, output.as_deref(), !no_flowchart),
        Commands::Graph { file } => commands::graph::run(&file, dialect),
        Commands::Resolve {
            file,
            section,
            state,
            seed,
            max_depth,
            json,
        } => commands::resolve::run(
            &file,
            dialect,
            &section,
            state.as_deref(),
            commands::resolver_config(seed, max_depth, false),
            json,
        ),
        Commands::Play {
            file,
            section,
            bookmark,
            seed,
            max_depth,
            reject_revisits,
        } => commands::play::run(
            &file,
            dialect,
            section.as_deref(),
            bookmark.as_deref(),
            commands::resolver_config(seed, max_depth, reject_revisits),
        ),
        Commands::Roll { expr, seed } => commands::roll::run(&expr, seed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
