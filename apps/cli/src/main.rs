mod commands;
mod settings;
mod term;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "recall",
    version,
    about = "Pattern-aware spaced-repetition flashcards in the terminal"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty deck file
    New { deck: PathBuf },

    /// Run a training lesson over due and not-yet-introduced cards
    Learn { deck: PathBuf },

    /// Quiz without touching memorization state
    Test {
        deck: PathBuf,
        /// Number of cards to quiz; all of them when omitted
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Interactively add cards to a deck
    Add { deck: PathBuf },

    /// List cards with tier, due date and identifier code
    List { deck: PathBuf },

    /// Show deck statistics
    Stats { deck: PathBuf },

    /// Import `clue,answer` lines from a CSV file
    Import { deck: PathBuf, csv: PathBuf },

    /// Remove a card by its identifier code
    Remove { deck: PathBuf, code: String },

    /// Reset memorization state for every card in a deck
    Reset {
        deck: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Add or remove a deck tag
    Tag {
        deck: PathBuf,
        tag: String,
        /// Remove the tag instead of adding it
        #[arg(short, long)]
        remove: bool,
    },

    /// Show the active settings, or change one
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Update a setting and save it
    Set { key: String, value: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("recall={log_level}")
            .parse()
            .unwrap_or_else(|_| "recall=info".parse().expect("fallback directive is valid")),
    );

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::New { deck } => commands::new_deck(&deck),
        Commands::Learn { deck } => commands::learn(&deck),
        Commands::Test { deck, count } => commands::test(&deck, count),
        Commands::Add { deck } => commands::add(&deck),
        Commands::List { deck } => commands::list(&deck),
        Commands::Stats { deck } => commands::stats(&deck),
        Commands::Import { deck, csv } => commands::import(&deck, &csv),
        Commands::Remove { deck, code } => commands::remove(&deck, &code),
        Commands::Reset { deck, yes } => commands::reset(&deck, yes),
        Commands::Tag { deck, tag, remove } => commands::tag(&deck, &tag, remove),
        Commands::Config { action } => match action {
            Some(ConfigAction::Set { key, value }) => commands::config_set(&key, &value),
            None => commands::config_show(),
        },
    }
}
