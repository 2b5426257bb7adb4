//! quizline CLI — play timed quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quizline", version, about = "Timed terminal quizzes with a leaderboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz session
    Play {
        /// Participant name (prompted for if omitted)
        #[arg(long)]
        name: Option<String>,

        /// Question bank file
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Leaderboard log file
        #[arg(long)]
        results: Option<PathBuf>,

        /// Seconds allowed per question
        #[arg(long)]
        seconds: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the leaderboard
    Leaderboard {
        /// Leaderboard log file
        #[arg(long)]
        results: Option<PathBuf>,

        /// Number of rows to show
        #[arg(long)]
        top: Option<usize>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a question bank file
    Validate {
        /// Question bank file
        #[arg(long)]
        bank: PathBuf,
    },

    /// Create a starter config and question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quizline=warn,quizline_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            name,
            bank,
            results,
            seconds,
            config,
        } => commands::play::execute(name, bank, results, seconds, config).await,
        Commands::Leaderboard {
            results,
            top,
            format,
            config,
        } => commands::leaderboard::execute(results, top, format, config),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
