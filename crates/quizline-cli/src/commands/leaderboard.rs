//! The `quizline leaderboard` command.

use std::path::PathBuf;

use anyhow::Result;

use quizline_core::config::load_config_from;
use quizline_core::leaderboard::LeaderboardStore;

use super::leaderboard_table;

pub fn execute(
    results: Option<PathBuf>,
    top: Option<usize>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let results_path = results.unwrap_or(config.results_path);
    let top = top.unwrap_or(config.leaderboard_limit);
    anyhow::ensure!(top >= 1, "--top must be at least 1");

    let entries = LeaderboardStore::new(&results_path).ranked_top(top)?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        "table" => {
            if entries.is_empty() {
                println!("No results yet in {}.", results_path.display());
            } else {
                println!("{}", leaderboard_table(&entries));
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}
