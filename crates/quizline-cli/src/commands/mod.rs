pub mod init;
pub mod leaderboard;
pub mod play;
pub mod validate;

use comfy_table::{Cell, Table};

use quizline_core::leaderboard::LeaderboardEntry;

/// Render ranked entries as a numbered table.
pub fn leaderboard_table(entries: &[LeaderboardEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Score", "When"]);

    for (rank, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.name),
            Cell::new(format!("{}/{}", entry.score, entry.total)),
            Cell::new(&entry.timestamp),
        ]);
    }

    table
}
