//! Append-only leaderboard log.
//!
//! Each finished session appends one line:
//!
//! ```text
//! <name> - <score>/<total> @ <yyyy-MM-dd HH:mm>
//! ```
//!
//! The log is the only source of truth. Rankings are re-derived from the
//! whole file on every call; lines that do not parse are ignored.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::error::{QuizError, QuizResult};

/// `chrono` format of the timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Default number of rows returned by [`LeaderboardStore::ranked_top`].
pub const DEFAULT_TOP_N: usize = 10;

/// One recorded result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub total: u32,
    /// Zero-padded `yyyy-MM-dd HH:mm`, so string order is time order.
    pub timestamp: String,
}

impl LeaderboardEntry {
    pub fn new(name: &str, score: u32, total: u32, at: NaiveDateTime) -> Self {
        Self {
            name: sanitize_name(name),
            score,
            total,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Parse one log line. Returns `None` for anything off-grammar.
    pub fn parse(line: &str) -> Option<Self> {
        let (head, timestamp) = line.rsplit_once(" @ ")?;
        let (name, fraction) = head.rsplit_once(" - ")?;
        let (score, total) = fraction.trim().split_once('/')?;
        let at = NaiveDateTime::parse_from_str(timestamp.trim(), TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            name: name.trim().to_string(),
            score: score.trim().parse().ok()?,
            total: total.trim().parse().ok()?,
            // Re-rendered so string order stays time order.
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        })
    }
}

impl fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}/{} @ {}",
            self.name, self.score, self.total, self.timestamp
        )
    }
}

/// Keeps a single result on a single line.
fn sanitize_name(name: &str) -> String {
    name.trim().replace(['\r', '\n'], " ")
}

/// Order entries by score (high first), then by timestamp (recent first).
/// Entries equal on both keys keep their log order.
pub fn rank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
}

/// File-backed leaderboard.
#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a result stamped with the current local time.
    pub fn record_result(&self, name: &str, score: u32, total: u32) -> QuizResult<LeaderboardEntry> {
        self.record_result_at(name, score, total, Local::now().naive_local())
    }

    /// Append a result with an explicit timestamp.
    ///
    /// The line is written with a single `write_all` on a file opened in
    /// append mode, so a result is either fully in the log or the call fails.
    pub fn record_result_at(
        &self,
        name: &str,
        score: u32,
        total: u32,
        at: NaiveDateTime,
    ) -> QuizResult<LeaderboardEntry> {
        let entry = LeaderboardEntry::new(name, score, total, at);
        let line = format!("{entry}\n");

        self.append(line.as_bytes()).map_err(|source| {
            tracing::warn!("failed to append to {}: {}", self.path.display(), source);
            QuizError::Persistence {
                path: self.path.clone(),
                source,
            }
        })?;

        tracing::info!(
            name = %entry.name,
            score = entry.score,
            total = entry.total,
            "recorded result"
        );
        Ok(entry)
    }

    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(bytes)?;
        file.flush()
    }

    /// Every parseable entry, in log order. A missing log is empty.
    pub fn entries(&self) -> QuizResult<Vec<LeaderboardEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(QuizError::Persistence {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut entries = Vec::new();
        for (n, line) in content.lines().enumerate() {
            match LeaderboardEntry::parse(line) {
                Some(entry) => entries.push(entry),
                None => tracing::debug!("{}:{}: ignoring line", self.path.display(), n + 1),
            }
        }
        Ok(entries)
    }

    /// The best `n` results, re-read from the log.
    pub fn ranked_top(&self, n: usize) -> QuizResult<Vec<LeaderboardEntry>> {
        let mut entries = self.entries()?;
        rank(&mut entries);
        entries.truncate(n);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn store_with(lines: &[&str]) -> (tempfile::TempDir, LeaderboardStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let mut content = lines.join("\n");
        content.push('\n');
        std::fs::write(&path, content).unwrap();
        (dir, LeaderboardStore::new(path))
    }

    #[test]
    fn parse_and_format_line() {
        let entry = LeaderboardEntry::parse("Ana - 7/10 @ 2024-03-05 09:41").unwrap();
        assert_eq!(entry.name, "Ana");
        assert_eq!(entry.score, 7);
        assert_eq!(entry.total, 10);
        assert_eq!(entry.timestamp, "2024-03-05 09:41");
        assert_eq!(entry.to_string(), "Ana - 7/10 @ 2024-03-05 09:41");
    }

    #[test]
    fn parse_allows_dash_in_name() {
        let entry = LeaderboardEntry::parse("Mary - Kate - 3/5 @ 2024-01-01 00:00").unwrap();
        assert_eq!(entry.name, "Mary - Kate");
        assert_eq!(entry.score, 3);
    }

    #[test]
    fn parse_rejects_off_grammar_lines() {
        assert!(LeaderboardEntry::parse("").is_none());
        assert!(LeaderboardEntry::parse("garbage").is_none());
        assert!(LeaderboardEntry::parse("Ana - seven/10 @ 2024-01-01 10:00").is_none());
        assert!(LeaderboardEntry::parse("Ana - 7 @ 2024-01-01 10:00").is_none());
        assert!(LeaderboardEntry::parse("Ana 7/10 @ 2024-01-01 10:00").is_none());
        assert!(LeaderboardEntry::parse("Ana - -1/10 @ 2024-01-01 10:00").is_none());
        assert!(LeaderboardEntry::parse("Ana - 7/10 @ zzz not a date").is_none());
        assert!(LeaderboardEntry::parse("Ana - 7/10 @ 2024-13-01 10:00").is_none());
        assert!(LeaderboardEntry::parse("Ana - 7/10 @ 2024-01-01").is_none());
    }

    #[test]
    fn off_format_timestamp_does_not_outrank_real_entries() {
        let (_dir, store) = store_with(&[
            "Real - 5/10 @ 2024-01-02 10:00",
            "Bogus - 5/10 @ zzz not a date",
        ]);
        let top = store.ranked_top(10).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Real");
    }

    #[test]
    fn ranks_by_score_then_recency() {
        let (_dir, store) = store_with(&[
            "A - 5/10 @ 2024-01-01 10:00",
            "B - 8/10 @ 2024-01-01 10:00",
            "C - 5/10 @ 2024-01-02 10:00",
        ]);
        let top = store.ranked_top(3).unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn ranked_top_limits_and_skips_bad_lines() {
        let (_dir, store) = store_with(&[
            "A - 1/10 @ 2024-01-01 10:00",
            "not a result",
            "B - 2/10 @ 2024-01-01 10:00",
            "",
            "C - 3/10 @ 2024-01-01 10:00",
        ]);
        let top = store.ranked_top(2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "C");
        assert_eq!(top[1].name, "B");
        assert_eq!(store.entries().unwrap().len(), 3);
    }

    #[test]
    fn ranked_top_is_repeatable() {
        let (_dir, store) = store_with(&[
            "A - 4/10 @ 2024-01-01 10:00",
            "B - 4/10 @ 2024-01-01 10:00",
            "C - 9/10 @ 2023-12-31 23:59",
        ]);
        let first = store.ranked_top(DEFAULT_TOP_N).unwrap();
        let second = store.ranked_top(DEFAULT_TOP_N).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[1].name, "A");
    }

    #[test]
    fn missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path().join("nothing-yet.txt"));
        assert!(store.ranked_top(10).unwrap().is_empty());
    }

    #[test]
    fn record_appends_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path().join("nested").join("results.txt"));

        let entry = store.record_result_at("Ana", 7, 10, at(2, 15, 4)).unwrap();
        assert_eq!(entry.timestamp, "2024-01-02 15:04");

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "Ana - 7/10 @ 2024-01-02 15:04\n");

        store.record_result_at("Bo", 9, 10, at(3, 8, 0)).unwrap();
        let top = store.ranked_top(10).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Bo");
        assert_eq!(top[1], entry);
    }

    #[test]
    fn record_with_current_time_is_listed() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path().join("results.txt"));
        let entry = store.record_result("Ana", 7, 10).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        let parsed = LeaderboardEntry::parse(content.lines().next().unwrap()).unwrap();
        assert_eq!(parsed, entry);
        assert_eq!(entry.timestamp.len(), "yyyy-MM-dd HH:mm".len());
        assert!(store.ranked_top(10).unwrap().contains(&entry));
    }

    #[test]
    fn newline_in_name_stays_on_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = LeaderboardStore::new(dir.path().join("results.txt"));
        store.record_result_at("An\na", 1, 2, at(1, 0, 0)).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert_eq!(store.entries().unwrap()[0].name, "An a");
    }

    #[test]
    fn unwritable_log_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let store = LeaderboardStore::new(dir.path());
        let err = store.record_result_at("Ana", 1, 1, at(1, 0, 0)).unwrap_err();
        assert!(matches!(err, QuizError::Persistence { .. }));
    }
}
