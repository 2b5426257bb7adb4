//! quizline configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::leaderboard::DEFAULT_TOP_N;
use crate::session::{SessionSettings, DEFAULT_MAX_QUESTIONS};

/// File looked up in the current directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "quizline.toml";

/// Top-level quizline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Question bank file.
    #[serde(default = "default_bank_path")]
    pub bank_path: PathBuf,
    /// Leaderboard log file.
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
    /// Deadline per question.
    #[serde(default = "default_seconds")]
    pub seconds_per_question: u64,
    /// Questions drawn per session.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    /// Rows shown on the leaderboard.
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,
    /// Pause after feedback, in milliseconds.
    #[serde(default = "default_feedback_pause")]
    pub feedback_pause_ms: u64,
}

fn default_bank_path() -> PathBuf {
    PathBuf::from("questions.txt")
}
fn default_results_path() -> PathBuf {
    PathBuf::from("results.txt")
}
fn default_seconds() -> u64 {
    10
}
fn default_max_questions() -> usize {
    DEFAULT_MAX_QUESTIONS
}
fn default_leaderboard_limit() -> usize {
    DEFAULT_TOP_N
}
fn default_feedback_pause() -> u64 {
    900
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            bank_path: default_bank_path(),
            results_path: default_results_path(),
            seconds_per_question: default_seconds(),
            max_questions: default_max_questions(),
            leaderboard_limit: default_leaderboard_limit(),
            feedback_pause_ms: default_feedback_pause(),
        }
    }
}

impl QuizConfig {
    /// Parse a TOML string and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: QuizConfig = toml::from_str(content).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.seconds_per_question >= 1,
            "seconds_per_question must be at least 1"
        );
        anyhow::ensure!(self.max_questions >= 1, "max_questions must be at least 1");
        anyhow::ensure!(
            self.leaderboard_limit >= 1,
            "leaderboard_limit must be at least 1"
        );
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            max_questions: self.max_questions,
            time_per_question: Duration::from_secs(self.seconds_per_question),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            feedback_pause: Duration::from_millis(self.feedback_pause_ms),
            leaderboard_limit: self.leaderboard_limit,
        }
    }
}

/// Load configuration from [`CONFIG_FILE_NAME`] in the current directory,
/// falling back to defaults.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default location.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => Some(PathBuf::from(CONFIG_FILE_NAME)).filter(|p| p.exists()),
    };

    match config_path {
        Some(p) => {
            let content = std::fs::read_to_string(&p)
                .with_context(|| format!("failed to read config file: {}", p.display()))?;
            tracing::debug!("loaded config from {}", p.display());
            QuizConfig::from_toml_str(&content)
                .with_context(|| format!("invalid config file: {}", p.display()))
        }
        None => Ok(QuizConfig::default()),
    }
}
