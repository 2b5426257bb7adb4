//! Quiz error types.
//!
//! Every fallible core operation returns a [`QuizError`]. The shell inspects
//! [`QuizError::kind`] to decide whether to re-prompt, show a notice, or warn.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the question model, session, and leaderboard store.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Input rejected before any state changed (e.g. an empty name).
    #[error("invalid input: {0}")]
    Validation(String),

    /// The question bank could not be read.
    #[error("failed to load question bank from {source_name}: {source}")]
    Load {
        source_name: String,
        #[source]
        source: io::Error,
    },

    /// The question bank was readable but held no usable questions.
    #[error("no questions found in {source_name}")]
    EmptyBank { source_name: String },

    /// An operation was invoked in a state that does not allow it.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// The leaderboard log could not be appended to or read.
    #[error("leaderboard log {path} unavailable: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of a [`QuizError`], passed to `on_error` callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Load,
    EmptyBank,
    InvalidState,
    Persistence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Load => write!(f, "load"),
            ErrorKind::EmptyBank => write!(f, "empty-bank"),
            ErrorKind::InvalidState => write!(f, "invalid-state"),
            ErrorKind::Persistence => write!(f, "persistence"),
        }
    }
}

impl QuizError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::Validation(_) => ErrorKind::Validation,
            QuizError::Load { .. } => ErrorKind::Load,
            QuizError::EmptyBank { .. } => ErrorKind::EmptyBank,
            QuizError::InvalidState(_) => ErrorKind::InvalidState,
            QuizError::Persistence { .. } => ErrorKind::Persistence,
        }
    }

    /// Returns `false` for contract violations the caller must not retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, QuizError::InvalidState(_))
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        QuizError::InvalidState(msg.into())
    }
}

/// Shorthand for results carrying a [`QuizError`].
pub type QuizResult<T> = Result<T, QuizError>;
