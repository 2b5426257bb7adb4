//! quizline-core — Question model, bank parser, timed sessions, and leaderboard.
//!
//! This crate holds every rule of the quiz: how questions are graded, how a
//! bank file is read, how a session moves from question to question under a
//! deadline, and how finished sessions are ranked. Presentation lives in the
//! CLI crate and talks to the core through [`engine::SessionObserver`].

pub mod config;
pub mod deadline;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod model;
pub mod parser;
pub mod session;

pub use error::{ErrorKind, QuizError, QuizResult};
