//! The `quizline play` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use quizline_core::config::load_config_from;
use quizline_core::engine::{AnswerSource, QuizEngine, SessionObserver};
use quizline_core::leaderboard::{LeaderboardEntry, LeaderboardStore};
use quizline_core::model::{AnswerKey, Question};
use quizline_core::parser::FileBank;
use quizline_core::session::{Feedback, QuizSession};
use quizline_core::{ErrorKind, QuizError};

use super::leaderboard_table;

/// Lines from stdin, read on a plain thread so a pending read never holds
/// up runtime shutdown.
struct StdinLines {
    rx: mpsc::UnboundedReceiver<String>,
}

impl StdinLines {
    fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }

    async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Drop lines typed before the current prompt was shown. Returns how
    /// many were dropped.
    fn discard_pending(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

#[async_trait]
impl AnswerSource for StdinLines {
    async fn next_answer(&mut self, _: &Question, _: Duration) -> Option<String> {
        // Input typed after a timeout or during the feedback pause belongs
        // to no question.
        let dropped = self.discard_pending();
        if dropped > 0 {
            tracing::debug!(dropped, "discarded input typed before the question");
        }
        prompt("> ");
        // End of input counts as no answer.
        let line = self.next_line().await?;
        let line = line.trim();
        (!line.is_empty()).then(|| line.to_string())
    }
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// Prints the quiz transcript to stdout.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_question_presented(
        &self,
        position: usize,
        total: usize,
        question: &Question,
        remaining: Duration,
    ) {
        println!(
            "\nQuestion {}/{} ({}s)",
            position + 1,
            total,
            remaining.as_secs()
        );
        println!("{}", question.text());
        match question.key() {
            AnswerKey::MultipleChoice { options, .. } => {
                for (i, option) in options.iter().enumerate() {
                    println!("  {}. {}", i + 1, option);
                }
            }
            AnswerKey::TrueFalse { .. } => println!("  (true/false)"),
            AnswerKey::FillBlank { .. } => println!("  (type your answer)"),
        }
    }

    fn on_feedback(&self, feedback: &Feedback) {
        if feedback.timed_out {
            println!();
        }
        if feedback.correct {
            println!("{}", feedback.message());
        } else {
            let why = if feedback.timed_out { "Time up!" } else { "Wrong!" };
            println!("{why} Correct answer: {}", feedback.correct_answer);
        }
    }

    fn on_session_complete(&self, score: u32, total: u32, leaderboard: &[LeaderboardEntry]) {
        println!("\nYour score: {score}/{total}");
        if leaderboard.is_empty() {
            println!("Leaderboard unavailable.");
        } else {
            println!("\n{}", leaderboard_table(leaderboard));
        }
    }

    fn on_error(&self, kind: ErrorKind, message: &str) {
        eprintln!("Warning ({kind}): {message}");
    }
}

pub async fn execute(
    name: Option<String>,
    bank: Option<PathBuf>,
    results: Option<PathBuf>,
    seconds: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(bank) = bank {
        config.bank_path = bank;
    }
    if let Some(results) = results {
        config.results_path = results;
    }
    if let Some(seconds) = seconds {
        config.seconds_per_question = seconds;
    }
    config.validate()?;
    tracing::debug!(?config, "configuration resolved");

    let source = FileBank::new(&config.bank_path);
    let store = LeaderboardStore::new(&config.results_path);
    let mut session = QuizSession::new(config.session_settings(), store);
    let mut input = StdinLines::spawn();

    let mut candidate = name;
    loop {
        let name = match candidate.take() {
            Some(name) => name,
            None => {
                prompt("Enter your name: ");
                match input.next_line().await {
                    Some(line) => line,
                    None => anyhow::bail!("no name given"),
                }
            }
        };

        match session.start(&name, &source) {
            Ok(()) => break,
            Err(QuizError::Validation(reason)) => {
                tracing::debug!(%reason, "name rejected");
                println!("Please enter your name.");
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!(
        "Welcome, {}! {} questions, {}s each.",
        session.participant().unwrap_or_default(),
        session.total(),
        config.seconds_per_question
    );

    let engine = QuizEngine::new(config.engine_config());
    engine.run(&mut session, &mut input, &ConsoleObserver).await?;

    Ok(())
}
