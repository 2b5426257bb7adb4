//! Timed quiz session state machine.
//!
//! ```text
//! AwaitingName -> Loading -> InProgress(position) -> Complete
//! ```
//!
//! `start` loads and shuffles the bank, `advance` presents the next question
//! (or completes the session), and `submit`/`time_out` grade the question that
//! is currently live. Exactly one grading is accepted per question.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::deadline::{self, Countdown, Expiry};
use crate::error::{QuizError, QuizResult};
use crate::leaderboard::{LeaderboardEntry, LeaderboardStore};
use crate::model::Question;
use crate::parser::{parse_bank, BankSource};

/// Questions drawn per session when the bank is large enough.
pub const DEFAULT_MAX_QUESTIONS: usize = 10;

/// Time allowed per question.
pub const DEFAULT_TIME_PER_QUESTION: Duration = Duration::from_secs(10);

/// Tunables for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Upper bound on questions drawn from the shuffled bank. Must be at
    /// least 1; [`QuizSession::start`] rejects 0.
    pub max_questions: usize,
    /// Deadline for each question.
    pub time_per_question: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            time_per_question: DEFAULT_TIME_PER_QUESTION,
        }
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingName,
    Loading,
    /// `position` is `None` until the first `advance`.
    InProgress {
        position: Option<usize>,
        answered: bool,
    },
    Complete,
}

/// Result of grading one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub correct: bool,
    pub timed_out: bool,
    /// The question's correct answer, as shown to the user.
    pub correct_answer: String,
    /// Empty when correct, otherwise `"Time up! "` or `"Wrong! "` followed by
    /// the correct answer.
    pub explanation: String,
}

impl Feedback {
    /// One-line message for display.
    pub fn message(&self) -> &str {
        if self.correct {
            "Correct!"
        } else {
            &self.explanation
        }
    }
}

/// A question that has just gone live.
#[derive(Debug)]
pub struct PresentedQuestion {
    /// 0-based position within the session.
    pub position: usize,
    pub total: usize,
    pub question: Question,
    pub remaining: Duration,
    /// Resolves when the deadline passes or the question is answered.
    pub expiry: Expiry,
}

/// Summary of a finished session.
#[derive(Debug)]
pub struct Completion {
    pub participant: String,
    pub score: u32,
    pub total: u32,
    /// The leaderboard line written for this session. A failed write does
    /// not affect the score above.
    pub persisted: QuizResult<LeaderboardEntry>,
}

/// What `advance` produced.
#[derive(Debug)]
pub enum Step {
    Question(PresentedQuestion),
    Complete(Completion),
}

/// A single participant's run through the bank.
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    settings: SessionSettings,
    store: LeaderboardStore,
    state: SessionState,
    participant: Option<String>,
    questions: Vec<Question>,
    score: u32,
    countdown: Option<Countdown>,
}

impl QuizSession {
    pub fn new(settings: SessionSettings, store: LeaderboardStore) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings,
            store,
            state: SessionState::AwaitingName,
            participant: None,
            questions: Vec::new(),
            score: 0,
            countdown: None,
        }
    }

    /// Accept a participant name and load a shuffled draw from `source`.
    pub fn start(&mut self, name: &str, source: &dyn BankSource) -> QuizResult<()> {
        self.start_with_rng(name, source, &mut rand::thread_rng())
    }

    /// Like [`start`](Self::start) with a caller-supplied RNG.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        source: &dyn BankSource,
        rng: &mut R,
    ) -> QuizResult<()> {
        if !matches!(
            self.state,
            SessionState::AwaitingName | SessionState::Complete
        ) {
            return Err(QuizError::invalid_state(
                "a session is already in progress; reset it first",
            ));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(QuizError::Validation("please enter your name".into()));
        }
        if self.settings.max_questions == 0 {
            return Err(QuizError::Validation(
                "max_questions must be at least 1".into(),
            ));
        }
        if self.settings.time_per_question.is_zero() {
            return Err(QuizError::Validation(
                "time_per_question must be non-zero".into(),
            ));
        }

        self.reset();
        self.state = SessionState::Loading;

        let mut bank = match source.read_to_string() {
            Ok(text) => parse_bank(&text),
            Err(e) => {
                self.state = SessionState::AwaitingName;
                return Err(e);
            }
        };
        if bank.is_empty() {
            self.state = SessionState::AwaitingName;
            return Err(QuizError::EmptyBank {
                source_name: source.describe(),
            });
        }

        let bank_size = bank.len();
        bank.shuffle(rng);
        bank.truncate(self.settings.max_questions);

        self.id = Uuid::new_v4();
        self.participant = Some(name.to_string());
        self.questions = bank;
        self.score = 0;
        self.state = SessionState::InProgress {
            position: None,
            answered: false,
        };

        tracing::info!(
            session = %self.id,
            participant = name,
            bank_size,
            drawn = self.questions.len(),
            "session started"
        );
        Ok(())
    }

    /// Move to the next question, or complete the session after the last one.
    ///
    /// Completing appends exactly one result to the leaderboard.
    pub fn advance(&mut self) -> QuizResult<Step> {
        let next = match self.state {
            SessionState::InProgress { position: None, .. } => 0,
            SessionState::InProgress {
                position: Some(p),
                answered: true,
            } => p + 1,
            SessionState::InProgress {
                position: Some(p),
                answered: false,
            } => {
                return Err(QuizError::invalid_state(format!(
                    "question {} has not been answered yet",
                    p + 1
                )))
            }
            SessionState::Complete => {
                return Err(QuizError::invalid_state("session is already complete"))
            }
            SessionState::AwaitingName | SessionState::Loading => {
                return Err(QuizError::invalid_state("advance() called before start()"))
            }
        };

        if let Some(mut previous) = self.countdown.take() {
            previous.cancel();
        }

        if next >= self.questions.len() {
            return Ok(Step::Complete(self.complete()));
        }

        let (countdown, expiry) = deadline::arm(self.settings.time_per_question);
        let remaining = countdown.duration();
        self.countdown = Some(countdown);
        self.state = SessionState::InProgress {
            position: Some(next),
            answered: false,
        };

        tracing::debug!(session = %self.id, position = next, "question presented");
        Ok(Step::Question(PresentedQuestion {
            position: next,
            total: self.questions.len(),
            question: self.questions[next].clone(),
            remaining,
            expiry,
        }))
    }

    /// Grade an answer for the live question. `None` means no answer given.
    ///
    /// An answer arriving after the deadline has passed is graded as a
    /// timeout.
    pub fn submit(&mut self, answer: Option<&str>) -> QuizResult<Feedback> {
        let late = self.countdown.as_ref().is_some_and(Countdown::is_elapsed);
        self.resolve(answer, late)
    }

    /// Record that the live question's deadline passed unanswered.
    pub fn time_out(&mut self) -> QuizResult<Feedback> {
        self.resolve(None, true)
    }

    fn resolve(&mut self, answer: Option<&str>, timed_out: bool) -> QuizResult<Feedback> {
        let position = match self.state {
            SessionState::InProgress {
                position: Some(p),
                answered: false,
            } => p,
            SessionState::InProgress {
                position: Some(p),
                answered: true,
            } => {
                return Err(QuizError::invalid_state(format!(
                    "question {} was already answered",
                    p + 1
                )))
            }
            _ => return Err(QuizError::invalid_state("no question is awaiting an answer")),
        };

        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }

        let question = &self.questions[position];
        let correct = !timed_out && question.is_correct(answer);
        if correct {
            self.score += 1;
        }
        self.state = SessionState::InProgress {
            position: Some(position),
            answered: true,
        };

        let correct_answer = question.correct_answer_display();
        let explanation = if correct {
            String::new()
        } else {
            let prefix = if timed_out { "Time up! " } else { "Wrong! " };
            format!("{prefix}{correct_answer}")
        };

        tracing::debug!(
            session = %self.id,
            position,
            correct,
            timed_out,
            "question graded"
        );
        Ok(Feedback {
            correct,
            timed_out,
            correct_answer,
            explanation,
        })
    }

    fn complete(&mut self) -> Completion {
        self.state = SessionState::Complete;
        let participant = self.participant.clone().unwrap_or_default();
        let total = self.total();

        let persisted = self.store.record_result(&participant, self.score, total);
        if let Err(e) = &persisted {
            tracing::warn!(session = %self.id, "result not saved: {e}");
        }

        tracing::info!(
            session = %self.id,
            participant = %participant,
            score = self.score,
            total,
            "session complete"
        );
        Completion {
            participant,
            score: self.score,
            total,
            persisted,
        }
    }

    /// Abandon the current session without recording anything.
    pub fn reset(&mut self) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }
        if matches!(self.state, SessionState::InProgress { .. }) {
            tracing::info!(session = %self.id, "session abandoned");
        }
        self.state = SessionState::AwaitingName;
        self.participant = None;
        self.questions.clear();
        self.score = 0;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.store
    }

    pub fn participant(&self) -> Option<&str> {
        self.participant.as_deref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of questions drawn for this session.
    pub fn total(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// `None` before the first question is presented.
    pub fn current_position(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress { position, .. } => position,
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_position().and_then(|p| self.questions.get(p))
    }

    /// Time left on the live question, if one is live.
    pub fn remaining_time(&self) -> Option<Duration> {
        self.countdown.as_ref().map(Countdown::remaining)
    }
}
