//! Session driver.
//!
//! Runs a started [`QuizSession`] to completion against an [`AnswerSource`],
//! racing each answer against the question's deadline and reporting every
//! step to a [`SessionObserver`].

use std::time::Duration;

use async_trait::async_trait;

use crate::deadline::Resolution;
use crate::error::{ErrorKind, QuizError, QuizResult};
use crate::leaderboard::{LeaderboardEntry, DEFAULT_TOP_N};
use crate::model::Question;
use crate::session::{Completion, Feedback, PresentedQuestion, QuizSession, Step};

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pause after feedback before the next question is presented.
    pub feedback_pause: Duration,
    /// Rows in the leaderboard shown at the end.
    pub leaderboard_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            feedback_pause: Duration::from_millis(900),
            leaderboard_limit: DEFAULT_TOP_N,
        }
    }
}

/// Supplies the participant's answers.
#[async_trait]
pub trait AnswerSource: Send {
    /// Wait for an answer to `question`. `None` means the participant gave
    /// no answer. The engine drops this future if the deadline passes first.
    async fn next_answer(&mut self, question: &Question, remaining: Duration) -> Option<String>;
}

/// Callbacks for whatever presents the quiz.
pub trait SessionObserver: Send + Sync {
    fn on_question_presented(
        &self,
        position: usize,
        total: usize,
        question: &Question,
        remaining: Duration,
    );
    fn on_feedback(&self, feedback: &Feedback);
    fn on_session_complete(&self, score: u32, total: u32, leaderboard: &[LeaderboardEntry]);
    fn on_error(&self, kind: ErrorKind, message: &str);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_question_presented(&self, _: usize, _: usize, _: &Question, _: Duration) {}
    fn on_feedback(&self, _: &Feedback) {}
    fn on_session_complete(&self, _: u32, _: u32, _: &[LeaderboardEntry]) {}
    fn on_error(&self, _: ErrorKind, _: &str) {}
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct SessionOutcome {
    pub completion: Completion,
    /// Standings re-read from the log after this result was appended.
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Drives sessions from first question to leaderboard.
pub struct QuizEngine {
    config: EngineConfig,
}

impl QuizEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Play `session` (already started) to completion.
    ///
    /// Persistence failures are reported through `on_error` and do not
    /// abort the run; contract violations are returned.
    pub async fn run(
        &self,
        session: &mut QuizSession,
        answers: &mut dyn AnswerSource,
        observer: &dyn SessionObserver,
    ) -> QuizResult<SessionOutcome> {
        loop {
            match session.advance()? {
                Step::Question(presented) => {
                    let feedback = self
                        .play_question(session, presented, answers, observer)
                        .await?;
                    observer.on_feedback(&feedback);
                    if !self.config.feedback_pause.is_zero() {
                        tokio::time::sleep(self.config.feedback_pause).await;
                    }
                }
                Step::Complete(completion) => {
                    return Ok(self.finish(session, completion, observer));
                }
            }
        }
    }

    async fn play_question(
        &self,
        session: &mut QuizSession,
        presented: PresentedQuestion,
        answers: &mut dyn AnswerSource,
        observer: &dyn SessionObserver,
    ) -> QuizResult<Feedback> {
        let PresentedQuestion {
            position,
            total,
            question,
            remaining,
            expiry,
        } = presented;
        observer.on_question_presented(position, total, &question, remaining);

        tokio::select! {
            answer = answers.next_answer(&question, remaining) => session.submit(answer.as_deref()),
            resolution = expiry.wait() => match resolution {
                Resolution::Expired => session.time_out(),
                Resolution::Cancelled => Err(QuizError::InvalidState(
                    "countdown cancelled while waiting for an answer".into(),
                )),
            },
        }
    }

    fn finish(
        &self,
        session: &QuizSession,
        completion: Completion,
        observer: &dyn SessionObserver,
    ) -> SessionOutcome {
        if let Err(e) = &completion.persisted {
            observer.on_error(e.kind(), &e.to_string());
        }

        let leaderboard = match session
            .leaderboard()
            .ranked_top(self.config.leaderboard_limit)
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("could not read leaderboard: {e}");
                observer.on_error(e.kind(), &e.to_string());
                Vec::new()
            }
        };

        observer.on_session_complete(completion.score, completion.total, &leaderboard);
        SessionOutcome {
            completion,
            leaderboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::leaderboard::LeaderboardStore;
    use crate::parser::InlineBank;
    use crate::session::SessionSettings;

    enum Scripted {
        Say(&'static str),
        Blank,
        Silent,
    }

    struct ScriptedAnswers(VecDeque<Scripted>);

    #[async_trait]
    impl AnswerSource for ScriptedAnswers {
        async fn next_answer(&mut self, _: &Question, _: Duration) -> Option<String> {
            match self.0.pop_front() {
                Some(Scripted::Say(s)) => Some(s.to_string()),
                Some(Scripted::Blank) | None => None,
                Some(Scripted::Silent) => std::future::pending().await,
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl SessionObserver for RecordingObserver {
        fn on_question_presented(&self, position: usize, total: usize, _: &Question, remaining: Duration) {
            self.push(format!("question {}/{} {}s", position + 1, total, remaining.as_secs()));
        }

        fn on_feedback(&self, feedback: &Feedback) {
            self.push(format!("feedback {}", feedback.message()));
        }

        fn on_session_complete(&self, score: u32, total: u32, leaderboard: &[LeaderboardEntry]) {
            self.push(format!("complete {score}/{total} rows={}", leaderboard.len()));
        }

        fn on_error(&self, kind: ErrorKind, _: &str) {
            self.push(format!("error {kind}"));
        }
    }

    const BANK: &str = "TF\nOne\ntrue\nTF\nTwo\ntrue\nTF\nThree\ntrue\n";

    fn started_session(results: std::path::PathBuf) -> QuizSession {
        let mut session = QuizSession::new(SessionSettings::default(), LeaderboardStore::new(results));
        session
            .start_with_rng("Ana", &InlineBank(BANK.into()), &mut StdRng::seed_from_u64(1))
            .unwrap();
        session
    }

    #[tokio::test(start_paused = true)]
    async fn runs_session_with_answers_and_timeouts() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results.txt");
        std::fs::write(&results, "Bo - 3/3 @ 2020-01-01 00:00\n").unwrap();
        let mut session = started_session(results.clone());

        let mut answers = ScriptedAnswers(VecDeque::from([
            Scripted::Say("t"),
            Scripted::Silent,
            Scripted::Say("false"),
        ]));
        let observer = RecordingObserver::default();
        let engine = QuizEngine::new(EngineConfig::default());

        let outcome = engine.run(&mut session, &mut answers, &observer).await.unwrap();
        assert_eq!(outcome.completion.score, 1);
        assert_eq!(outcome.completion.total, 3);
        assert_eq!(outcome.leaderboard.len(), 2);
        assert_eq!(outcome.leaderboard[0].name, "Bo");
        assert_eq!(outcome.leaderboard[1].name, "Ana");

        assert_eq!(
            observer.events(),
            vec![
                "question 1/3 10s",
                "feedback Correct!",
                "question 2/3 10s",
                "feedback Time up! True",
                "question 3/3 10s",
                "feedback Wrong! True",
                "complete 1/3 rows=2",
            ]
        );
        assert_eq!(std::fs::read_to_string(&results).unwrap().lines().count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_answer_is_wrong_not_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = started_session(dir.path().join("results.txt"));
        let mut answers = ScriptedAnswers(VecDeque::from([Scripted::Blank]));
        let engine = QuizEngine::new(EngineConfig {
            feedback_pause: Duration::ZERO,
            leaderboard_limit: 1,
        });

        let observer = RecordingObserver::default();
        let outcome = engine.run(&mut session, &mut answers, &observer).await.unwrap();
        assert_eq!(outcome.completion.score, 0);
        assert_eq!(outcome.leaderboard.len(), 1);
        assert!(observer
            .events()
            .iter()
            .all(|e| !e.starts_with("feedback Time up!")));
    }

    #[tokio::test(start_paused = true)]
    async fn persistence_failure_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // The log path is a directory, so both append and read fail.
        let mut session = started_session(dir.path().to_path_buf());
        let mut answers = ScriptedAnswers(VecDeque::from([
            Scripted::Say("true"),
            Scripted::Say("true"),
            Scripted::Say("true"),
        ]));
        let observer = RecordingObserver::default();

        let outcome = QuizEngine::new(EngineConfig::default())
            .run(&mut session, &mut answers, &observer)
            .await
            .unwrap();
        assert_eq!(outcome.completion.score, 3);
        assert!(outcome.completion.persisted.is_err());
        assert!(outcome.leaderboard.is_empty());

        let events = observer.events();
        assert_eq!(
            events.iter().filter(|e| *e == "error persistence").count(),
            2
        );
        assert_eq!(events.last().unwrap(), "complete 3/3 rows=0");
    }

    #[tokio::test]
    async fn run_requires_started_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = QuizSession::new(
            SessionSettings::default(),
            LeaderboardStore::new(dir.path().join("results.txt")),
        );
        let err = QuizEngine::new(EngineConfig::default())
            .run(&mut session, &mut ScriptedAnswers(VecDeque::new()), &NoopObserver)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}
