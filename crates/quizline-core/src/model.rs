//! Question model and grading rules.
//!
//! A [`Question`] pairs its prompt text with one of three answer bodies. All
//! grading is a pure function of the question and the user's raw input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QuizError, QuizResult};

/// Number of options on every multiple-choice question.
pub const OPTION_COUNT: usize = 4;

/// The three supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "MCQ"),
            QuestionKind::TrueFalse => write!(f, "TF"),
            QuestionKind::FillBlank => write!(f, "FIB"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mcq" => Ok(QuestionKind::MultipleChoice),
            "tf" => Ok(QuestionKind::TrueFalse),
            "fib" => Ok(QuestionKind::FillBlank),
            other => Err(format!("unknown question tag: {other}")),
        }
    }
}

/// Kind-specific answer data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerKey {
    MultipleChoice {
        options: [String; OPTION_COUNT],
        /// 1-based, matching the numbering shown to the user.
        correct_index: u8,
    },
    TrueFalse {
        correct: bool,
    },
    FillBlank {
        /// Stored trimmed.
        answer: String,
    },
}

/// A single immutable quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    text: String,
    key: AnswerKey,
}

impl Question {
    /// Build a multiple-choice question. `correct_index` is 1-based.
    pub fn multiple_choice(
        text: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_index: u8,
    ) -> QuizResult<Self> {
        if !(1..=OPTION_COUNT as u8).contains(&correct_index) {
            return Err(QuizError::Validation(format!(
                "correct option must be between 1 and {OPTION_COUNT}, got {correct_index}"
            )));
        }
        Self::with_key(
            text,
            AnswerKey::MultipleChoice {
                options,
                correct_index,
            },
        )
    }

    pub fn true_false(text: impl Into<String>, correct: bool) -> QuizResult<Self> {
        Self::with_key(text, AnswerKey::TrueFalse { correct })
    }

    /// Build a fill-in-the-blank question. The expected answer is trimmed.
    pub fn fill_blank(text: impl Into<String>, answer: &str) -> QuizResult<Self> {
        Self::with_key(
            text,
            AnswerKey::FillBlank {
                answer: answer.trim().to_string(),
            },
        )
    }

    fn with_key(text: impl Into<String>, key: AnswerKey) -> QuizResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuizError::Validation("question text is empty".into()));
        }
        Ok(Self { text, key })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    pub fn kind(&self) -> QuestionKind {
        match self.key {
            AnswerKey::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            AnswerKey::TrueFalse { .. } => QuestionKind::TrueFalse,
            AnswerKey::FillBlank { .. } => QuestionKind::FillBlank,
        }
    }

    /// Options for a multiple-choice question, `None` for other kinds.
    pub fn options(&self) -> Option<&[String; OPTION_COUNT]> {
        match &self.key {
            AnswerKey::MultipleChoice { options, .. } => Some(options),
            _ => None,
        }
    }

    /// Grade a raw user answer. An absent answer is never correct.
    ///
    /// - Multiple choice: a numeric answer equal to the 1-based index wins.
    ///   Otherwise the answer must match the correct option's text, ignoring
    ///   case and surrounding whitespace. Out-of-range numbers are not
    ///   rejected, they just fail both checks.
    /// - True/false: `true`/`t` and `false`/`f`, case-insensitive. Any other
    ///   input is wrong.
    /// - Fill in the blank: trimmed, case-insensitive match; blank input is
    ///   never correct.
    pub fn is_correct(&self, user_answer: Option<&str>) -> bool {
        let Some(raw) = user_answer else {
            return false;
        };
        let answer = raw.trim();

        match &self.key {
            AnswerKey::MultipleChoice {
                options,
                correct_index,
            } => {
                answer
                    .parse::<i64>()
                    .is_ok_and(|n| n == i64::from(*correct_index))
                    || (!answer.is_empty()
                        && eq_ignore_case(options[usize::from(*correct_index) - 1].trim(), answer))
            }
            AnswerKey::TrueFalse { correct } => {
                parse_true_false(answer).is_some_and(|given| given == *correct)
            }
            AnswerKey::FillBlank { answer: expected } => {
                !answer.is_empty() && eq_ignore_case(expected, answer)
            }
        }
    }

    /// Human-readable correct answer, used in feedback.
    pub fn correct_answer_display(&self) -> String {
        match &self.key {
            AnswerKey::MultipleChoice {
                options,
                correct_index,
            } => format!(
                "{}. {}",
                correct_index,
                options[usize::from(*correct_index) - 1]
            ),
            AnswerKey::TrueFalse { correct: true } => "True".to_string(),
            AnswerKey::TrueFalse { correct: false } => "False".to_string(),
            AnswerKey::FillBlank { answer } => answer.clone(),
        }
    }
}

fn parse_true_false(answer: &str) -> Option<bool> {
    match answer.to_lowercase().as_str() {
        "true" | "t" => Some(true),
        "false" | "f" => Some(false),
        _ => None,
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Question counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BankSummary {
    pub multiple_choice: usize,
    pub true_false: usize,
    pub fill_blank: usize,
}

impl BankSummary {
    pub fn of(questions: &[Question]) -> Self {
        questions
            .iter()
            .fold(Self::default(), |mut summary, q| {
                match q.kind() {
                    QuestionKind::MultipleChoice => summary.multiple_choice += 1,
                    QuestionKind::TrueFalse => summary.true_false += 1,
                    QuestionKind::FillBlank => summary.fill_blank += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.multiple_choice + self.true_false + self.fill_blank
    }
}
