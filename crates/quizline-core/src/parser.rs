//! Question bank parser.
//!
//! A bank is a flat sequence of blocks, each opened by a tag line:
//!
//! ```text
//! MCQ                 TF                  FIB
//! <question>          <question>          <question>
//! <option 1>          <true|false>        <answer>
//! <option 2>
//! <option 3>
//! <option 4>
//! <correct index 1-4>
//! ```
//!
//! Parsing is lenient: blank lines between blocks are ignored, unknown tag
//! lines are skipped, malformed blocks are dropped, and a trailing block that
//! runs out of lines ends the parse. None of these raise an error.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{QuizError, QuizResult};
use crate::model::{Question, QuestionKind, OPTION_COUNT};

/// Data lines following each tag.
const MCQ_LINES: usize = 1 + OPTION_COUNT + 1;
const TF_LINES: usize = 2;
const FIB_LINES: usize = 2;

/// A non-fatal problem found while parsing a bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankWarning {
    /// 1-based line number of the offending tag or line.
    pub line: usize,
    /// Warning message.
    pub message: String,
}

/// Parsed questions plus everything the parser silently dropped.
#[derive(Debug, Clone, Default)]
pub struct BankReport {
    pub questions: Vec<Question>,
    pub warnings: Vec<BankWarning>,
}

/// Parse bank text into questions in file order.
pub fn parse_bank(text: &str) -> Vec<Question> {
    parse_bank_report(text).questions
}

/// Parse bank text, keeping a record of skipped and truncated blocks.
pub fn parse_bank_report(text: &str) -> BankReport {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    let mut report = BankReport::default();
    let mut i = 0;

    while i < lines.len() {
        let tag_line = lines[i].trim();
        if tag_line.is_empty() {
            i += 1;
            continue;
        }

        let Ok(kind) = tag_line.parse::<QuestionKind>() else {
            tracing::debug!("line {}: skipping unrecognized line '{}'", i + 1, tag_line);
            report.warn(i, format!("unrecognized line skipped: '{tag_line}'"));
            i += 1;
            continue;
        };

        let needed = match kind {
            QuestionKind::MultipleChoice => MCQ_LINES,
            QuestionKind::TrueFalse => TF_LINES,
            QuestionKind::FillBlank => FIB_LINES,
        };
        if i + needed >= lines.len() {
            tracing::warn!(
                "line {}: {} block needs {} lines but only {} remain, stopping",
                i + 1,
                kind,
                needed,
                lines.len() - i - 1
            );
            report.warn(
                i,
                format!(
                    "incomplete {kind} block at end of bank ({} of {needed} lines), ignored",
                    lines.len() - i - 1
                ),
            );
            break;
        }

        let data = &lines[i + 1..=i + needed];
        match build_question(kind, data) {
            Ok(question) => report.questions.push(question),
            Err(reason) => {
                tracing::warn!("line {}: skipping malformed {} block: {}", i + 1, kind, reason);
                report.warn(i, format!("malformed {kind} block skipped: {reason}"));
            }
        }
        i += needed + 1;
    }

    report
}

impl BankReport {
    fn warn(&mut self, index: usize, message: String) {
        self.warnings.push(BankWarning {
            line: index + 1,
            message,
        });
    }
}

fn build_question(kind: QuestionKind, data: &[&str]) -> Result<Question, String> {
    let text = data[0].trim();
    let question = match kind {
        QuestionKind::MultipleChoice => {
            let options = [
                data[1].trim().to_string(),
                data[2].trim().to_string(),
                data[3].trim().to_string(),
                data[4].trim().to_string(),
            ];
            let raw_index = data[5].trim();
            let index = raw_index
                .parse::<u8>()
                .map_err(|_| format!("correct index '{raw_index}' is not a number"))?;
            Question::multiple_choice(text, options, index)
        }
        QuestionKind::TrueFalse => {
            Question::true_false(text, data[1].trim().eq_ignore_ascii_case("true"))
        }
        QuestionKind::FillBlank => Question::fill_blank(text, data[1]),
    };
    question.map_err(|e| match e {
        QuizError::Validation(msg) => msg,
        other => other.to_string(),
    })
}

/// Read and parse a bank file.
pub fn load_bank(path: &Path) -> QuizResult<Vec<Question>> {
    let source = FileBank::new(path);
    Ok(parse_bank(&source.read_to_string()?))
}

/// Where the raw bank text comes from.
pub trait BankSource {
    /// Human-readable origin, used in error messages.
    fn describe(&self) -> String;

    /// Fetch the full bank text.
    fn read_to_string(&self) -> QuizResult<String>;
}

/// A bank stored in a UTF-8 file.
#[derive(Debug, Clone)]
pub struct FileBank {
    path: PathBuf,
}

impl FileBank {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BankSource for FileBank {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_to_string(&self) -> QuizResult<String> {
        std::fs::read_to_string(&self.path).map_err(|source| QuizError::Load {
            source_name: self.describe(),
            source,
        })
    }
}

/// A bank held in memory.
#[derive(Debug, Clone)]
pub struct InlineBank(pub String);

impl BankSource for InlineBank {
    fn describe(&self) -> String {
        "inline bank".to_string()
    }

    fn read_to_string(&self) -> QuizResult<String> {
        Ok(self.0.clone())
    }
}
