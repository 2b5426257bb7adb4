//! The `quizline validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizline_core::model::BankSummary;
use quizline_core::parser::parse_bank_report;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&bank_path)
        .with_context(|| format!("failed to read question bank: {}", bank_path.display()))?;
    let report = parse_bank_report(&content);
    let summary = BankSummary::of(&report.questions);

    println!(
        "Question bank: {} ({} questions: {} MCQ, {} TF, {} FIB)",
        bank_path.display(),
        summary.total(),
        summary.multiple_choice,
        summary.true_false,
        summary.fill_blank
    );

    for w in &report.warnings {
        println!("  [line {}] WARNING: {}", w.line, w.message);
    }

    anyhow::ensure!(
        summary.total() > 0,
        "no questions found in {}",
        bank_path.display()
    );

    if report.warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", report.warnings.len());
    }

    Ok(())
}
