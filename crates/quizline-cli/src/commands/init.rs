//! The `quizline init` command.

use std::path::Path;

use anyhow::Result;

use quizline_core::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new(CONFIG_FILE_NAME), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("questions.txt"), SAMPLE_BANK)?;

    println!("\nNext steps:");
    println!("  1. Add your own questions to questions.txt");
    println!("  2. Run: quizline validate --bank questions.txt");
    println!("  3. Run: quizline play");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizline configuration

bank_path = "questions.txt"
results_path = "results.txt"
seconds_per_question = 10
max_questions = 10
leaderboard_limit = 10
feedback_pause_ms = 900
"#;

const SAMPLE_BANK: &str = "\
MCQ
Which keyword declares a mutable binding in Rust?
var
let mut
mut let
def
2

MCQ
Which macro prints a line to standard output?
print!
write!
println!
format!
3

TF
A Rust `String` is guaranteed to hold valid UTF-8.
True

TF
Rust uses a tracing garbage collector.
False

FIB
The Rust package manager is called ___.
Cargo

FIB
The trait that lets a type be printed with {} is ___.
Display
";
