//! `zia shell` — Interactive REPL over both pipelines.
//!
//! Every line is one invocation; the model sessions are created on first use
//! and reused for the rest of the shell.

use crate::domain::{parse_model_kind, ModelKind};
use crate::ml::HandleState;
use crate::pipeline::{Predictor, RegionReport};

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Run { kind: ModelKind, features: String },
    Status,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

/// Split a shell line into a command word and its comma-separated payload.
pub fn parse_line(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    match word {
        "exit" | "quit" | "q" => ShellCommand::Exit,
        "help" | "?" => ShellCommand::Help,
        "status" => ShellCommand::Status,
        _ => match parse_model_kind(word) {
            Ok(kind) => ShellCommand::Run {
                kind,
                features: rest.to_string(),
            },
            Err(_) => ShellCommand::Unknown(word.to_string()),
        },
    }
}

pub async fn run(predictor: &Predictor, json: bool) -> anyhow::Result<()> {
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    println!("\x1b[36mzia interactive shell\x1b[0m");
    println!("Type 'help' for available commands, 'exit' to quit.");
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("\x1b[36mzia>\x1b[0m ") {
            Ok(line) => {
                let command = parse_line(&line);
                if command != ShellCommand::Empty {
                    let _ = rl.add_history_entry(line.trim());
                }

                match command {
                    ShellCommand::Empty => continue,
                    ShellCommand::Exit => break,
                    ShellCommand::Help => print_shell_help(),
                    ShellCommand::Status => print_status(predictor),
                    ShellCommand::Unknown(word) => {
                        eprintln!("unknown command '{word}' (try 'help')");
                    }
                    ShellCommand::Run { kind, features } => {
                        let report = RegionReport::new(kind, predictor.run(kind, &features).await);
                        if report.is_error() {
                            tracing::error!(model = %kind, error = ?report.error, "shell request failed");
                        }
                        if json {
                            println!("{}", serde_json::to_string(&report)?);
                        } else {
                            println!("{}", report.text);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    Ok(())
}

fn print_status(predictor: &Predictor) {
    for kind in ModelKind::ALL {
        let state = match predictor.registry().state(kind) {
            HandleState::Ready => "ready",
            HandleState::Uninitialized => "not loaded",
        };
        println!(
            "  {:<15} {:<11} ({} creation attempts)",
            kind.as_str(),
            state,
            predictor.registry().creation_attempts(kind)
        );
    }
}

fn print_shell_help() {
    println!("Available commands:");
    println!("  reg <csv>   (regression, 11 features)");
    println!("  cls <csv>   (classification, 4 features)");
    println!("  status      (model session state)");
    println!("  help        (this message)");
    println!("  exit        (quit shell)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_model_lines() {
        assert_eq!(
            parse_line("cls 5.1, 3.5, 1.4, 0.2"),
            ShellCommand::Run {
                kind: ModelKind::Classification,
                features: "5.1, 3.5, 1.4, 0.2".to_string(),
            }
        );
        assert_eq!(
            parse_line("  regression   1,2  "),
            ShellCommand::Run {
                kind: ModelKind::Regression,
                features: "1,2".to_string(),
            }
        );
    }

    #[test]
    fn bare_model_word_runs_with_empty_payload() {
        // the pipeline then reports "Input is empty."
        assert_eq!(
            parse_line("reg"),
            ShellCommand::Run {
                kind: ModelKind::Regression,
                features: String::new(),
            }
        );
    }

    #[test]
    fn control_words() {
        assert_eq!(parse_line(""), ShellCommand::Empty);
        assert_eq!(parse_line("q"), ShellCommand::Exit);
        assert_eq!(parse_line("?"), ShellCommand::Help);
        assert_eq!(parse_line("status"), ShellCommand::Status);
        assert_eq!(parse_line("train 1,2"), ShellCommand::Unknown("train".to_string()));
    }
}
