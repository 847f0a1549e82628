use std::path::PathBuf;
use std::str::FromStr;

use crate::config::FillStrategy;
use crate::error::{Result, SweeperError};
use crate::export::ExportFormat;

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Load(PathBuf),
    Show(String),
    Dedupe(String),
    Fill(String, FillStrategy),
    Undo(String),
    Redo(String),
    Chart {
        file: String,
        column: Option<String>,
        out: Option<PathBuf>,
    },
    Report {
        file: String,
        dir: Option<PathBuf>,
    },
    Export {
        file: String,
        format: ExportFormat,
        dir: Option<PathBuf>,
    },
    History,
    Files,
    Help,
    Quit,
}

pub const HELP: &[&str] = &[
    "Commands:",
    "  load <path>                      upload a .csv or .xlsx file",
    "  show <file>                      preview the current state of a file",
    "  dedupe <file>                    remove duplicate rows",
    "  fill <file> <mean|median|mode>   fill missing numeric values",
    "  undo <file> / redo <file>        step through a file's history",
    "  chart <file> [column] [out.svg]  bar chart of a numeric column",
    "  report <file> [dir]              write a PDF summary",
    "  export <file> <csv|excel> [dir]  convert and save",
    "  history                          list uploaded files",
    "  files                            list files with history",
    "  help                             show this message",
    "  quit                             leave the shell",
];

impl FromStr for ShellCommand {
    type Err = SweeperError;

    fn from_str(line: &str) -> Result<Self> {
        let tokens = tokenize(line)?;
        let Some((name, args)) = tokens.split_first() else {
            return Err(SweeperError::InvalidCommand("empty command".to_string()));
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "load" => ShellCommand::Load(PathBuf::from(required(args, 0, "load <path>")?)),
            "show" => ShellCommand::Show(required(args, 0, "show <file>")?),
            "dedupe" => ShellCommand::Dedupe(required(args, 0, "dedupe <file>")?),
            "fill" => {
                let usage = "fill <file> <mean|median|mode>";
                let file = required(args, 0, usage)?;
                let strategy = required(args, 1, usage)?.parse::<FillStrategy>()?;
                ShellCommand::Fill(file, strategy)
            }
            "undo" => ShellCommand::Undo(required(args, 0, "undo <file>")?),
            "redo" => ShellCommand::Redo(required(args, 0, "redo <file>")?),
            "chart" => ShellCommand::Chart {
                file: required(args, 0, "chart <file> [column] [out.svg]")?,
                column: args.get(1).cloned(),
                out: args.get(2).map(PathBuf::from),
            },
            "report" => ShellCommand::Report {
                file: required(args, 0, "report <file> [dir]")?,
                dir: args.get(1).map(PathBuf::from),
            },
            "export" => {
                let usage = "export <file> <csv|excel> [dir]";
                ShellCommand::Export {
                    file: required(args, 0, usage)?,
                    format: required(args, 1, usage)?.parse::<ExportFormat>()?,
                    dir: args.get(2).map(PathBuf::from),
                }
            }
            "history" => ShellCommand::History,
            "files" => ShellCommand::Files,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => {
                return Err(SweeperError::InvalidCommand(format!(
                    "unknown command '{}' (try 'help')",
                    other
                )));
            }
        };
        Ok(command)
    }
}

fn required(args: &[String], idx: usize, usage: &str) -> Result<String> {
    args.get(idx)
        .cloned()
        .ok_or_else(|| SweeperError::InvalidCommand(format!("usage: {}", usage)))
}

/// Split a command line on whitespace; double quotes group words.
pub(crate) fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(SweeperError::InvalidCommand("unterminated quote".to_string()));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}
