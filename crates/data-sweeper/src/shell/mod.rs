//! Line-oriented interactive front end over a [`Session`].
//!
//! Each input line is parsed into a [`ShellCommand`] and executed; the
//! result is a list of output lines, so the shell can be driven from tests
//! as easily as from a terminal.

mod command;
pub mod display;

pub use command::{HELP, ShellCommand};

use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, error};

use crate::cleaner::CleaningOperation;
use crate::config::{FillStrategy, SweeperConfig};
use crate::error::{Result, SweeperError};
use crate::export::Exporter;
use crate::ingest::{FileIngestor, Upload};
use crate::reporting::{ReportGenerator, ReportSummary};
use crate::session::Session;
use crate::types::TabularData;
use crate::visualizer::{BarChart, Visualizer};

const PROMPT: &str = "sweeper> ";

/// Lines printed for one command, and whether the shell should exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl ShellOutput {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }
}

/// Interactive session driver.
pub struct Shell {
    session: Session,
    config: SweeperConfig,
    ingestor: FileIngestor,
}

impl Shell {
    pub fn new(config: SweeperConfig) -> Self {
        Self {
            session: Session::new(),
            ingestor: FileIngestor::new(&config),
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Ingest an upload and describe it. Unsupported files are reported, not raised.
    pub fn load(&mut self, upload: &Upload) -> Result<Vec<String>> {
        match self.session.ingest(upload, &self.ingestor) {
            Ok(outcome) => {
                let mut lines = display::render_metadata(&outcome.metadata);
                lines.extend(display::render_preview(&outcome.data, self.config.preview_rows));
                Ok(lines)
            }
            Err(e) if e.is_unsupported_format() => Ok(vec![e.to_string()]),
            Err(e) => Err(e),
        }
    }

    /// Parse and execute one line. Errors are rendered as output.
    pub fn execute_line(&mut self, line: &str) -> ShellOutput {
        if line.trim().is_empty() {
            return ShellOutput::default();
        }

        let result = line
            .parse::<ShellCommand>()
            .and_then(|command| self.execute(command));
        match result {
            Ok(output) => output,
            Err(e) => {
                error!("{}", e);
                ShellOutput::line(format!("Error: {}", e))
            }
        }
    }

    pub fn execute(&mut self, command: ShellCommand) -> Result<ShellOutput> {
        debug!("Executing {:?}", command);
        let output = match command {
            ShellCommand::Load(path) => {
                let upload = Upload::from_path(&path)?;
                ShellOutput::lines(self.load(&upload)?)
            }
            ShellCommand::Show(file) => {
                let data = self.current(&file)?;
                let mut lines = vec![format!(
                    "{}: {} rows x {} columns (history depth {}, redo {})",
                    file,
                    data.height(),
                    data.width(),
                    self.session.depth(&file),
                    if self.session.can_redo(&file) { "available" } else { "empty" }
                )];
                lines.extend(display::render_preview(&data, self.config.preview_rows));
                ShellOutput::lines(lines)
            }
            ShellCommand::Dedupe(file) => {
                let outcome = self
                    .session
                    .apply(&file, &CleaningOperation::RemoveDuplicates)?;
                let mut lines = outcome.steps;
                lines.push("Duplicates Removed!".to_string());
                ShellOutput::lines(lines)
            }
            ShellCommand::Fill(file, FillStrategy::None) => {
                self.current(&file)?;
                ShellOutput::line(format!("No fill strategy selected for {}", file))
            }
            ShellCommand::Fill(file, strategy) => {
                let outcome = self
                    .session
                    .apply(&file, &CleaningOperation::FillMissing(strategy))?;
                let mut lines = outcome.steps;
                lines.push(format!("Missing values filled using {}!", strategy));
                ShellOutput::lines(lines)
            }
            ShellCommand::Undo(file) => match self.session.undo(&file) {
                Some(_) => ShellOutput::line(format!("Undo successful for {}!", file)),
                None => ShellOutput::line(format!("Nothing to undo for {}", file)),
            },
            ShellCommand::Redo(file) => match self.session.redo(&file) {
                Some(_) => ShellOutput::line(format!("Redo successful for {}!", file)),
                None => ShellOutput::line(format!("Nothing to redo for {}", file)),
            },
            ShellCommand::Chart { file, column, out } => self.chart(&file, column, out)?,
            ShellCommand::Report { file, dir } => {
                let data = self.current(&file)?;
                let size = self.session.file_size(&file).unwrap_or(0);
                let summary = ReportSummary::new(&file, size, &data);
                let artifact = ReportGenerator::new(&self.config).artifact(&summary)?;
                let path = artifact.write_to(dir.unwrap_or_else(|| self.config.output_dir.clone()))?;
                ShellOutput::line(format!("Report saved to {}", path.display()))
            }
            ShellCommand::Export { file, format, dir } => {
                let data = self.current(&file)?;
                let artifact = Exporter::export(&data, &file, format)?;
                let path = artifact.write_to(dir.unwrap_or_else(|| self.config.output_dir.clone()))?;
                ShellOutput::line(format!(
                    "Saved {} as {} ({})",
                    file,
                    path.display(),
                    artifact.mime_type
                ))
            }
            ShellCommand::History => ShellOutput::lines(display::render_history(self.session.history())),
            ShellCommand::Files => {
                let names = self.session.file_names();
                if names.is_empty() {
                    ShellOutput::line("No files loaded")
                } else {
                    ShellOutput::lines(
                        names
                            .into_iter()
                            .map(|name| {
                                format!(
                                    "{} (history depth {}, undo {}, redo {})",
                                    name,
                                    self.session.depth(&name),
                                    yes_no(self.session.can_undo(&name)),
                                    yes_no(self.session.can_redo(&name))
                                )
                            })
                            .collect(),
                    )
                }
            }
            ShellCommand::Help => ShellOutput::lines(HELP.iter().map(|s| s.to_string()).collect()),
            ShellCommand::Quit => ShellOutput {
                lines: Vec::new(),
                quit: true,
            },
        };
        Ok(output)
    }

    /// Read commands from `input` until EOF or `quit`, echoing output.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "Data Sweeper shell. Type 'help' for commands.")?;
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        for line in input.lines() {
            let result = self.execute_line(&line?);
            for l in &result.lines {
                writeln!(output, "{}", l)?;
            }
            if result.quit {
                return Ok(());
            }
            write!(output, "{}", PROMPT)?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn current(&self, file: &str) -> Result<TabularData> {
        self.session
            .current(file)
            .cloned()
            .ok_or_else(|| SweeperError::UnknownFile(file.to_string()))
    }

    fn chart(
        &self,
        file: &str,
        column: Option<String>,
        out: Option<PathBuf>,
    ) -> Result<ShellOutput> {
        let data = self.current(file)?;
        let chart = match column {
            Some(column) => BarChart::from_column(&data, &column)?,
            None => match Visualizer::chart_default(&data)? {
                Some(chart) => chart,
                None => {
                    return Ok(ShellOutput::line(
                        "No numeric columns available for visualization.",
                    ));
                }
            },
        };

        let svg = chart.render_svg(&self.config)?;
        let path = out.unwrap_or_else(|| {
            self.config
                .output_dir
                .join(Visualizer::chart_file_name(file, &chart.column))
        });
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, svg)?;

        Ok(ShellOutput::lines(vec![
            Visualizer::describe(&chart),
            format!("Chart saved to {}", path.display()),
        ]))
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
