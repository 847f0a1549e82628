//! CLI entry point for the data sweeper.
//!
//! Two modes are offered: `process` runs one pass over a set of files and
//! exits, `shell` opens an interactive session with undo/redo.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use data_sweeper::shell::display;
use data_sweeper::{
    BarChart, CleaningOperation, ExportFormat, Exporter, FileIngestor, FillStrategy,
    ReportGenerator, ReportSummary, Session, Shell, SweeperConfig, Upload, Visualizer,
};

/// Fill strategy for missing numeric values.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFillStrategy {
    /// Leave missing values as-is
    None,
    /// Fill with the column mean
    Mean,
    /// Fill with the column median
    Median,
    /// Fill with the most frequent value
    Mode,
}

impl From<CliFillStrategy> for FillStrategy {
    fn from(cli: CliFillStrategy) -> Self {
        match cli {
            CliFillStrategy::None => FillStrategy::None,
            CliFillStrategy::Mean => FillStrategy::Mean,
            CliFillStrategy::Median => FillStrategy::Median,
            CliFillStrategy::Mode => FillStrategy::Mode,
        }
    }
}

/// Target format for conversion.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliExportFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook (.xlsx)
    Excel,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(cli: CliExportFormat) -> Self {
        match cli {
            CliExportFormat::Csv => ExportFormat::Csv,
            CliExportFormat::Excel => ExportFormat::Excel,
        }
    }
}

/// Clean, chart, report on and convert CSV/Excel files.
#[derive(Parser, Debug)]
#[command(
    author = "Data Sweeper Team",
    version,
    about = "Clean, chart, report on and convert CSV/Excel files",
    long_about = "Data Sweeper loads .csv and .xlsx files, removes duplicate rows, \
fills missing numeric values, draws bar charts, writes PDF summaries and \
converts between CSV and Excel.

EXAMPLES:
    # Dedupe and fill a file, then convert it to Excel
    data-sweeper process sales.csv --dedupe --fill mean --convert excel

    # Chart a column and write a report for several files
    data-sweeper process a.csv b.xlsx --chart qty --report -o out

    # Interactive session with undo/redo
    data-sweeper shell sales.csv"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON configuration file; missing fields use defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one pass over the given files and exit
    Process {
        /// Files to load (.csv or .xlsx)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Remove duplicate rows
        #[arg(long)]
        dedupe: bool,

        /// Fill strategy for missing numeric values (defaults to the config's)
        #[arg(long, value_enum)]
        fill: Option<CliFillStrategy>,

        /// Numeric column to chart; the first numeric column if omitted
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        chart: Option<String>,

        /// Write a PDF summary for each file
        #[arg(long)]
        report: bool,

        /// Convert each file to this format
        #[arg(long, value_enum)]
        convert: Option<CliExportFormat>,

        /// Output directory (overrides the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Start an interactive shell, optionally preloading files
    Shell {
        /// Files to load before the prompt appears
        files: Vec<PathBuf>,
    },
}

/// Initialize tracing. `--quiet` caps the level at warn; `RUST_LOG` wins
/// over both.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SweeperConfig> {
    match path {
        Some(path) => SweeperConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(SweeperConfig::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    // Load environment variables from .env file
    dotenv().ok();

    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Process {
            files,
            dedupe,
            fill,
            chart,
            report,
            convert,
            output,
        } => {
            if let Some(dir) = output {
                config.output_dir = dir;
            }
            let options = ProcessOptions {
                dedupe,
                fill: fill.map(Into::into).unwrap_or(config.default_fill_strategy),
                chart,
                report,
                convert: convert.map(Into::into),
            };
            run_process(&config, &files, &options).map(|_| ())
        }
        Command::Shell { files } => run_shell(config, &files),
    }
}

struct ProcessOptions {
    dedupe: bool,
    fill: FillStrategy,
    chart: Option<String>,
    report: bool,
    convert: Option<ExportFormat>,
}

/// One pass over `files`, returning how many files were fully processed.
///
/// A file that fails to read, load or process is reported and skipped; the
/// remaining files still run and the upload history is always printed.
///
/// Note: this uses `println!` for user-facing output; logging goes to stderr.
fn run_process(
    config: &SweeperConfig,
    files: &[PathBuf],
    options: &ProcessOptions,
) -> Result<usize> {
    let ingestor = FileIngestor::new(config);
    let mut session = Session::new();
    let mut processed = 0usize;

    for path in files {
        println!("\n{}", "=".repeat(60));
        let upload = match Upload::from_path(path) {
            Ok(upload) => upload,
            Err(e) => {
                println!("Failed to read {}: {}", path.display(), e);
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let outcome = match session.ingest(&upload, &ingestor) {
            Ok(outcome) => outcome,
            Err(e) => {
                println!("{}", e);
                if !e.is_unsupported_format() {
                    warn!("Skipping '{}': {}", upload.name, e);
                }
                continue;
            }
        };

        for line in display::render_metadata(&outcome.metadata) {
            println!("{}", line);
        }
        println!();
        for line in display::render_preview(&outcome.data, config.preview_rows) {
            println!("{}", line);
        }

        match process_file(&mut session, config, &upload, options) {
            Ok(()) => processed += 1,
            Err(e) => {
                println!("Error: {:#}", e);
                warn!("Stopped processing '{}': {:#}", upload.name, e);
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("UPLOAD HISTORY");
    for line in display::render_history(session.history()) {
        println!("{}", line);
    }

    if processed == 0 {
        return Err(anyhow!("No files could be processed"));
    }
    info!("Processed {} of {} files", processed, files.len());
    Ok(processed)
}

fn process_file(
    session: &mut Session,
    config: &SweeperConfig,
    upload: &Upload,
    options: &ProcessOptions,
) -> Result<()> {
    let name = upload.name.as_str();

    if options.dedupe {
        let outcome = session.apply(name, &CleaningOperation::RemoveDuplicates)?;
        for step in outcome.steps {
            println!("{}", step);
        }
        println!("Duplicates Removed!");
    }

    if options.fill != FillStrategy::None {
        let outcome = session.apply(name, &CleaningOperation::FillMissing(options.fill))?;
        for step in outcome.steps {
            println!("{}", step);
        }
        println!("Missing values filled using {}!", options.fill);
    }

    let data = session
        .current(name)
        .cloned()
        .ok_or_else(|| anyhow!("No history for {}", name))?;

    if let Some(column) = &options.chart {
        let chart = if column.is_empty() {
            Visualizer::chart_default(&data)?
        } else {
            Some(BarChart::from_column(&data, column)?)
        };
        match chart {
            Some(chart) => {
                let svg = chart.render_svg(config)?;
                std::fs::create_dir_all(&config.output_dir)?;
                let path = config
                    .output_dir
                    .join(Visualizer::chart_file_name(name, &chart.column));
                std::fs::write(&path, svg)?;
                println!("{}", Visualizer::describe(&chart));
                println!("Chart saved to {}", path.display());
            }
            None => println!("No numeric columns available for visualization."),
        }
    }

    if options.report {
        let summary = ReportSummary::new(name, upload.size(), &data);
        let artifact = ReportGenerator::new(config).artifact(&summary)?;
        let path = artifact.write_to(&config.output_dir)?;
        println!("Report saved to {}", path.display());
    }

    if let Some(format) = options.convert {
        let artifact = Exporter::export(&data, name, format)?;
        let path = artifact.write_to(&config.output_dir)?;
        println!(
            "Saved {} as {} ({})",
            name,
            path.display(),
            artifact.mime_type
        );
    }

    Ok(())
}

fn run_shell(config: SweeperConfig, files: &[PathBuf]) -> Result<()> {
    let mut shell = Shell::new(config);

    for path in files {
        let upload = match Upload::from_path(path) {
            Ok(upload) => upload,
            Err(e) => {
                println!("Error: failed to read {}: {}", path.display(), e);
                continue;
            }
        };
        match shell.load(&upload) {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    let stdin = io::stdin();
    let stdout = BufWriter::new(io::stdout());
    shell.run(stdin.lock(), stdout)?;
    Ok(())
}
