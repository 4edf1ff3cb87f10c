//! Command-line interface for csv-report
//!
//! # Usage Examples
//!
//! ## Render a report
//! ```bash
//! # Timestamped file in the system temp directory, path printed on stdout
//! csv-report render --definition items.toml --input items.jsonl --base-name items
//!
//! # Explicit output file, reading rows from stdin
//! cat items.jsonl | csv-report render --definition items.yaml --output items.csv
//!
//! # Stream to stdout with a different timezone
//! csv-report render --definition items.toml --input items.jsonl --output - \
//!   --timezone America/New_York
//! ```
//!
//! ## Check a definition
//! ```bash
//! csv-report check --definition items.toml
//! ```
//!
//! Set `RUST_LOG=csv_report=debug` for progress logs on stderr.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use csv_report::config::{FormatOverrides, ReportFile};
use csv_report::jsonl::JsonlRows;
use csv_report::{try_write_report, ReportDefinition, ReportGenerator};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "csv-report")]
#[command(about = "Render JSON Lines records into CSV reports")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render JSON Lines rows into a CSV report
    Render {
        /// Report definition file (.toml, .yaml or .yml)
        #[arg(long, value_name = "PATH")]
        definition: PathBuf,

        /// JSON Lines input file ("-" reads stdin)
        #[arg(long, value_name = "PATH", default_value = "-")]
        input: String,

        /// Write the report to this file instead of a generated one ("-" writes stdout)
        #[arg(long, value_name = "PATH", conflicts_with = "output_dir")]
        output: Option<String>,

        /// Directory for generated report files (default: system temp directory)
        #[arg(long, value_name = "DIR", env = "CSV_REPORT_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Base name for generated report files
        #[arg(long, default_value = "report")]
        base_name: String,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Validate a report definition and print its header
    Check {
        /// Report definition file (.toml, .yaml or .yml)
        #[arg(long, value_name = "PATH")]
        definition: PathBuf,

        #[command(flatten)]
        format: FormatArgs,
    },
}

/// Formatting overrides applied on top of the definition file
#[derive(Args, Debug, Clone, Default)]
struct FormatArgs {
    /// IANA timezone for date-time output (e.g. "Europe/Paris")
    #[arg(long, env = "CSV_REPORT_TIMEZONE")]
    timezone: Option<String>,

    /// strftime pattern for date-times (default: "%Y-%m-%d %H:%M:%S")
    #[arg(long)]
    date_time_format: Option<String>,

    /// strftime pattern for dates (default: "%Y-%m-%d")
    #[arg(long)]
    date_format: Option<String>,
}

impl From<FormatArgs> for FormatOverrides {
    fn from(args: FormatArgs) -> Self {
        FormatOverrides {
            timezone: args.timezone,
            date_time_format: args.date_time_format,
            date_format: args.date_format,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Logs go to stderr so reports can be streamed on stdout
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            definition,
            input,
            output,
            output_dir,
            base_name,
            format,
        } => {
            let definition = load_definition(&definition, format)?;
            let reader = open_input(&input)?;
            let rows = JsonlRows::new(reader);

            match output {
                Some(output) if output == "-" => {
                    let stdout = io::stdout().lock();
                    try_write_report(&definition, Some(rows), BufWriter::new(stdout))
                        .context("Failed to write report to stdout")?;
                }
                Some(output) => {
                    let path = PathBuf::from(output);
                    write_to_path(&definition, rows, &path)?;
                    println!("{}", path.display());
                }
                None => {
                    let generator = output_dir.map(ReportGenerator::new).unwrap_or_default();
                    let report = generator
                        .try_generate_as_file(&definition, Some(rows), &base_name)
                        .context("Failed to generate report")?;
                    println!("{}", report.path.display());
                }
            }
        }
        Commands::Check { definition, format } => {
            let definition = load_definition(&definition, format)?;
            definition.validate()?;
            println!("{}", definition.columns_header().join(","));
        }
    }

    Ok(())
}

fn load_definition(path: &Path, format: FormatArgs) -> anyhow::Result<ReportDefinition<Value>> {
    let mut file = ReportFile::load(path)
        .with_context(|| format!("Failed to load definition {}", path.display()))?;
    file.apply_overrides(&format.into());
    Ok(file.to_definition()?)
}

fn open_input(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(input).with_context(|| format!("Failed to open input {input}"))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Write to a caller-chosen path, removing the file if rendering fails.
fn write_to_path(
    definition: &ReportDefinition<Value>,
    rows: JsonlRows<Box<dyn BufRead>>,
    path: &Path,
) -> anyhow::Result<()> {
    definition.validate()?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    if let Err(e) = try_write_report(definition, Some(rows), BufWriter::new(file)) {
        if let Err(remove_err) = fs::remove_file(path) {
            tracing::warn!("Failed to remove {}: {remove_err}", path.display());
        }
        return Err(e).with_context(|| format!("Failed to write report to {}", path.display()));
    }
    Ok(())
}
