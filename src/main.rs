//! corral CLI - batch categorization of free-text remarks.
//!
//! Reads a CSV column of raw remarks, runs the clustering and naming
//! pipeline, and writes a wide CSV with one column per named category.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use chrono::{Datelike, Local, Timelike};
use clap::Parser;

use corral::cluster::{AverageLinkage, CosineDbscan};
use corral::embedding::{LocalEmbedder, NAME_MODEL_ID, REMARK_MODEL_ID};
use corral::language::LinguaDetector;
use corral::{table, Pipeline, PipelineConfig, PipelineError};

// ============================================================================
// Logging Infrastructure
// ============================================================================

static LOG_FILE: Mutex<Option<File>> = Mutex::new(None);

/// Initialize logging - creates a dated log file and cleans old logs
fn init_logging() -> Option<PathBuf> {
    let log_dir = dirs::data_dir()
        .map(|p| p.join("corral").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if fs::create_dir_all(&log_dir).is_err() {
        return None;
    }

    // Clean logs older than 7 days
    if let Ok(entries) = fs::read_dir(&log_dir) {
        let cutoff = Local::now() - chrono::Duration::days(7);
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if let Some(date_str) = name
                    .strip_prefix("corral-")
                    .and_then(|s| s.strip_suffix(".log"))
                {
                    if let Ok(date) = chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                        if date < cutoff.date_naive() {
                            let _ = fs::remove_file(&path);
                        }
                    }
                }
            }
        }
    }

    let today = Local::now();
    let log_filename = format!(
        "corral-{:04}-{:02}-{:02}.log",
        today.year(),
        today.month(),
        today.day()
    );
    let log_path = log_dir.join(&log_filename);

    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
        *LOG_FILE.lock().unwrap() = Some(file);
        Some(log_path)
    } else {
        None
    }
}

/// Log to both terminal and file
fn log_both(msg: &str) {
    println!("{}", msg);
    write_log_line(msg, "");
}

/// Log error to both terminal and file
fn elog_both(msg: &str) {
    eprintln!("{}", msg);
    write_log_line(msg, " [ERROR]");
}

fn write_log_line(msg: &str, tag: &str) {
    let now = Local::now();
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            let _ = writeln!(
                file,
                "[{:02}:{:02}:{:02}]{} {}",
                now.hour(),
                now.minute(),
                now.second(),
                tag,
                msg
            );
        }
    }
}

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser)]
#[command(name = "corral")]
#[command(version, about = "Cluster free-text remarks into named categories", long_about = None)]
struct Cli {
    /// Input CSV file containing the remarks
    input: PathBuf,

    /// Column holding the raw remark text
    #[arg(long)]
    column: Option<String>,

    /// Output CSV path (overwritten if present)
    #[arg(long, short, default_value = "clustered_remarks_named.csv")]
    output: PathBuf,

    /// JSON config file overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ceiling on remark clusters before centroid merging
    #[arg(long)]
    max_clusters: Option<usize>,

    /// Ceiling on final categories after name merging
    #[arg(long)]
    max_categories: Option<usize>,
}

fn run(cli: &Cli) -> Result<(), PipelineError> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(column) = &cli.column {
        config.text_column = column.clone();
    }
    if let Some(max) = cli.max_clusters {
        config.max_remark_clusters = max;
    }
    if let Some(max) = cli.max_categories {
        config.max_name_clusters = max;
    }

    log_both(&format!("Loading data from '{}'...", cli.input.display()));
    let raw_remarks = table::read_column(&cli.input, &config.text_column)?;

    log_both("Loading embedding models (first run downloads them)...");
    let remark_embedder = LocalEmbedder::load(REMARK_MODEL_ID)?;
    let name_embedder = LocalEmbedder::load(NAME_MODEL_ID)?;

    let output_path = cli.output.clone();
    let pipeline = Pipeline {
        remark_embedder: Box::new(remark_embedder),
        name_embedder: Box::new(name_embedder),
        density: Box::new(CosineDbscan::new()),
        hierarchical: Box::new(AverageLinkage),
        detector: Box::new(LinguaDetector::new()),
        config,
    };

    let result = pipeline.run(&raw_remarks)?;

    log_both(&format!("Saving results to '{}'...", output_path.display()));
    table::write_table(&output_path, &result)?;
    log_both(&format!(
        "Done. {} remarks across {} columns.",
        raw_remarks.len(),
        result.columns.len()
    ));
    Ok(())
}

fn main() -> ExitCode {
    if let Some(log_path) = init_logging() {
        println!("Logging to {}", log_path.display());
    }

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ PipelineError::InputNotFound { .. }) => {
            elog_both(&format!("Input not found: {}", err));
            ExitCode::from(2)
        }
        Err(err @ PipelineError::SchemaMismatch { .. }) => {
            elog_both(&format!("Schema mismatch: {}", err));
            ExitCode::from(3)
        }
        Err(err) => {
            elog_both(&format!("Unexpected error: {}", err));
            ExitCode::FAILURE
        }
    }
}
