//! Batch processing command for many receipt text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use recibo_core::{ReceiptParser, ReceiptProcessor, ReceiptRecord};

use super::config::load_config;
use super::strip_byte_order_mark;
use crate::export::records_to_csv;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching recognizer text files
    #[arg(required = true)]
    input: String,

    /// Accumulated export file (default: recibos.json or recibos.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    format: ExportFormat,

    /// Also write a per-file summary CSV next to the export
    #[arg(long)]
    summary: bool,

    /// Number of files processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue when a file cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ExportFormat {
    /// JSON array of records
    Json,
    /// CSV rows with header
    Csv,
}

impl ExportFormat {
    fn default_output(self) -> PathBuf {
        match self {
            ExportFormat::Json => PathBuf::from("recibos.json"),
            ExportFormat::Csv => PathBuf::from("recibos.csv"),
        }
    }
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    record: Option<ReceiptRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// Counters printed at the end of a run.
#[derive(Debug, Default, PartialEq)]
struct RunStats {
    total: usize,
    valid: usize,
    incomplete: usize,
    unreadable: usize,
}

impl RunStats {
    fn from_results(results: &[FileResult]) -> Self {
        let mut stats = RunStats {
            total: results.len(),
            ..RunStats::default()
        };

        for result in results {
            match &result.record {
                Some(record) if record.is_valid() => stats.valid += 1,
                Some(_) => stats.incomplete += 1,
                None => stats.unreadable += 1,
            }
        }

        stats
    }

    fn processed(&self) -> usize {
        self.valid + self.incomplete
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let started_at = Local::now();

    let config = load_config(config_path)?;
    let processor = Arc::new(ReceiptProcessor::new(&config.extraction)?);

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let processor = Arc::clone(&processor);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let file_start = Instant::now();

            let outcome = match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    let text = strip_byte_order_mark(text);
                    tokio::task::spawn_blocking(move || processor.process(&text))
                        .await
                        .map_err(|e| e.to_string())
                }
                Err(e) => Err(e.to_string()),
            };

            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            let result = match outcome {
                Ok(record) => FileResult {
                    path,
                    record: Some(record),
                    error: None,
                    processing_time_ms,
                },
                Err(error) => FileResult {
                    path,
                    record: None,
                    error: Some(error),
                    processing_time_ms,
                },
            };
            (index, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        } else {
            debug!(
                "Processed {} in {}ms",
                result.path.display(),
                result.processing_time_ms
            );
        }

        results.push((index, result));
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    // Export in input order
    results.sort_by_key(|(index, _)| *index);
    let results: Vec<FileResult> = results.into_iter().map(|(_, r)| r).collect();

    let output_path = args.output.clone().unwrap_or_else(|| args.format.default_output());
    let records = results.iter().filter_map(|r| r.record.as_ref());

    let content = match args.format {
        ExportFormat::Json => serde_json::to_string_pretty(&records.collect::<Vec<_>>())?,
        ExportFormat::Csv => records_to_csv(records, &config.export)?,
    };
    fs::write(&output_path, content)?;

    println!(
        "{} Export written to {}",
        style("✓").green(),
        output_path.display()
    );

    if args.summary {
        let summary_path = summary_path_for(&output_path);
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let finished_at = Local::now();
    let stats = RunStats::from_results(&results);

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        stats.total,
        start.elapsed()
    );
    println!("   Total receipts:   {}", stats.total);
    println!(
        "   Processed:        {} ({:.1}%)",
        stats.processed(),
        percent(stats.processed(), stats.total)
    );
    println!(
        "   Valid:            {} ({:.1}%)",
        style(stats.valid).green(),
        percent(stats.valid, stats.total)
    );
    println!(
        "   Incomplete:       {} ({:.1}%)",
        style(stats.incomplete).yellow(),
        percent(stats.incomplete, stats.total)
    );
    println!(
        "   Unreadable:       {} ({:.1}%)",
        style(stats.unreadable).red(),
        percent(stats.unreadable, stats.total)
    );
    println!("   Started:          {}", started_at.format("%Y-%m-%d %H:%M:%S"));
    println!("   Finished:         {}", finished_at.format("%Y-%m-%d %H:%M:%S"));

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Unreadable files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn summary_path_for(output_path: &Path) -> PathBuf {
    output_path
        .parent()
        .map(|dir| dir.join("summary.csv"))
        .unwrap_or_else(|| PathBuf::from("summary.csv"))
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "date",
        "vendor",
        "total",
        "missing_fields",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(record) = &result.record {
            let missing = record
                .missing_fields()
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(";");

            wtr.write_record([
                filename,
                if record.is_valid() { "valid" } else { "incomplete" },
                record.date().unwrap_or(""),
                record.vendor(),
                record.total(),
                &missing,
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "unreadable",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recibo_core::process_receipt;

    fn result(name: &str, text: Option<&str>) -> FileResult {
        FileResult {
            path: PathBuf::from(name),
            record: text.map(process_receipt),
            error: text.is_none().then(|| "stream did not contain valid UTF-8".to_string()),
            processing_time_ms: 1,
        }
    }

    #[test]
    fn test_run_stats() {
        let results = vec![
            result("a.txt", Some("TIENDA EL SOL\n01/02/2024\nTOTAL 5.000")),
            result("b.txt", Some("TIENDA EL SOL\nTOTAL 5.000")),
            result("c.txt", None),
        ];

        let stats = RunStats::from_results(&results);
        assert_eq!(
            stats,
            RunStats {
                total: 3,
                valid: 1,
                incomplete: 1,
                unreadable: 1,
            }
        );
        assert_eq!(stats.processed(), 2);
    }

    #[test]
    fn test_percent_of_empty_run() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn test_summary_lands_next_to_export() {
        assert_eq!(
            summary_path_for(Path::new("out/recibos.csv")),
            PathBuf::from("out/summary.csv")
        );
        assert_eq!(
            summary_path_for(Path::new("recibos.json")),
            PathBuf::from("summary.csv")
        );
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let results = vec![
            result("a.txt", Some("TIENDA EL SOL\nTOTAL 5.000")),
            result("b.txt", None),
        ];

        write_summary(&path, &results).unwrap();
        let written = fs::read_to_string(&path).unwrap();

        assert!(written.contains("a.txt,incomplete,,TIENDA EL SOL,$5.000,date,1,"));
        assert!(written.contains("b.txt,unreadable,,,,,1,stream did not contain valid UTF-8"));
    }
}
