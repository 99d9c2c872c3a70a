//! Process command - extract a record from a single receipt text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use recibo_core::models::config::ExportConfig;
use recibo_core::receipt::rules::ExtractionMatch;
use recibo_core::{ExtractionResult, ReceiptParser, ReceiptProcessor, ReceiptRecord};

use super::config::load_config;
use super::strip_byte_order_mark;
use crate::export::{record_to_text, records_to_csv};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Recognizer text file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show the strategy behind each field and extraction warnings
    #[arg(long)]
    explain: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let processor = ReceiptProcessor::new(&config.extraction)?;

    let text = read_input(&args.input).await?;
    info!("Processing receipt: {}", args.input.display());

    let result = processor.parse(&text);

    if args.explain {
        print_explanation(&result);
    }

    let output = format_record(&result.record, args.format, &config.export)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

async fn read_input(input: &PathBuf) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(strip_byte_order_mark(text));
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot read {} as UTF-8 text: {}", input.display(), e))?;
    Ok(strip_byte_order_mark(text))
}

/// Render a record in the requested format.
pub fn format_record(
    record: &ReceiptRecord,
    format: OutputFormat,
    export: &ExportConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => records_to_csv([record], export),
        OutputFormat::Text => Ok(record_to_text(record)),
    }
}

fn print_explanation(result: &ExtractionResult) {
    eprintln!("{}", style("Field sources:").bold());
    eprintln!("  date:   {}", describe(result.sources.date.as_ref()));
    eprintln!("  vendor: {}", describe(result.sources.vendor.as_ref()));
    eprintln!("  total:  {}", describe(result.sources.total.as_ref()));
    eprintln!("  items:  {} line(s)", result.sources.item_count);

    if !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}

fn describe<T: std::fmt::Display>(found: Option<&ExtractionMatch<T>>) -> String {
    match found {
        Some(m) => format!("{} via {} from {:?}", m.value, m.strategy, m.source),
        None => style("not found").red().to_string(),
    }
}
