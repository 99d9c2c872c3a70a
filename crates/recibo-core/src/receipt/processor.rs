//! Receipt processor: runs every field extractor and assembles the record.

use std::time::Instant;

use lazy_static::lazy_static;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::{ReceiptFields, ReceiptRecord, TOTAL_NOT_FOUND, VENDOR_NOT_FOUND};

use super::rules::{
    amounts::{format_pesos, TotalExtractor},
    dates::DateExtractor,
    items::{item_lines, items_block},
    vendor::VendorExtractor,
    ExtractionMatch, FieldExtractor,
};

lazy_static! {
    static ref DEFAULT_PROCESSOR: ReceiptProcessor = ReceiptProcessor::default();
}

/// Vendor strategies whose answer is a guess rather than a keyword hit.
const WEAK_VENDOR_STRATEGIES: &[&str] = &["shape", "tax_id", "first_line"];

/// Where each field came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSources {
    pub date: Option<ExtractionMatch<String>>,
    pub vendor: Option<ExtractionMatch<String>>,
    pub total: Option<ExtractionMatch<u64>>,
    pub item_count: usize,
}

/// Result of receipt extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The validated record.
    pub record: ReceiptRecord,
    /// Strategy and matched text behind each field.
    pub sources: FieldSources,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for receipt parsing.
pub trait ReceiptParser {
    /// Parse a receipt from recognizer text. Never fails.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Parse and keep only the record.
    fn process(&self, text: &str) -> ReceiptRecord {
        self.parse(text).record
    }
}

/// Configured receipt processor.
///
/// Holds compiled patterns and tables only; it is shareable across threads
/// and every call works on its own input.
#[derive(Debug, Clone)]
pub struct ReceiptProcessor {
    dates: DateExtractor,
    vendor: VendorExtractor,
    total: TotalExtractor,
}

impl ReceiptProcessor {
    /// Build a processor from extraction settings.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            dates: DateExtractor::with_months(&config.months)?,
            vendor: VendorExtractor::from_config(config),
            total: TotalExtractor::from_config(config),
        })
    }
}

impl Default for ReceiptProcessor {
    fn default() -> Self {
        Self {
            dates: DateExtractor::new(),
            vendor: VendorExtractor::new(),
            total: TotalExtractor::new(),
        }
    }
}

impl ReceiptParser for ReceiptProcessor {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Processing receipt from {} characters of text", text.len());

        let date = self.dates.extract(text);
        if date.is_none() {
            warnings.push("Could not extract purchase date".to_string());
        }

        let vendor = self.vendor.extract(text);
        match &vendor {
            None => warnings.push("Document has no text lines; vendor unknown".to_string()),
            Some(m) if WEAK_VENDOR_STRATEGIES.contains(&m.strategy) => warnings.push(format!(
                "Vendor guessed by '{}' strategy, no keyword matched",
                m.strategy
            )),
            Some(_) => {}
        }

        let total = self.total.extract(text);
        match &total {
            None => warnings.push("Could not extract total amount".to_string()),
            Some(m) if m.strategy == "document_max" => warnings.push(
                "No total line found; using the largest amount on the receipt".to_string(),
            ),
            Some(_) => {}
        }

        let items = item_lines(text);
        if items.is_empty() {
            warnings.push("Could not extract line items".to_string());
        }

        let fields = ReceiptFields {
            date: date.as_ref().map(|m| m.value.clone()),
            vendor: vendor
                .as_ref()
                .map(|m| m.value.clone())
                .unwrap_or_else(|| VENDOR_NOT_FOUND.to_string()),
            total: total
                .as_ref()
                .map(|m| format_pesos(m.value))
                .unwrap_or_else(|| TOTAL_NOT_FOUND.to_string()),
            items: items_block(&items),
        };

        let record = ReceiptRecord::new(fields, text);

        debug!(
            "Extracted receipt from '{}' (valid: {}, missing: {:?})",
            record.vendor(),
            record.is_valid(),
            record.missing_fields()
        );

        ExtractionResult {
            record,
            sources: FieldSources {
                date,
                vendor,
                total,
                item_count: items.len(),
            },
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Process one receipt with the built-in tables and thresholds.
pub fn process_receipt(text: &str) -> ReceiptRecord {
    DEFAULT_PROCESSOR.process(text)
}
