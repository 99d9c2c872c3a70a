//! Rule-based field extractors for Spanish retail receipts.

pub mod similarity;
pub mod dates;
pub mod vendor;
pub mod amounts;
pub mod items;
pub mod validation;
pub mod patterns;

pub use similarity::{similarity, best_window_similarity};
pub use dates::{extract_date, DateExtractor, DatePattern, DateShape};
pub use vendor::{extract_vendor, VendorExtractor};
pub use amounts::{extract_total, format_pesos, parse_grouped_integer, TotalExtractor};
pub use items::{extract_items, item_lines, items_block};
pub use validation::{validate, Validation};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract every candidate, best first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A field value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the strategy that produced the value.
    pub strategy: &'static str,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, strategy: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            strategy,
            source: source.into(),
        }
    }
}

/// Non-empty, trimmed lines in document order.
pub(crate) fn content_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(trim_line)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Trim whitespace and any byte order mark left by the text decoder.
pub(crate) fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK)
}

pub(crate) const BYTE_ORDER_MARK: char = '\u{feff}';
