//! Total amount extraction for peso receipts.
//!
//! Amounts are whole pesos: `.` and `,` are thousands separators only, so
//! `12.930`, `12,930` and `12930` all read as 12930. Cents are never parsed.

use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;
use crate::models::receipt::TOTAL_NOT_FOUND;

use super::patterns::AMOUNT;
use super::similarity::similarity;
use super::{content_lines, ExtractionMatch, FieldExtractor};

/// A total strategy scans the text and may return the amount due.
pub type TotalStrategy = fn(&TotalExtractor, &str) -> Option<ExtractionMatch<u64>>;

/// Total chain: keyword-anchored lines first, then the whole document.
pub const TOTAL_STRATEGIES: &[(&str, TotalStrategy)] = &[
    ("keyword_line", TotalExtractor::by_keyword_lines),
    ("document_max", TotalExtractor::by_document_max),
];

/// Total amount extractor.
#[derive(Debug, Clone)]
pub struct TotalExtractor {
    keyword: String,
    threshold: f64,
}

impl TotalExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            keyword: config.total_keyword.trim().to_string(),
            threshold: config.total_similarity,
        }
    }

    /// Lines with a token that approximately reads as the total keyword.
    pub fn keyword_lines<'a>(&self, text: &'a str) -> Vec<&'a str> {
        content_lines(text)
            .into_iter()
            .filter(|line| {
                line.split_whitespace().any(|token| {
                    let token = token.trim_matches(|c: char| !c.is_alphanumeric());
                    let score = similarity(token, &self.keyword);
                    trace!("Token '{}' scored {:.2} against '{}'", token, score, self.keyword);
                    score >= self.threshold
                })
            })
            .collect()
    }

    /// Largest amount printed on a keyword line.
    pub fn by_keyword_lines(&self, text: &str) -> Option<ExtractionMatch<u64>> {
        self.keyword_lines(text)
            .into_iter()
            .flat_map(amounts_in)
            .max_by_key(|(value, _)| *value)
            .map(|(value, source)| ExtractionMatch::new(value, "keyword_line", source))
    }

    /// Largest amount anywhere in the document.
    pub fn by_document_max(&self, text: &str) -> Option<ExtractionMatch<u64>> {
        amounts_in(text)
            .max_by_key(|(value, _)| *value)
            .map(|(value, source)| ExtractionMatch::new(value, "document_max", source))
    }
}

impl Default for TotalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TotalExtractor {
    type Output = ExtractionMatch<u64>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        TOTAL_STRATEGIES.iter().find_map(|(name, strategy)| {
            let found = strategy(self, text)?;
            debug!("Total {} found by strategy '{}'", found.value, name);
            Some(found)
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let anchored: Vec<Self::Output> = self
            .keyword_lines(text)
            .into_iter()
            .flat_map(amounts_in)
            .map(|(value, source)| ExtractionMatch::new(value, "keyword_line", source))
            .collect();

        let mut results = if anchored.is_empty() {
            amounts_in(text)
                .map(|(value, source)| ExtractionMatch::new(value, "document_max", source))
                .collect()
        } else {
            anchored
        };

        results.sort_by(|a, b| b.value.cmp(&a.value));
        results
    }
}

/// Amount-shaped tokens in `text` with their integer value.
///
/// Tokens too large for whole pesos are skipped and logged.
fn amounts_in(text: &str) -> impl Iterator<Item = (u64, &str)> {
    AMOUNT.find_iter(text).filter_map(|m| {
        let token = m.as_str();
        match parse_grouped_integer(token) {
            Some(value) => Some((value, token)),
            None => {
                debug!(
                    "Skipping amount token of {} characters: exceeds {}",
                    token.len(),
                    u64::MAX
                );
                None
            }
        }
    })
}

/// Read an amount as a whole number, ignoring every non-digit character.
///
/// Returns `None` when there are no digits or the value overflows.
pub fn parse_grouped_integer(s: &str) -> Option<u64> {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Format pesos with `.` thousands separators and a leading `$`.
pub fn format_pesos(amount: u64) -> String {
    let digits = amount.to_string();
    let chars: Vec<char> = digits.chars().collect();
    let mut formatted = String::with_capacity(chars.len() + chars.len() / 3 + 1);
    formatted.push('$');

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    formatted
}

/// Extract the formatted total, or the "not found" sentinel.
pub fn extract_total(text: &str) -> String {
    TotalExtractor::new()
        .extract(text)
        .map(|m| format_pesos(m.value))
        .unwrap_or_else(|| TOTAL_NOT_FOUND.to_string())
}
