//! Vendor (merchant name) identification.

use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;
use crate::models::receipt::VENDOR_NOT_FOUND;

use super::patterns::TAX_ID_MARKER;
use super::similarity::best_window_similarity;
use super::{content_lines, ExtractionMatch, FieldExtractor};

/// A vendor strategy inspects the content lines and may name the vendor.
pub type VendorStrategy = fn(&VendorExtractor, &[&str]) -> Option<String>;

/// Vendor chain, most precise first. The last entry only fails on a blank
/// document.
pub const VENDOR_STRATEGIES: &[(&str, VendorStrategy)] = &[
    ("keyword_fuzzy", VendorExtractor::by_keyword_similarity),
    ("keyword_density", VendorExtractor::by_keyword_density),
    ("shape", VendorExtractor::by_shape),
    ("tax_id", VendorExtractor::by_tax_id),
    ("first_line", VendorExtractor::by_position),
];

/// Minimum uppercase letters for a line to look like a printed brand name.
const SHAPE_MIN_UPPERCASE: usize = 6;

/// A lone token longer than this looks like a brand name.
const SHAPE_MIN_TOKEN_CHARS: usize = 6;

/// Vendor field extractor.
#[derive(Debug, Clone)]
pub struct VendorExtractor {
    /// Uppercased, deduplicated keywords.
    keywords: Vec<String>,
    threshold: f64,
}

impl VendorExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut keywords: Vec<String> = config
            .vendor_keywords
            .iter()
            .map(|k| k.trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();

        Self {
            keywords,
            threshold: config.vendor_similarity,
        }
    }

    /// First line that approximately contains any keyword.
    pub fn by_keyword_similarity(&self, lines: &[&str]) -> Option<String> {
        lines.iter().find_map(|line| {
            let upper = line.to_uppercase();
            self.keywords.iter().find_map(|keyword| {
                let score = best_window_similarity(&upper, keyword);
                trace!("Vendor keyword {} scored {:.2} on '{}'", keyword, score, line);
                (score >= self.threshold).then(|| line.to_string())
            })
        })
    }

    /// First line containing two or more distinct keywords verbatim.
    pub fn by_keyword_density(&self, lines: &[&str]) -> Option<String> {
        lines
            .iter()
            .find(|line| {
                let upper = line.to_uppercase();
                self.keywords.iter().filter(|k| upper.contains(k.as_str())).count() >= 2
            })
            .map(|line| line.to_string())
    }

    /// First line shaped like a printed brand name.
    pub fn by_shape(&self, lines: &[&str]) -> Option<String> {
        lines
            .iter()
            .find(|line| {
                let uppercase = line.chars().filter(|c| c.is_uppercase()).count();
                if uppercase >= SHAPE_MIN_UPPERCASE {
                    return true;
                }

                let mut tokens = line.split_whitespace();
                match (tokens.next(), tokens.next()) {
                    (Some(token), None) => {
                        token.chars().count() > SHAPE_MIN_TOKEN_CHARS
                            && token.chars().any(char::is_alphabetic)
                    }
                    _ => false,
                }
            })
            .map(|line| line.to_string())
    }

    /// Text printed before a tax ID marker such as `NIT`.
    pub fn by_tax_id(&self, lines: &[&str]) -> Option<String> {
        lines.iter().find_map(|line| {
            let marker = TAX_ID_MARKER.captures(line)?.get(1)?;
            let name = line[..marker.start()]
                .trim()
                .trim_end_matches(['-', ',', ':', ';'])
                .trim();
            (name.chars().count() > 2).then(|| name.to_string())
        })
    }

    /// First content line of the document.
    pub fn by_position(&self, lines: &[&str]) -> Option<String> {
        lines.first().map(|line| line.to_string())
    }
}

impl Default for VendorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let lines = content_lines(text);

        VENDOR_STRATEGIES.iter().find_map(|(name, strategy)| {
            let vendor = strategy(self, &lines)?;
            debug!("Vendor '{}' found by strategy '{}'", vendor, name);
            Some(ExtractionMatch::new(vendor.clone(), *name, vendor))
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lines = content_lines(text);

        VENDOR_STRATEGIES
            .iter()
            .filter_map(|(name, strategy)| {
                strategy(self, &lines).map(|v| ExtractionMatch::new(v.clone(), *name, v))
            })
            .collect()
    }
}

/// Extract the vendor name; never empty.
pub fn extract_vendor(text: &str) -> String {
    VendorExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_else(|| VENDOR_NOT_FOUND.to_string())
}
