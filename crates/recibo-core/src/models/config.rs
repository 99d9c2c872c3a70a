//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ReciboError, Result};

/// Main configuration for recibo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReciboConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Tabular export configuration.
    pub export: ExportConfig,
}

/// Field extraction configuration.
///
/// Every table and threshold the extractors consult lives here so that a
/// deployment can tune them for its receipt population.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Store-type words and chain names expected in receipt headers.
    pub vendor_keywords: Vec<String>,

    /// Minimum similarity (0.0 - 1.0) for a line to match a vendor keyword.
    pub vendor_similarity: f64,

    /// Word that marks the line carrying the amount due.
    pub total_keyword: String,

    /// Minimum similarity (0.0 - 1.0) for a token to count as the total keyword.
    pub total_similarity: f64,

    /// Spanish month names and abbreviations.
    pub months: Vec<MonthName>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            vendor_keywords: DEFAULT_VENDOR_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            vendor_similarity: 0.7,
            total_keyword: "total".to_string(),
            total_similarity: 0.6,
            months: default_months(),
        }
    }
}

impl ExtractionConfig {
    /// Check thresholds and tables, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("vendor_similarity", self.vendor_similarity),
            ("total_similarity", self.total_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ReciboError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }

        if self.total_keyword.trim().is_empty() {
            return Err(ReciboError::Config("total_keyword must not be empty".to_string()));
        }

        if let Some(month) = self.months.iter().find(|m| !(1..=12).contains(&m.number)) {
            return Err(ReciboError::Config(format!(
                "month '{}' has number {} outside 1-12",
                month.name, month.number
            )));
        }

        Ok(())
    }
}

/// A month as it may appear on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthName {
    /// Month number (1 - 12).
    pub number: u8,
    /// Full name, e.g. "julio".
    pub name: String,
    /// Short form, e.g. "jul".
    pub abbreviation: String,
}

impl MonthName {
    pub fn new(number: u8, name: &str, abbreviation: &str) -> Self {
        Self {
            number,
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
        }
    }
}

/// Tabular export configuration, used by front ends that write CSV rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Write the recognizer output as the last column.
    pub include_raw_text: bool,

    /// Append validity and missing-field columns.
    pub include_validation: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_raw_text: true,
            include_validation: true,
        }
    }
}

/// Default vendor dictionary: store types and Colombian retail chains.
pub const DEFAULT_VENDOR_KEYWORDS: &[&str] = &[
    "SUPERMERCADO",
    "MINIMERCADO",
    "HIPERMERCADO",
    "MERCADO",
    "AUTOSERVICIO",
    "TIENDA",
    "ALMACEN",
    "ALMACENES",
    "DROGUERIA",
    "FARMACIA",
    "PANADERIA",
    "RESTAURANTE",
    "FERRETERIA",
    "PAPELERIA",
    "CARNICERIA",
    "LICORERA",
    "DISTRIBUIDORA",
    "COMERCIALIZADORA",
    "EXITO",
    "CARULLA",
    "OLIMPICA",
    "JUMBO",
    "ALKOSTO",
    "MAKRO",
    "COLSUBSIDIO",
    "CAFAM",
    "SURTIMAX",
    "CENCOSUD",
];

fn default_months() -> Vec<MonthName> {
    vec![
        MonthName::new(1, "enero", "ene"),
        MonthName::new(2, "febrero", "feb"),
        MonthName::new(3, "marzo", "mar"),
        MonthName::new(4, "abril", "abr"),
        MonthName::new(5, "mayo", "may"),
        MonthName::new(6, "junio", "jun"),
        MonthName::new(7, "julio", "jul"),
        MonthName::new(8, "agosto", "ago"),
        MonthName::new(9, "septiembre", "sep"),
        MonthName::new(9, "setiembre", "set"),
        MonthName::new(10, "octubre", "oct"),
        MonthName::new(11, "noviembre", "nov"),
        MonthName::new(12, "diciembre", "dic"),
    ]
}

impl ReciboConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.extraction.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_thresholds() {
        let config = ExtractionConfig::default();
        assert_eq!(config.vendor_similarity, 0.7);
        assert_eq!(config.total_similarity, 0.6);
        assert_eq!(config.total_keyword, "total");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let config = ExtractionConfig {
            vendor_similarity: 1.5,
            ..ExtractionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReciboError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_month_number() {
        let mut config = ExtractionConfig::default();
        config.months.push(MonthName::new(13, "trecember", "tre"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"extraction": {"vendor_similarity": 0.8}}"#).unwrap();

        let config = ReciboConfig::from_file(&path).unwrap();
        assert_eq!(config.extraction.vendor_similarity, 0.8);
        assert_eq!(config.extraction.total_similarity, 0.6);
        assert_eq!(config.extraction.months.len(), 13);
        assert!(config.export.include_raw_text);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ReciboConfig::default();
        config.extraction.vendor_keywords = vec!["BODEGA".to_string()];
        config.save(&path).unwrap();

        let loaded = ReciboConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.vendor_keywords, vec!["BODEGA".to_string()]);
    }
}
