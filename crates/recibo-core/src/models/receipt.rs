//! Receipt data model produced by the extraction pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::receipt::rules::validation::{validate, Validation};

/// Marker contained in every "not found" sentinel.
pub const NOT_FOUND_MARKER: &str = "no encontrado";

/// Vendor placeholder when the document has no usable line.
pub const VENDOR_NOT_FOUND: &str = "Vendedor no encontrado";

/// Total placeholder when no amount could be recovered.
pub const TOTAL_NOT_FOUND: &str = "Total no encontrado";

/// Items placeholder when no line carries a price.
pub const ITEMS_NOT_FOUND: &str = "Artículos no encontrados";

/// Fields that must be present for a receipt to be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptField {
    Date,
    Vendor,
    Total,
}

impl ReceiptField {
    /// Required fields in report order.
    pub const REQUIRED: [ReceiptField; 3] = [ReceiptField::Date, ReceiptField::Vendor, ReceiptField::Total];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptField::Date => "date",
            ReceiptField::Vendor => "vendor",
            ReceiptField::Total => "total",
        }
    }
}

impl fmt::Display for ReceiptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCheck {
    /// Whether the field is required for a valid record.
    pub required: bool,
    /// Whether the field passed its rule.
    pub valid: bool,
}

/// Extracted fields before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFields {
    /// Purchase date as `DD/MM/YYYY`.
    pub date: Option<String>,
    /// Vendor name or [`VENDOR_NOT_FOUND`].
    pub vendor: String,
    /// Formatted total or [`TOTAL_NOT_FOUND`].
    pub total: String,
    /// Newline-joined item lines or [`ITEMS_NOT_FOUND`].
    pub items: String,
}

/// A fully processed receipt.
///
/// Built once per input text; the validation fields are derived from the
/// extracted fields at construction and cannot drift from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptRecord {
    date: Option<String>,
    vendor: String,
    total: String,
    items: String,
    raw_text: String,
    is_valid: bool,
    missing_fields: Vec<ReceiptField>,
    validation_detail: BTreeMap<ReceiptField, FieldCheck>,
}

impl ReceiptRecord {
    /// Assemble a record from extracted fields and annotate it.
    pub fn new(fields: ReceiptFields, raw_text: impl Into<String>) -> Self {
        let Validation {
            is_valid,
            missing_fields,
            detail,
        } = validate(&fields);

        Self {
            date: fields.date,
            vendor: fields.vendor,
            total: fields.total,
            items: fields.items,
            raw_text: raw_text.into(),
            is_valid,
            missing_fields,
            validation_detail: detail,
        }
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn total(&self) -> &str {
        &self.total
    }

    pub fn items(&self) -> &str {
        &self.items
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn missing_fields(&self) -> &[ReceiptField] {
        &self.missing_fields
    }

    pub fn validation_detail(&self) -> &BTreeMap<ReceiptField, FieldCheck> {
        &self.validation_detail
    }

    /// The extracted fields, e.g. for re-validation.
    pub fn fields(&self) -> ReceiptFields {
        ReceiptFields {
            date: self.date.clone(),
            vendor: self.vendor.clone(),
            total: self.total.clone(),
            items: self.items.clone(),
        }
    }

    /// Columns in export order: date, vendor, total, items, raw text.
    pub fn export_row(&self) -> [&str; 5] {
        [
            self.date.as_deref().unwrap_or(""),
            &self.vendor,
            &self.total,
            &self.items,
            &self.raw_text,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(date: Option<&str>, vendor: &str, total: &str) -> ReceiptFields {
        ReceiptFields {
            date: date.map(str::to_string),
            vendor: vendor.to_string(),
            total: total.to_string(),
            items: ITEMS_NOT_FOUND.to_string(),
        }
    }

    #[test]
    fn test_valid_record() {
        let record = ReceiptRecord::new(
            fields(Some("26/06/2025"), "TIENDA D1", "$12.930"),
            "raw",
        );
        assert!(record.is_valid());
        assert!(record.missing_fields().is_empty());
        assert_eq!(record.validation_detail().len(), 3);
        assert_eq!(record.raw_text(), "raw");
    }

    #[test]
    fn test_sentinel_total_is_missing() {
        let record = ReceiptRecord::new(
            fields(Some("26/06/2025"), "TIENDA D1", TOTAL_NOT_FOUND),
            "",
        );
        assert!(!record.is_valid());
        assert_eq!(record.missing_fields(), &[ReceiptField::Total]);
        assert_eq!(
            record.validation_detail()[&ReceiptField::Total],
            FieldCheck { required: true, valid: false }
        );
    }

    #[test]
    fn test_serialized_shape() {
        let record = ReceiptRecord::new(fields(None, VENDOR_NOT_FOUND, TOTAL_NOT_FOUND), "");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["date"], serde_json::Value::Null);
        assert_eq!(json["is_valid"], false);
        assert_eq!(
            json["missing_fields"],
            serde_json::json!(["date", "vendor", "total"])
        );
        assert_eq!(
            json["validation_detail"]["vendor"],
            serde_json::json!({"required": true, "valid": false})
        );
    }

    #[test]
    fn test_export_row_order() {
        let record = ReceiptRecord::new(
            fields(Some("01/02/2024"), "FARMACIA", "$5.000"),
            "FARMACIA\nTOTAL 5000",
        );
        assert_eq!(
            record.export_row(),
            ["01/02/2024", "FARMACIA", "$5.000", ITEMS_NOT_FOUND, "FARMACIA\nTOTAL 5000"]
        );
    }
}
