//! Record validation: which required fields can be trusted.

use std::collections::BTreeMap;

use crate::models::receipt::{FieldCheck, ReceiptField, ReceiptFields, NOT_FOUND_MARKER};

/// Validation outcome for a set of extracted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// True iff every required field passed.
    pub is_valid: bool,
    /// Failed fields in the order date, vendor, total.
    pub missing_fields: Vec<ReceiptField>,
    /// Per-field result, always covering all required fields.
    pub detail: BTreeMap<ReceiptField, FieldCheck>,
}

/// Check the required fields of a receipt.
pub fn validate(fields: &ReceiptFields) -> Validation {
    let mut missing_fields = Vec::new();
    let mut detail = BTreeMap::new();

    for field in ReceiptField::REQUIRED {
        let valid = match field {
            ReceiptField::Date => date_is_valid(fields.date.as_deref()),
            ReceiptField::Vendor => text_is_valid(&fields.vendor),
            ReceiptField::Total => text_is_valid(&fields.total),
        };

        if !valid {
            missing_fields.push(field);
        }
        detail.insert(field, FieldCheck { required: true, valid });
    }

    Validation {
        is_valid: missing_fields.is_empty(),
        missing_fields,
        detail,
    }
}

fn date_is_valid(date: Option<&str>) -> bool {
    match date.map(str::trim) {
        Some(d) => !d.is_empty() && !d.eq_ignore_ascii_case("none"),
        None => false,
    }
}

fn text_is_valid(value: &str) -> bool {
    !value.trim().is_empty() && !value.to_lowercase().contains(NOT_FOUND_MARKER)
}
