//! Core library for Spanish retail receipt processing.
//!
//! This crate turns the raw text a recognizer produced for one receipt into
//! a [`ReceiptRecord`]:
//! - purchase date normalized to `DD/MM/YYYY`
//! - vendor name from an ordered chain of keyword and layout heuristics
//! - total amount in whole pesos, formatted as `$12.930`
//! - candidate item lines
//! - a validation report naming the fields that could not be trusted
//!
//! Extraction never fails: missing fields are reported through sentinels and
//! the record's validation report.

pub mod error;
pub mod models;
pub mod receipt;

pub use error::{ReciboError, Result};
pub use models::config::{ExportConfig, ExtractionConfig, MonthName, ReciboConfig};
pub use models::receipt::{
    FieldCheck, ReceiptField, ReceiptFields, ReceiptRecord, ITEMS_NOT_FOUND, NOT_FOUND_MARKER,
    TOTAL_NOT_FOUND, VENDOR_NOT_FOUND,
};
pub use receipt::{
    process_receipt, ExtractionResult, FieldSources, ReceiptParser, ReceiptProcessor,
};
pub use receipt::rules::{similarity, FieldExtractor};
