//! Receipt field extraction module.

mod processor;
pub mod rules;

pub use processor::{
    process_receipt, ExtractionResult, FieldSources, ReceiptParser, ReceiptProcessor,
};
