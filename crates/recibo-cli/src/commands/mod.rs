//! Subcommands of the `recibo` binary.

pub mod batch;
pub mod config;
pub mod process;

/// Drop a leading UTF-8 byte order mark some editors write into text files.
pub(crate) fn strip_byte_order_mark(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
