//! Line-item candidates: lines carrying a price with two decimals.

use crate::models::receipt::ITEMS_NOT_FOUND;

use super::patterns::ITEM_PRICE;
use super::trim_line;

/// Item lines in document order, whitespace collapsed.
pub fn item_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(trim_line)
        .filter(|line| ITEM_PRICE.is_match(line))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect()
}

/// Newline-joined item lines, or the "not found" sentinel when there are none.
pub fn items_block(lines: &[String]) -> String {
    if lines.is_empty() {
        ITEMS_NOT_FOUND.to_string()
    } else {
        lines.join("\n")
    }
}

/// Extract the item block from receipt text.
pub fn extract_items(text: &str) -> String {
    items_block(&item_lines(text))
}
