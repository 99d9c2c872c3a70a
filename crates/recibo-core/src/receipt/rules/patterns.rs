//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Numeric date shapes, in the order the date chain tries them. ASCII digits only
    pub static ref DATE_YEAR_FIRST: Regex = Regex::new(
        r"\b([0-9]{4})[/\-]([0-9]{1,2})[/\-]([0-9]{1,2})\b"
    ).unwrap();

    pub static ref DATE_DAY_FIRST: Regex = Regex::new(
        r"\b([0-9]{1,2})[/\-]([0-9]{1,2})[/\-]([0-9]{4})\b"
    ).unwrap();

    pub static ref DATE_DOTTED: Regex = Regex::new(
        r"\b([0-9]{1,2})[. ]([0-9]{1,2})[. ]([0-9]{4})\b"
    ).unwrap();

    pub static ref DATE_SHORT_YEAR: Regex = Regex::new(
        r"\b([0-9]{1,2})[/\-]([0-9]{1,2})[/\-]([0-9]{2})\b"
    ).unwrap();

    // Exactly eight digits, not part of a longer run
    pub static ref DATE_COMPACT: Regex = Regex::new(
        r"(?:^|[^0-9])([0-9]{8})(?:[^0-9]|$)"
    ).unwrap();

    // Amounts: thousands grouped by '.' or ',' (12.930, 1,250,000) or a bare digit run
    pub static ref AMOUNT: Regex = Regex::new(
        r"[0-9]{1,3}(?:[.,][0-9]{3})+|[0-9]+"
    ).unwrap();

    // Item price: a separator followed by exactly two digits (3.500,00 or 4.99)
    pub static ref ITEM_PRICE: Regex = Regex::new(
        r"[0-9][.,][0-9]{2}(?:[^0-9]|$)"
    ).unwrap();

    // Tax ID marker (NIT) with the usual OCR confusions: N1T, 1IT, NlT, IT, N.I.T.
    // A bare `lt` is the litre unit, so `l` only stands for I after an N.
    pub static ref TAX_ID_MARKER: Regex = Regex::new(
        r"(?i)(?:^|[^\p{L}\d])((?:[n1l|]\.?[i1l|]|[i1|])\.?\s?t\.?)(?:[^\p{L}]|$)"
    ).unwrap();
}
