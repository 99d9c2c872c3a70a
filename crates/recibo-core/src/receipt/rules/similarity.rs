//! Approximate string matching used to tolerate OCR substitutions.

use strsim::normalized_levenshtein;

/// Case-insensitive similarity ratio in `[0, 1]`.
///
/// Returns 0 when either side is empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Best similarity between `keyword` and `line` or any run of consecutive
/// tokens of `line` with as many words as the keyword.
pub fn best_window_similarity(line: &str, keyword: &str) -> f64 {
    let width = keyword.split_whitespace().count().max(1);
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let whole = similarity(line.trim(), keyword);
    if tokens.len() <= width {
        return whole;
    }

    tokens
        .windows(width)
        .map(|w| similarity(&w.join(" "), keyword))
        .fold(whole, f64::max)
}
