//! Purchase date extraction and normalization to `DD/MM/YYYY`.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::error::Result;
use crate::models::config::{ExtractionConfig, MonthName};

use super::{ExtractionMatch, FieldExtractor};
use super::patterns::{DATE_COMPACT, DATE_DAY_FIRST, DATE_DOTTED, DATE_SHORT_YEAR, DATE_YEAR_FIRST};

/// Two-digit years below this belong to the 2000s.
pub const SHORT_YEAR_PIVOT: u32 = 30;

lazy_static! {
    static ref DEFAULT_MONTHS: Vec<MonthName> = ExtractionConfig::default().months;
    static ref DEFAULT_MONTH_NAME: Regex = month_name_pattern(&DEFAULT_MONTHS).unwrap();
    static ref DEFAULT_MONTH_ABBREVIATION: Regex = month_abbreviation_pattern(&DEFAULT_MONTHS).unwrap();
}

/// How the capture groups of a date pattern map to day, month and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `YYYY/MM/DD`, `YYYY-MM-DD`.
    YearFirst,
    /// `DD/MM/YYYY`, `DD.MM.YYYY`, `DD MM YYYY`.
    DayFirst,
    /// `DD de julio de YYYY`.
    MonthName,
    /// `DD jul. YYYY`.
    MonthAbbreviation,
    /// `DD/MM/YY`.
    ShortYear,
    /// `DDMMYYYY`.
    Compact,
}

/// One entry of the ordered date chain.
#[derive(Debug, Clone)]
pub struct DatePattern {
    pub name: &'static str,
    pub regex: Regex,
    pub shape: DateShape,
}

impl DatePattern {
    fn new(name: &'static str, regex: Regex, shape: DateShape) -> Self {
        Self { name, regex, shape }
    }
}

/// Date field extractor.
///
/// Patterns are tried in order and the first one that matches anywhere in
/// the text wins, so a well-formed numeric date is preferred over a compact
/// digit run elsewhere on the receipt.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    patterns: Vec<DatePattern>,
    months: Vec<MonthName>,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self {
            patterns: chain(
                Some(DEFAULT_MONTH_NAME.clone()),
                Some(DEFAULT_MONTH_ABBREVIATION.clone()),
            ),
            months: DEFAULT_MONTHS.clone(),
        }
    }

    /// Build an extractor that recognizes the given month table.
    pub fn with_months(months: &[MonthName]) -> Result<Self> {
        let (name, abbreviation) = if months.is_empty() {
            (None, None)
        } else {
            (
                Some(month_name_pattern(months)?),
                Some(month_abbreviation_pattern(months)?),
            )
        };

        Ok(Self {
            patterns: chain(name, abbreviation),
            months: months.to_vec(),
        })
    }

    /// Patterns in evaluation order.
    pub fn patterns(&self) -> &[DatePattern] {
        &self.patterns
    }

    /// Two-digit month number for a month name or abbreviation.
    ///
    /// Names missing from the table resolve to `"01"`.
    pub fn month_number(&self, name: &str) -> String {
        let name = name.trim().trim_end_matches('.').to_lowercase();
        self.months
            .iter()
            .find(|m| m.name.to_lowercase() == name || m.abbreviation.to_lowercase() == name)
            .map(|m| format!("{:02}", m.number))
            .unwrap_or_else(|| "01".to_string())
    }

    fn normalize(&self, shape: DateShape, caps: &Captures) -> Option<String> {
        let (day, month, year) = match shape {
            DateShape::YearFirst => (caps[3].to_string(), caps[2].to_string(), caps[1].to_string()),
            DateShape::DayFirst => (caps[1].to_string(), caps[2].to_string(), caps[3].to_string()),
            DateShape::MonthName | DateShape::MonthAbbreviation => {
                (caps[1].to_string(), self.month_number(&caps[2]), caps[3].to_string())
            }
            DateShape::ShortYear => {
                let short: u32 = caps[3].parse().ok()?;
                (caps[1].to_string(), caps[2].to_string(), expand_short_year(short).to_string())
            }
            DateShape::Compact => {
                let digits = &caps[1];
                (digits[0..2].to_string(), digits[2..4].to_string(), digits[4..8].to_string())
            }
        };

        Some(format!("{:0>2}/{:0>2}/{:0>4}", day, month, year))
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                if let Some(date) = self.normalize(pattern.shape, &caps) {
                    debug!("Date {} matched by pattern '{}'", date, pattern.name);
                    return Some(ExtractionMatch::new(date, pattern.name, caps[0].trim()));
                }
            }
            trace!("Date pattern '{}' did not match", pattern.name);
        }

        None
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                if let Some(date) = self.normalize(pattern.shape, &caps) {
                    // Skip if already found by a higher-priority pattern
                    if results.iter().any(|r| r.value == date) {
                        continue;
                    }
                    results.push(ExtractionMatch::new(date, pattern.name, caps[0].trim()));
                }
            }
        }

        results
    }
}

/// Extract the purchase date from receipt text using the default month table.
pub fn extract_date(text: &str) -> Option<String> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

/// Expand a two-digit year: below the pivot is 20YY, otherwise 19YY.
pub fn expand_short_year(year: u32) -> u32 {
    if year < SHORT_YEAR_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}

fn chain(month_name: Option<Regex>, month_abbreviation: Option<Regex>) -> Vec<DatePattern> {
    let mut patterns = vec![
        DatePattern::new("year_first", DATE_YEAR_FIRST.clone(), DateShape::YearFirst),
        DatePattern::new("day_first", DATE_DAY_FIRST.clone(), DateShape::DayFirst),
        DatePattern::new("dotted", DATE_DOTTED.clone(), DateShape::DayFirst),
    ];

    if let Some(regex) = month_name {
        patterns.push(DatePattern::new("month_name", regex, DateShape::MonthName));
    }
    if let Some(regex) = month_abbreviation {
        patterns.push(DatePattern::new(
            "month_abbreviation",
            regex,
            DateShape::MonthAbbreviation,
        ));
    }

    patterns.push(DatePattern::new("short_year", DATE_SHORT_YEAR.clone(), DateShape::ShortYear));
    patterns.push(DatePattern::new("compact", DATE_COMPACT.clone(), DateShape::Compact));
    patterns
}

fn alternation<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let mut words: Vec<String> = words
        .map(|w| regex::escape(&w.trim().to_lowercase()))
        .filter(|w| !w.is_empty())
        .collect();
    // Longest first so "septiembre" is not cut short by a shorter entry
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();
    words.join("|")
}

fn month_name_pattern(months: &[MonthName]) -> Result<Regex> {
    let names = alternation(months.iter().map(|m| m.name.as_str()));
    Ok(Regex::new(&format!(
        r"(?i)\b([0-9]{{1,2}})\s+de\s+({names})(?:\s+de)?\s+([0-9]{{4}})\b"
    ))?)
}

fn month_abbreviation_pattern(months: &[MonthName]) -> Result<Regex> {
    let abbreviations = alternation(months.iter().map(|m| m.abbreviation.as_str()));
    Ok(Regex::new(&format!(
        r"(?i)\b([0-9]{{1,2}})\s+({abbreviations})\.?\s+([0-9]{{4}})\b"
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(text: &str) -> Option<String> {
        extract_date(text)
    }

    #[test]
    fn test_day_first_slash() {
        assert_eq!(date("FECHA: 26/06/2025 10:31"), Some("26/06/2025".to_string()));
        assert_eq!(date("26-06-2025"), Some("26/06/2025".to_string()));
    }

    #[test]
    fn test_year_first_is_reordered() {
        assert_eq!(date("2024-01-15"), Some("15/01/2024".to_string()));
        assert_eq!(date("2024/1/5"), Some("05/01/2024".to_string()));
    }

    #[test]
    fn test_dotted_and_spaced() {
        assert_eq!(date("15.01.2024"), Some("15/01/2024".to_string()));
        assert_eq!(date("Fecha 3 7 2023"), Some("03/07/2023".to_string()));
    }

    #[test]
    fn test_month_name() {
        assert_eq!(date("15 de julio de 2023"), Some("15/07/2023".to_string()));
        assert_eq!(date("1 de Diciembre 2022"), Some("01/12/2022".to_string()));
        assert_eq!(date("9 DE SETIEMBRE DE 2021"), Some("09/09/2021".to_string()));
    }

    #[test]
    fn test_month_abbreviation() {
        assert_eq!(date("15 jul. 2023"), Some("15/07/2023".to_string()));
        assert_eq!(date("02 ENE 2024"), Some("02/01/2024".to_string()));
    }

    #[test]
    fn test_short_year_pivot() {
        assert_eq!(date("26-06-25"), Some("26/06/2025".to_string()));
        assert_eq!(date("26/06/95"), Some("26/06/1995".to_string()));
        assert_eq!(expand_short_year(29), 2029);
        assert_eq!(expand_short_year(30), 1930);
    }

    #[test]
    fn test_compact_fallback() {
        assert_eq!(date("REF 26062025"), Some("26/06/2025".to_string()));
    }

    #[test]
    fn test_compact_needs_exactly_eight_digits() {
        assert_eq!(date("FECHA 260620251031"), None);
        assert_eq!(date("FECHA 26062025 10:31"), Some("26/06/2025".to_string()));
    }

    #[test]
    fn test_non_ascii_digits_are_not_dates() {
        assert_eq!(date("FECHA ٢٦/٠٦/٢٠٢٥"), None);
        assert_eq!(date("２０２５-０６-２６"), None);
        assert_eq!(date("٢٦ de julio de ٢٠٢٥"), None);
    }

    #[test]
    fn test_no_calendar_check() {
        assert_eq!(date("32/13/2025"), Some("32/13/2025".to_string()));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(date(""), None);
        assert_eq!(date("TOTAL $12.930\nGRACIAS"), None);
    }

    #[test]
    fn test_chain_order() {
        // Numeric date wins over a month-name date appearing earlier in the text
        let text = "15 de julio de 2023\n2024-01-15";
        let found = DateExtractor::new().extract(text).unwrap();
        assert_eq!(found.value, "15/01/2024");
        assert_eq!(found.strategy, "year_first");
    }

    #[test]
    fn test_pattern_names_are_distinct() {
        let extractor = DateExtractor::new();
        let names: Vec<&str> = extractor.patterns().iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["year_first", "day_first", "dotted", "month_name", "month_abbreviation", "short_year", "compact"]
        );
    }

    #[test]
    fn test_unknown_month_defaults_to_january() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.month_number("julio"), "07");
        assert_eq!(extractor.month_number("JUL."), "07");
        assert_eq!(extractor.month_number("brumario"), "01");
    }

    #[test]
    fn test_custom_month_table() {
        let months = vec![MonthName::new(7, "july", "jul")];
        let extractor = DateExtractor::with_months(&months).unwrap();
        let found = extractor.extract("4 de july de 1999").unwrap();
        assert_eq!(found.value, "04/07/1999");
        assert!(extractor.extract("4 de julio de 1999").is_none());
    }

    #[test]
    fn test_empty_month_table_keeps_numeric_patterns() {
        let extractor = DateExtractor::with_months(&[]).unwrap();
        assert_eq!(extractor.patterns().len(), 5);
        assert_eq!(extractor.extract("01/02/2020").unwrap().value, "01/02/2020");
    }

    #[test]
    fn test_extract_all_in_priority_order() {
        let text = "Compra 15 jul. 2023\nImpreso 2023-07-16";
        let all = DateExtractor::new().extract_all(text);
        let values: Vec<&str> = all.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["16/07/2023", "15/07/2023"]);
    }
}
