//! Input sanitization for free-text and numeric request parameters
//!
//! Free text reaches the store only as an escaped, case-insensitive
//! substring pattern. Numeric parameters that fail to parse are dropped,
//! never turned into errors.

use tracing::debug;

/// Longest free-text parameter kept; longer input is truncated
pub const MAX_TEXT_LEN: usize = 100;

/// Earliest and latest year accepted as a filter value
pub const YEAR_RANGE: (i32, i32) = (1990, 2100);

/// Escape every regex metacharacter so `input` matches literally
pub fn escape_pattern(input: &str) -> String {
    regex::escape(input)
}

/// Trimmed, length-capped text; `None` when empty
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_TEXT_LEN).collect())
}

/// Literal substring pattern for free text
pub fn substring_pattern(raw: Option<&str>) -> Option<String> {
    clean_text(raw).map(|text| escape_pattern(&text))
}

/// Non-negative finite number; anything else is dropped
pub fn parse_non_negative(raw: Option<&str>) -> Option<f64> {
    let text = clean_text(raw)?;
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
        _ => {
            debug!(value = %text, "Dropping non-numeric or negative amount filter");
            None
        }
    }
}

/// Calendar year within the accepted range; anything else is dropped
pub fn parse_year(raw: Option<&str>) -> Option<i32> {
    let text = clean_text(raw)?;
    match text.parse::<i32>() {
        Ok(year) if (YEAR_RANGE.0..=YEAR_RANGE.1).contains(&year) => Some(year),
        _ => {
            debug!(value = %text, "Dropping invalid year filter");
            None
        }
    }
}

/// Integer parameter such as a page or limit; fractional input truncates
pub fn parse_integer(raw: Option<&str>) -> Option<i64> {
    let text = clean_text(raw)?;
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| n.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_escape_pattern_matches_literally() {
        for input in ["a.b", "(x)", "[roads]", "100$", "^start", "a+b*c?", "x|y", "{2}", "\\"] {
            let pattern = escape_pattern(input);
            let re = Regex::new(&pattern).unwrap();
            assert!(re.is_match(input), "{} should match itself", input);
            assert_eq!(re.find(input).unwrap().as_str(), input);
        }
        let re = Regex::new(&escape_pattern("a.b")).unwrap();
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some("  Kerala ")), Some("Kerala".to_string()));
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
        let long = "x".repeat(500);
        assert_eq!(clean_text(Some(&long)).unwrap().len(), MAX_TEXT_LEN);
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative(Some("1500")), Some(1500.0));
        assert_eq!(parse_non_negative(Some("1,00,000")), Some(100000.0));
        assert_eq!(parse_non_negative(Some("0")), Some(0.0));
        assert_eq!(parse_non_negative(Some("-5")), None);
        assert_eq!(parse_non_negative(Some("lots")), None);
        assert_eq!(parse_non_negative(Some("inf")), None);
        assert_eq!(parse_non_negative(None), None);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(Some("2021")), Some(2021));
        assert_eq!(parse_year(Some(" 2024 ")), Some(2024));
        assert_eq!(parse_year(Some("20")), None);
        assert_eq!(parse_year(Some("2021-22")), None);
        assert_eq!(parse_year(Some("")), None);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer(Some("3")), Some(3));
        assert_eq!(parse_integer(Some("-2")), Some(-2));
        assert_eq!(parse_integer(Some("2.9")), Some(2));
        assert_eq!(parse_integer(Some("abc")), None);
    }
}
