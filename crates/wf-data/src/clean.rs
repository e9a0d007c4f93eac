//! Numeric cleanup for manually entered text fields.

use wf_core::Real;

/// Parse a numeric text field such as `"1,234.5"`.
///
/// Thousands separators and surrounding whitespace are stripped. Empty,
/// unparsable and non-finite values yield `None`; they are never coerced to zero.
pub fn parse_numeric(raw: &str) -> Option<Real> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Real>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(parse_numeric("1,234.5"), Some(1234.5));
        assert_eq!(parse_numeric("  42 "), Some(42.0));
    }

    #[test]
    fn missing_is_none_not_zero() {
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("   "), None);
        assert_eq!(parse_numeric("n/a"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
    }

    #[test]
    fn explicit_zero_survives() {
        assert_eq!(parse_numeric("0"), Some(0.0));
    }
}
