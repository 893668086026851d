//! Numeric text as it appears in the raw sources.
//!
//! Missing observations arrive in several shapes (empty cells, `NaN` floats,
//! `"nan"` text). The parsers fold all of them into `None`.

/// Formats a float without trailing zeros; `NaN` becomes the empty string.
///
/// ```
/// use cardio_common::format_numeric;
///
/// assert_eq!(format_numeric(2000.0), "2000");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(f64::NAN), "");
/// ```
pub fn format_numeric(v: f64) -> String {
    if v.is_nan() {
        return String::new();
    }
    let text = v.to_string();
    match text.split_once('.') {
        None => text,
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{fraction}")
            }
        }
    }
}

/// Parses a cell as `f64`. Blank, unparsable and `NaN` cells are `None`.
/// Thousands separators are not accepted.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parses a cell as `i64`.
///
/// Spreadsheet exports write integral years as `2000.0`, so a float with no
/// fractional part is accepted too.
///
/// ```
/// use cardio_common::parse_i64;
///
/// assert_eq!(parse_i64("2000"), Some(2000));
/// assert_eq!(parse_i64("2000.0"), Some(2000));
/// assert_eq!(parse_i64("2000.5"), None);
/// ```
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| parse_f64(trimmed).and_then(integral))
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15).then_some(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(format_numeric(50000.0), "50000");
        assert_eq!(format_numeric(-100.0), "-100");
        assert_eq!(format_numeric(0.125), "0.125");
        assert_eq!(format_numeric(-0.0), "-0");
    }

    #[test]
    fn float_cells() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("  3.25  "), Some(3.25));
        assert_eq!(parse_f64("-100"), Some(-100.0));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("nan"), None);
        assert_eq!(parse_f64("1,200"), None);
    }

    #[test]
    fn integer_cells() {
        assert_eq!(parse_i64("  "), None);
        assert_eq!(parse_i64(" 2021 "), Some(2021));
        assert_eq!(parse_i64("1960.0"), Some(1960));
        assert_eq!(parse_i64("abc"), None);
        assert_eq!(parse_i64("1e20"), None);
    }
}
