//! Lenient numeric parsing for spreadsheet-sourced fields.
//!
//! Trade amounts and prices arrive as loosely formatted text (`"$100,000"`,
//! `" 0.05 "`, `"1 234.5 USD"`). Parsing is total: anything that does not
//! reduce to a finite number becomes `0.0`. Nothing here returns an error.

/// Parse a loosely formatted number.
///
/// Rules:
/// - Every character other than ASCII digits, `.` and `-` is stripped first
///   (currency symbols, thousands separators, whitespace, unit suffixes).
/// - An `e`/`E` right after a digit and before a digit or sign is kept as an
///   exponent, so `"1.5E-05"` parses; the `E` in `"1,000 EUR"` does not.
/// - The remainder must parse as a finite `f64`; otherwise `0.0`.
/// - An empty input is `0.0`.
pub fn parse_number(raw: &str) -> f64 {
    let chars: Vec<char> = raw.trim().chars().collect();
    let mut cleaned = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        let keep = match c {
            '0'..='9' | '.' | '-' => true,
            'e' | 'E' => {
                let after_digit = cleaned.ends_with(|p: char| p.is_ascii_digit());
                let before_exp = chars
                    .get(i + 1)
                    .is_some_and(|n| n.is_ascii_digit() || *n == '-' || *n == '+');
                after_digit && before_exp
            }
            '+' => cleaned.ends_with(['e', 'E']),
            _ => false,
        };
        if keep {
            cleaned.push(c);
        }
    }

    if cleaned.is_empty() {
        return 0.0;
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Replace non-finite values with `0.0`.
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// `num / den`, or `0.0` when `den` is zero or the result is not finite.
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    finite_or_zero(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_currency_and_thousands_separators() {
        assert_eq!(parse_number("$100,000"), 100_000.0);
        assert_eq!(parse_number(" $1,234.50 "), 1_234.5);
        assert_eq!(parse_number("120000 USD"), 120_000.0);
    }

    #[test]
    fn plain_decimals() {
        assert_eq!(parse_number("0.05"), 0.05);
        assert_eq!(parse_number("3"), 3.0);
        assert_eq!(parse_number("-2.5"), -2.5);
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(parse_number("1e5"), 100_000.0);
        assert_eq!(parse_number("1.5E-05"), 1.5e-5);
        assert_eq!(parse_number("2.5e+3"), 2_500.0);
        assert_eq!(parse_number("1,000 EUR"), 1_000.0);
        assert_eq!(parse_number("5e"), 5.0);
    }

    #[test]
    fn malformed_input_is_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("   "), 0.0);
        assert_eq!(parse_number("n/a"), 0.0);
        assert_eq!(parse_number("1.2.3"), 0.0);
        assert_eq!(parse_number("--"), 0.0);
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio_or_zero(10.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(10.0, 4.0), 2.5);
    }

    #[test]
    fn finite_or_zero_drops_nan_and_inf() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(1.5), 1.5);
    }
}
