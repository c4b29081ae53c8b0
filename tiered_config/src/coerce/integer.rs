//! Base-agnostic integer literal parsing.
//!
//! Accepts an optional sign followed by `0x`, `0o` or `0b` prefixed digits, a
//! leading `0` for octal, or plain decimal digits. Underscores may separate
//! digits, and may also directly follow a base prefix.

use super::CoercionFailure;

struct Literal<'a> {
    negative: bool,
    radix: u32,
    digits: &'a str,
    prefixed: bool,
}

fn split_literal(raw: &str) -> Result<Literal<'_>, CoercionFailure> {
    let trimmed = raw.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..).unwrap_or_default()),
        Some(b'+') => (false, trimmed.get(1..).unwrap_or_default()),
        _ => (false, trimmed),
    };
    let lower = unsigned.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits, prefixed) = match lower.as_deref() {
        Some("0x") => (16, unsigned.get(2..).unwrap_or_default(), true),
        Some("0o") => (8, unsigned.get(2..).unwrap_or_default(), true),
        Some("0b") => (2, unsigned.get(2..).unwrap_or_default(), true),
        _ if unsigned.len() > 1 && unsigned.starts_with('0') => {
            (8, unsigned.get(1..).unwrap_or_default(), true)
        }
        _ => (10, unsigned, false),
    };
    if digits.is_empty() {
        return Err(CoercionFailure::InvalidInteger);
    }
    Ok(Literal {
        negative,
        radix,
        digits,
        prefixed,
    })
}

fn magnitude(literal: &Literal<'_>) -> Result<u64, CoercionFailure> {
    let leading_separator = literal.digits.starts_with('_') && !literal.prefixed;
    if leading_separator || literal.digits.ends_with('_') || literal.digits.contains("__") {
        return Err(CoercionFailure::InvalidInteger);
    }
    let cleaned: String = literal.digits.chars().filter(|c| *c != '_').collect();
    if !cleaned.chars().all(|c| c.is_digit(literal.radix)) {
        return Err(CoercionFailure::InvalidInteger);
    }
    u64::from_str_radix(&cleaned, literal.radix).map_err(|_| CoercionFailure::OutOfRange)
}

/// Parses a signed 64-bit integer literal.
pub(crate) fn parse_signed(raw: &str) -> Result<i64, CoercionFailure> {
    let literal = split_literal(raw)?;
    let value = magnitude(&literal)?;
    if literal.negative {
        let wide = -i128::from(value);
        i64::try_from(wide).map_err(|_| CoercionFailure::OutOfRange)
    } else {
        i64::try_from(value).map_err(|_| CoercionFailure::OutOfRange)
    }
}

/// Parses an unsigned 64-bit integer literal, rejecting negative input.
pub(crate) fn parse_unsigned(raw: &str) -> Result<u64, CoercionFailure> {
    let literal = split_literal(raw)?;
    let value = magnitude(&literal)?;
    if literal.negative {
        return Err(CoercionFailure::Negative);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", 42)]
    #[case("-42", -42)]
    #[case("+7", 7)]
    #[case("0x1F", 31)]
    #[case("0X1f", 31)]
    #[case("0o17", 15)]
    #[case("017", 15)]
    #[case("0b101", 5)]
    #[case("0x_FF_FF", 65535)]
    #[case("1_000", 1000)]
    #[case("-8_080", -8080)]
    #[case("0_17", 15)]
    #[case("0", 0)]
    #[case("-9223372036854775808", i64::MIN)]
    fn parses_signed_literals(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(parse_signed(raw), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("-")]
    #[case("0x")]
    #[case("_1000")]
    #[case("1__000")]
    #[case("1000_")]
    #[case("08")]
    #[case("12abc")]
    #[case("0b102")]
    fn rejects_malformed_literals(#[case] raw: &str) {
        assert_eq!(parse_signed(raw), Err(CoercionFailure::InvalidInteger));
    }

    #[test]
    fn signed_overflow_is_out_of_range() {
        assert_eq!(
            parse_signed("9223372036854775808"),
            Err(CoercionFailure::OutOfRange)
        );
    }

    #[test]
    fn unsigned_rejects_negative() {
        assert_eq!(parse_unsigned("-1"), Err(CoercionFailure::Negative));
        assert_eq!(parse_unsigned("18446744073709551615"), Ok(u64::MAX));
    }
}
