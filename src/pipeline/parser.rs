//! Raw comma-separated text to an ordered list of numbers.

use crate::error::{Result, ZiaError};

/// Parse a comma-separated list of numbers.
///
/// Blank input fails with [`ZiaError::EmptyInput`]. Empty tokens are skipped,
/// so trailing and doubled commas are tolerated. Every remaining token must be
/// a finite decimal or scientific literal (see [`is_decimal_literal`]).
/// Arity is not checked here.
pub fn parse_features(raw: &str) -> Result<Vec<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ZiaError::EmptyInput);
    }

    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_number)
        .collect()
}

fn parse_number(token: &str) -> Result<f64> {
    let invalid = || ZiaError::InvalidNumber {
        token: token.to_string(),
    };

    if !is_decimal_literal(token) {
        return Err(invalid());
    }
    let value: f64 = token.parse().map_err(|_| invalid())?;
    // "1e400" is well-formed but overflows
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
///
/// Hex, `inf`, `NaN` and friends are rejected even though `f64::from_str`
/// accepts some of them.
pub fn is_decimal_literal(token: &str) -> bool {
    let bytes = token.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
