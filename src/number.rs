//! Numeric literal decoding.
//!
//! These functions turn the integer and float lexemes produced by the grammar into
//! values. They are total over every lexeme the grammar accepts; an error here means the
//! caller handed over text the grammar would never produce.
//!
//! ## Hexadecimal floats
//!
//! Ziggy's hexadecimal float literals do not weight their fractional digits by powers of
//! sixteen. The digits after the `.` are read as a single hexadecimal integer, and that
//! integer is shifted into `[0, 1)` by its decimal digit count. The exponent after `p` is
//! a power of ten:
//!
//! ```rust
//! use serde_ziggy::number::decode_float;
//!
//! // 0xef = 239, 0xab = 171 -> 239.171, times 10^12
//! let x = decode_float("0xef.abp12").unwrap();
//! assert!((x - 239.171e12).abs() / 239.171e12 < 1e-10);
//! ```

use crate::{Error, Number, Result};
use num_bigint::BigInt;

/// Decodes an integer lexeme such as `123_456`, `-42`, `0xFF_FF`, `0o17` or `0b1010`.
///
/// Values that do not fit in an `i64` are returned as [`Number::BigInt`].
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::number::decode_integer;
/// use serde_ziggy::Number;
///
/// assert_eq!(decode_integer("0b1010").unwrap(), Number::Integer(10));
/// assert_eq!(decode_integer("0xFF_FF_FF").unwrap(), Number::Integer(16777215));
/// ```
pub fn decode_integer(lexeme: &str) -> Result<Number> {
    let (negative, unsigned) = split_sign(lexeme);
    let (radix, body) = split_radix(unsigned);
    let digits: String = body.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() {
        return Err(Error::invalid_number("integer", lexeme));
    }

    let signed = if negative {
        format!("-{}", digits)
    } else {
        digits
    };
    match i64::from_str_radix(&signed, radix) {
        Ok(i) => Ok(Number::Integer(i)),
        Err(_) => BigInt::parse_bytes(signed.as_bytes(), radix)
            .map(Number::from)
            .ok_or_else(|| Error::invalid_number("integer", lexeme)),
    }
}

/// Decodes a float lexeme, either decimal (`12_3.45_6E1_2`) or hexadecimal
/// (`0x103.70p-5`).
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::number::decode_float;
///
/// assert_eq!(decode_float("123.456").unwrap(), 123.456);
/// assert_eq!(decode_float("-0.5e1").unwrap(), -5.0);
/// ```
pub fn decode_float(lexeme: &str) -> Result<f64> {
    let normalized: String = lexeme
        .chars()
        .filter(|&c| c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let (negative, unsigned) = split_sign(&normalized);

    let magnitude = match unsigned.strip_prefix("0x") {
        Some(hex) => decode_hex_float(hex),
        None => unsigned.parse::<f64>().ok(),
    }
    .ok_or_else(|| Error::invalid_number("float", lexeme))?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// Beyond this magnitude every finite mantissa overflows to infinity or underflows to zero.
const MAX_HEX_EXPONENT: u32 = 700;

fn decode_hex_float(hex: &str) -> Option<f64> {
    let (mantissa, exponent) = match hex.split_once('p') {
        Some((mantissa, exp)) => (mantissa, saturating_exponent(exp)?),
        None => (hex, 0),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (mantissa, ""),
    };

    let base = hex_digits_value(whole)?;
    let fraction_value = if fraction.is_empty() {
        0.0
    } else {
        hex_digits_value(fraction)?
    };

    let fraction_part = if fraction_value == 0.0 {
        0.0
    } else {
        let k = fraction_value.log10().round() as i32 + 1;
        fraction_value / 10f64.powi(k)
    };

    let value = base + fraction_part;
    if value == 0.0 {
        return Some(0.0);
    }
    Some(value * 10f64.powi(exponent))
}

fn saturating_exponent(exp: &str) -> Option<i32> {
    let (negative, digits) = split_sign(exp);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits
        .parse::<u32>()
        .map_or(MAX_HEX_EXPONENT, |e| e.min(MAX_HEX_EXPONENT)) as i32;
    Some(if negative { -magnitude } else { magnitude })
}

fn hex_digits_value(digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0f64, |acc, c| {
        c.to_digit(16).map(|d| acc * 16.0 + f64::from(d))
    })
}

fn split_sign(lexeme: &str) -> (bool, &str) {
    match lexeme.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lexeme.strip_prefix('+').unwrap_or(lexeme)),
    }
}

fn split_radix(lexeme: &str) -> (u32, &str) {
    match lexeme.get(..2) {
        Some("0x") => (16, &lexeme[2..]),
        Some("0o") => (8, &lexeme[2..]),
        Some("0b") => (2, &lexeme[2..]),
        _ => (10, lexeme),
    }
}
