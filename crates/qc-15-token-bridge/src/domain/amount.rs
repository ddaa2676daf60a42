//! # Amount Conversion
//!
//! Human decimal strings ↔ base units, and the 8-decimal wire normalization
//! applied by the token bridge.

use super::errors::{BridgeError, BridgeResult};
use primitive_types::U256;

/// Decimals used for amounts inside token bridge payloads.
pub const NORMALIZED_DECIMALS: u8 = 8;

/// Convert a human-readable decimal string into base units.
///
/// Rejects signs, exponents, empty input, more significant fractional
/// digits than `decimals`, and values that overflow 256 bits. Trailing
/// fractional zeros are ignored.
pub fn parse_units(amount: &str, decimals: u8) -> BridgeResult<U256> {
    let trimmed = amount.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(BridgeError::precision(amount, "not a number"));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(BridgeError::precision(amount, "not a number"));
    }
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(BridgeError::precision(
            amount,
            format!("too many decimal places for {} decimals", decimals),
        ));
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(significant)
        .map_err(|_| BridgeError::precision(amount, "exceeds 256-bit range"))
}

/// Format base units as a decimal string (`"1.5"`, `"2.0"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    if decimals == 0 {
        return digits;
    }

    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Scale a wire amount (8 decimals) up to a token with `decimals`.
pub fn from_normalized(amount: U256, decimals: u8) -> BridgeResult<U256> {
    if decimals <= NORMALIZED_DECIMALS {
        return Ok(amount);
    }
    let factor = pow10(decimals - NORMALIZED_DECIMALS)
        .ok_or_else(|| BridgeError::precision(&amount.to_string(), "scale overflow"))?;
    amount
        .checked_mul(factor)
        .ok_or_else(|| BridgeError::precision(&amount.to_string(), "exceeds 256-bit range"))
}

/// Truncate a base-unit amount down to 8 wire decimals.
pub fn to_normalized(amount: U256, decimals: u8) -> U256 {
    if decimals <= NORMALIZED_DECIMALS {
        return amount;
    }
    match pow10(decimals - NORMALIZED_DECIMALS) {
        Some(factor) => amount / factor,
        None => U256::zero(),
    }
}

fn pow10(exp: u8) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units_examples() {
        assert_eq!(parse_units("1.5", 6).unwrap().to_string(), "1500000");
        assert_eq!(
            parse_units("1.5", 18).unwrap().to_string(),
            "1500000000000000000"
        );
        assert_eq!(parse_units("0", 9).unwrap(), U256::zero());
        assert_eq!(parse_units("42", 0).unwrap(), U256::from(42));
        assert_eq!(parse_units(".25", 2).unwrap(), U256::from(25));
        assert_eq!(parse_units("3.", 2).unwrap(), U256::from(300));
    }

    #[test]
    fn test_parse_units_rejects_excess_precision() {
        let err = parse_units("1.1234567", 6).unwrap_err();
        assert!(matches!(err, BridgeError::Precision { .. }));
    }

    #[test]
    fn test_parse_units_ignores_trailing_fraction_zeros() {
        assert_eq!(parse_units("1.5000000", 6).unwrap(), U256::from(1_500_000));
        assert_eq!(parse_units("1.50", 1).unwrap(), U256::from(15));
        assert_eq!(parse_units("2.000", 0).unwrap(), U256::from(2));
        assert!(parse_units("1.5000001", 6).is_err());
    }

    #[test]
    fn test_parse_units_rejects_garbage() {
        for input in ["", ".", "abc", "-1", "1e5", "1.2.3", "+4"] {
            assert!(
                matches!(parse_units(input, 6), Err(BridgeError::Precision { .. })),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_units_overflow() {
        let huge = "9".repeat(80);
        assert!(parse_units(&huge, 0).is_err());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1.0");
        assert_eq!(format_units(U256::from(5u64), 9), "0.000000005");
        assert_eq!(format_units(U256::from(7u64), 0), "7");
    }

    #[test]
    fn test_normalization() {
        let wei = parse_units("1.23456789", 18).unwrap();
        let wire = to_normalized(wei, 18);
        assert_eq!(wire, U256::from(123_456_789u64));
        assert_eq!(from_normalized(wire, 18).unwrap(), wei);

        // Six-decimal tokens travel unscaled.
        assert_eq!(to_normalized(U256::from(1_500_000u64), 6), U256::from(1_500_000u64));
        assert_eq!(
            from_normalized(U256::from(1_500_000u64), 6).unwrap(),
            U256::from(1_500_000u64)
        );
    }
}
