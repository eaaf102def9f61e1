use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Num;

use crate::BASE_UNITS_PER_COIN;
use crate::error::{ConsensusError, Result};

/// Decimal places of one coin
pub const UNIT_DECIMALS: i64 = 18;

/// Parse a big integer given in decimal or as `0x`-prefixed hex. The empty
/// string is zero. Values wider than 256 bits are rejected.
pub fn parse_big256(s: &str) -> Result<BigUint> {
    let invalid = || ConsensusError::InvalidNumber(s.to_owned());
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(BigUint::default());
    }

    let value = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(digits) => BigUint::from_str_radix(digits, 16),
        None => BigUint::from_str_radix(trimmed, 10),
    }
    .map_err(|_| invalid())?;

    if value.bits() > 256 {
        return Err(invalid());
    }
    Ok(value)
}

/// Same format as [`parse_big256`] but limited to 64 bits.
pub fn parse_uint64(s: &str) -> Result<u64> {
    let value = parse_big256(s)?;
    u64::try_from(&value).map_err(|_| ConsensusError::InvalidNumber(s.to_owned()))
}

/// Render an amount of base units as coins, e.g. `60000000000000000` as `0.06`.
pub fn format_units(amount: &BigUint) -> String {
    let digits = BigInt::from_biguint(Sign::Plus, amount.clone());
    BigDecimal::new(digits, UNIT_DECIMALS).normalized().to_string()
}

/// Parse a coin amount such as `0.06` into base units. Amounts finer than one
/// base unit and negative amounts are rejected.
pub fn parse_units(s: &str) -> Result<BigUint> {
    let invalid = || ConsensusError::InvalidNumber(s.to_owned());
    let coins = BigDecimal::from_str(s.trim()).map_err(|_| invalid())?;
    let scaled = coins * BigDecimal::from(BASE_UNITS_PER_COIN);
    if !scaled.is_integer() {
        return Err(invalid());
    }

    let (digits, scale) = scaled.with_scale(0).into_bigint_and_exponent();
    debug_assert_eq!(scale, 0);
    digits.to_biguint().ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_big256("131072").unwrap(), BigUint::from(131_072u32));
        assert_eq!(parse_big256("0x20000").unwrap(), BigUint::from(131_072u32));
        assert_eq!(parse_big256("0X20000").unwrap(), BigUint::from(131_072u32));
        assert_eq!(parse_big256("").unwrap(), BigUint::default());
        assert_eq!(parse_uint64("0xffffffffffffffff").unwrap(), u64::MAX);
    }

    #[test]
    fn rejects_garbage_and_wide_values() {
        assert!(parse_big256("12a").is_err());
        assert!(parse_big256("0x").is_err());
        assert!(parse_big256("-1").is_err());
        let wide = format!("0x1{}", "0".repeat(64));
        assert!(matches!(
            parse_big256(&wide),
            Err(ConsensusError::InvalidNumber(_))
        ));
        assert!(parse_uint64("0x10000000000000000").is_err());
    }

    #[test]
    fn formats_units() {
        assert_eq!(format_units(&BigUint::from(60_000_000_000_000_000u64)), "0.06");
        assert_eq!(format_units(&BigUint::from(125_000_000_000_000_000u64)), "0.125");
        assert_eq!(format_units(&BigUint::from(2 * BASE_UNITS_PER_COIN)), "2");
    }

    #[test]
    fn parses_units_exactly() {
        assert_eq!(
            parse_units("0.06").unwrap(),
            BigUint::from(60_000_000_000_000_000u64)
        );
        assert_eq!(parse_units("2").unwrap(), BigUint::from(2 * BASE_UNITS_PER_COIN));
        assert!(parse_units("0.0000000000000000001").is_err());
        assert!(parse_units("-1").is_err());
        assert!(parse_units("two").is_err());
    }
}
