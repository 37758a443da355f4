// src/common/validation.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::common::bookkeeping::{round_money, round_quantity};

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Value must be greater than zero.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

/// Quantities are stored with three decimals; the rounded value must be non-zero.
pub fn validate_nonzero_quantity(val: &Decimal) -> Result<(), ValidationError> {
    if round_quantity(*val).is_zero() {
        let mut err = ValidationError::new("non_zero");
        err.message = Some("Quantity must not round to zero.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive_quantity(val: &Decimal) -> Result<(), ValidationError> {
    if round_quantity(*val) <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.001);
        err.message = Some("Quantity must be at least 0.001.".into());
        return Err(err);
    }
    Ok(())
}

/// Amounts are stored in paise; the rounded value must be positive.
pub fn validate_positive_amount(val: &Decimal) -> Result<(), ValidationError> {
    if round_money(*val) <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.01);
        err.message = Some("Amount must be at least 0.01.".into());
        return Err(err);
    }
    Ok(())
}

/// GST rates in use: 0, 0.25, 3, 5, 12, 18 and 28 percent.
pub fn validate_gst_rate(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::from(28) {
        let mut err = ValidationError::new("range");
        err.message = Some("GST rate must be between 0 and 28 percent.".into());
        return Err(err);
    }
    Ok(())
}

/// Trims optional text; blank input counts as absent.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn positive_rejects_zero_and_negatives() {
        assert!(validate_positive(&d("0.001")).is_ok());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&d("-1")).is_err());
    }

    #[test]
    fn not_negative_accepts_zero() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&d("-0.01")).is_err());
    }

    #[test]
    fn quantities_are_judged_after_rounding() {
        assert!(validate_positive_quantity(&d("0.001")).is_ok());
        assert!(validate_positive_quantity(&d("0.0004")).is_err());
        assert!(validate_nonzero_quantity(&d("-0.0004")).is_err());
        assert!(validate_nonzero_quantity(&d("-0.0005")).is_ok());
    }

    #[test]
    fn amounts_are_judged_after_rounding() {
        assert!(validate_positive_amount(&d("0.005")).is_ok());
        assert!(validate_positive_amount(&d("0.004")).is_err());
    }

    #[test]
    fn gst_rate_bounds() {
        assert!(validate_gst_rate(&d("18")).is_ok());
        assert!(validate_gst_rate(&d("0")).is_ok());
        assert!(validate_gst_rate(&d("28.01")).is_err());
        assert!(validate_gst_rate(&d("-5")).is_err());
    }
}
