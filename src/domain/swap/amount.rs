//! Conversion between human-readable amounts and integer base units.
//!
//! Input is checked strictly before it reaches `parse_units`, which would otherwise
//! truncate extra fractional digits and accept signed values.

use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};

use crate::{constants::MAX_TOKEN_DECIMALS, models::AmountError};

fn invalid(amount: &str, reason: &str) -> AmountError {
    AmountError::InvalidAmount(amount.to_string(), reason.to_string())
}

/// Checks plain unsigned decimal notation and returns the trimmed amount.
fn check_notation(amount: &str, max_fraction_digits: u8) -> Result<&str, AmountError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(invalid(amount, "empty amount"));
    }
    if trimmed.starts_with('-') {
        return Err(invalid(amount, "negative amounts are not allowed"));
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid(amount, "no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid(amount, "not a decimal number"));
    }
    if fraction.len() > usize::from(max_fraction_digits) {
        return Err(invalid(
            amount,
            &format!("more than {max_fraction_digits} fractional digits"),
        ));
    }
    Ok(trimmed)
}

/// Validates the notation of an amount whose token decimals are not known yet.
pub fn validate_amount(amount: &str) -> Result<(), AmountError> {
    check_notation(amount, MAX_TOKEN_DECIMALS).map(|_| ())
}

/// Converts a human amount such as `"0.0032"` into base units (`amount * 10^decimals`).
///
/// Only plain unsigned decimal notation is accepted. Fractions longer than `decimals`
/// are rejected rather than truncated.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }
    let checked = check_notation(amount, decimals)?;

    parse_units(checked, decimals)
        .map(|units| units.get_absolute())
        .map_err(|_| AmountError::Overflow(amount.to_string()))
}

/// Formats base units for display. Trailing fractional zeros are dropped and whole
/// numbers print without a decimal point.
pub fn to_human(base_units: U256, decimals: u8) -> String {
    match format_units(base_units, decimals) {
        Ok(formatted) if formatted.contains('.') => formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string(),
        Ok(formatted) => formatted,
        Err(_) => base_units.to_string(),
    }
}
