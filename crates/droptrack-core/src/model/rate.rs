//! Drop-rate denominators: the allowed set and text parsing.

use crate::error::ValidationError;

/// Denominators accepted by the rate-change operation.
///
/// Imported and migrated records only need a positive denominator, so
/// historical data outside this set still loads.
pub const ALLOWED_DENOMINATORS: [u32; 7] = [8, 16, 32, 64, 128, 256, 4096];

#[must_use]
pub fn is_allowed_denominator(denom: u32) -> bool {
    ALLOWED_DENOMINATORS.contains(&denom)
}

/// Parse `"64"` or `"1/64"` (whitespace allowed around the slash).
///
/// A numerator other than 1, a zero denominator, or any other shape is
/// rejected.
pub fn parse_denominator_text(text: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidRateText {
        input: text.to_string(),
    };
    let trimmed = text.trim();

    let denom_text = match trimmed.split_once('/') {
        Some((numerator, denom)) => {
            if parse_digits(numerator.trim()) != Some(1) {
                return Err(invalid());
            }
            denom.trim()
        }
        None => trimmed,
    };

    match parse_digits(denom_text) {
        Some(denom) if denom > 0 => Ok(denom),
        _ => Err(invalid()),
    }
}

/// Digits only: rejects signs, decimals, and exponents that `str::parse`
/// would otherwise accept or round.
fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Render a denominator as `1/N`; an unset (0) denominator renders as `-`.
#[must_use]
pub fn format_rate(denom: u32) -> String {
    if denom == 0 {
        "-".to_string()
    } else {
        format!("1/{denom}")
    }
}
