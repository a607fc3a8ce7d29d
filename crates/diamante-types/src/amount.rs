//! Amount parsing for transfer requests.
//!
//! The transfer endpoint expects a JSON number, so user-entered text is
//! coerced locally. Anything that is not a finite, non-negative decimal is
//! rejected before a request is made.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a number: {0:?}")]
    NotANumber(String),

    #[error("amount must be finite and non-negative: {0:?}")]
    OutOfRange(String),
}

/// Parse user-entered amount text into a number.
///
/// Surrounding whitespace is ignored. Exponent notation (`1e3`) is accepted.
pub fn parse_amount(text: &str) -> Result<f64, AmountError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| AmountError::NotANumber(text.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(AmountError::OutOfRange(text.to_string()));
    }
    Ok(value)
}

/// Render a parsed amount as a JSON number, using an integer when the value
/// has no fractional part.
pub fn amount_to_json(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value <= i64::MAX as f64 {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}
