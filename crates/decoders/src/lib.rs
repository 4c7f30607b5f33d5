//! Decoders for the loosely-shaped records served by the signals API.
//!
//! The server is duck-typed JSON; these decoders are the explicit boundary
//! that turns a raw record into a typed entity or a tagged failure. Required
//! fields are validated before an entity is constructed; optional metrics
//! default to 0.

pub mod signal;
pub mod tick;

#[cfg(test)]
mod decoder_tests;

use serde_json::Value;
use thiserror::Error;

/// Reason a raw record could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no usable symbol field")]
    MissingSymbol,
}

/// Field names the server may use for the token symbol, in priority order.
const SYMBOL_FIELDS: &[&str] = &["symbol", "ticker", "token", "Token Mentioned"];

/// Resolve and normalize the token symbol from a raw record.
/// Returns `None` when every candidate field is absent or empty.
pub(crate) fn resolve_symbol(record: &Value) -> Option<String> {
    for field in SYMBOL_FIELDS {
        if let Some(raw) = record.get(*field) {
            let symbol = match raw {
                Value::String(s) => s.trim().to_uppercase(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if !symbol.is_empty() {
                return Some(symbol);
            }
        }
    }
    None
}

/// Coerce a JSON value into a number the way the server's consumers do:
/// JSON numbers pass through, numeric strings are parsed, everything else
/// is treated as absent.
pub(crate) fn coerce_num(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce with the 0 default applied to missing metrics.
pub(crate) fn num_or_zero(value: Option<&Value>) -> f64 {
    coerce_num(value).unwrap_or(0.0)
}
