use chrono::{DateTime, Utc};
use serde_json::Value;

use scout_common::types::{TokenCategory, TokenSignal};

use crate::{DecodeError, num_or_zero, resolve_symbol};

/// Decode one record of the `/lunarcrush` list into a `TokenSignal`.
///
/// The server wraps computed metrics under a nested `metrics` object;
/// `pred_next6h_pct` lives at the top level. Field mapping:
///
/// - `metrics.r_last6h_pct`     → momentum
/// - `metrics.d_pct_mktvol_6h`  → liquidity
/// - `metrics.d_pct_socvol_6h`  → buzz
/// - `metrics.neg_d_altrank_6h` → rank improvement
/// - `metrics.d_galaxy_6h`      → galaxy change
/// - `metrics.d_pct_sent_6h`    → sentiment
/// - `metrics.d_pct_users_6h`   → contributors
/// - `pred_next6h_pct`          → realized return
pub fn decode_signal(record: &Value, captured_at: DateTime<Utc>) -> Result<TokenSignal, DecodeError> {
    if !record.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    let symbol = resolve_symbol(record).ok_or(DecodeError::MissingSymbol)?;
    let category = decode_category(record);

    let metrics = record.get("metrics").cloned().unwrap_or(Value::Null);

    Ok(TokenSignal {
        symbol,
        category,
        momentum_6h: num_or_zero(metrics.get("r_last6h_pct")),
        liquidity_6h: num_or_zero(metrics.get("d_pct_mktvol_6h")),
        buzz_6h: num_or_zero(metrics.get("d_pct_socvol_6h")),
        rank_improvement_6h: num_or_zero(metrics.get("neg_d_altrank_6h")),
        galaxy_change_6h: num_or_zero(metrics.get("d_galaxy_6h")),
        sentiment_6h: num_or_zero(metrics.get("d_pct_sent_6h")),
        realized_return_6h: num_or_zero(record.get("pred_next6h_pct")),
        contributors_6h: num_or_zero(metrics.get("d_pct_users_6h")),
        captured_at,
    })
}

/// Decode a full `/lunarcrush` payload. Records that fail to decode are
/// skipped and logged; order of the survivors is preserved. A payload that
/// is not an array decodes to an empty list.
pub fn decode_signal_batch(payload: &Value, captured_at: DateTime<Utc>) -> Vec<TokenSignal> {
    let Some(records) = payload.as_array() else {
        tracing::warn!("Signals payload is not an array");
        return Vec::new();
    };

    let mut signals = Vec::with_capacity(records.len());
    for record in records {
        match decode_signal(record, captured_at) {
            Ok(signal) => signals.push(signal),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable signal record");
            }
        }
    }
    signals
}

/// `memecoin` only on an exact match; anything else is a major coin.
pub(crate) fn decode_category(record: &Value) -> TokenCategory {
    match record.get("type").and_then(Value::as_str) {
        Some("memecoin") => TokenCategory::Memecoin,
        _ => TokenCategory::MajorCoin,
    }
}
