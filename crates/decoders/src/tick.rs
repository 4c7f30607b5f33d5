use chrono::{TimeZone, Utc};
use serde_json::Value;

use scout_common::types::TokenSignalTick;

use crate::{DecodeError, coerce_num, num_or_zero, resolve_symbol};

/// Decode one record of the `/signals/6h` history into a `TokenSignalTick`.
///
/// Same field mapping as the list decoder, plus the `time` field (unix
/// milliseconds) for the tick timestamp. A record without a usable `time`
/// falls back to the decode time. `threshold_breached` always starts false;
/// alert evaluation owns that marker.
pub fn decode_tick(record: &Value) -> Result<TokenSignalTick, DecodeError> {
    if !record.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    let symbol = resolve_symbol(record).ok_or(DecodeError::MissingSymbol)?;

    let metrics = record.get("metrics").cloned().unwrap_or(Value::Null);

    let timestamp = coerce_num(record.get("time"))
        .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single())
        .unwrap_or_else(Utc::now);

    Ok(TokenSignalTick {
        symbol,
        timestamp,
        momentum_6h: num_or_zero(metrics.get("r_last6h_pct")),
        liquidity_6h: num_or_zero(metrics.get("d_pct_mktvol_6h")),
        buzz_6h: num_or_zero(metrics.get("d_pct_socvol_6h")),
        rank_improvement_6h: num_or_zero(metrics.get("neg_d_altrank_6h")),
        galaxy_change_6h: num_or_zero(metrics.get("d_galaxy_6h")),
        sentiment_6h: num_or_zero(metrics.get("d_pct_sent_6h")),
        realized_return_6h: num_or_zero(record.get("pred_next6h_pct")),
        contributors_6h: num_or_zero(metrics.get("d_pct_users_6h")),
        threshold_breached: false,
    })
}

/// Decode a full `/signals/6h` payload, skipping undecodable records.
pub fn decode_tick_batch(payload: &Value) -> Vec<TokenSignalTick> {
    let Some(records) = payload.as_array() else {
        tracing::warn!("Tick payload is not an array");
        return Vec::new();
    };

    let mut ticks = Vec::with_capacity(records.len());
    for record in records {
        match decode_tick(record) {
            Ok(tick) => ticks.push(tick),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable tick record");
            }
        }
    }
    ticks
}
