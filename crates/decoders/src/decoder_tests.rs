//! Tests for the signal and tick decoders.
//!
//! Payloads are built with `serde_json::json!` matching the shapes the
//! signals API actually serves: a nested `metrics` object, a top-level
//! `pred_next6h_pct`, and symbol under any of several field names.

use chrono::{TimeZone, Utc};
use serde_json::json;

use scout_common::types::TokenCategory;

use crate::DecodeError;
use crate::signal::{decode_signal, decode_signal_batch};
use crate::tick::{decode_tick, decode_tick_batch};

fn now() -> chrono::DateTime<Utc> {
    Utc::now()
}

// ───────────────────────────── signals ──────────────────────────────

#[test]
fn test_full_record_maps_every_metric() {
    let record = json!({
        "symbol": "btc",
        "type": "major coin",
        "pred_next6h_pct": 1.5,
        "metrics": {
            "r_last6h_pct": 4.2,
            "d_pct_mktvol_6h": 12.0,
            "d_pct_socvol_6h": -3.5,
            "d_pct_sent_6h": 0.8,
            "neg_d_altrank_6h": 2.0,
            "d_galaxy_6h": -1.0,
            "d_pct_users_6h": 5.5,
        },
    });

    let captured_at = now();
    let signal = decode_signal(&record, captured_at).unwrap();

    assert_eq!(signal.symbol, "BTC");
    assert_eq!(signal.category, TokenCategory::MajorCoin);
    assert_eq!(signal.momentum_6h, 4.2);
    assert_eq!(signal.liquidity_6h, 12.0);
    assert_eq!(signal.buzz_6h, -3.5);
    assert_eq!(signal.sentiment_6h, 0.8);
    assert_eq!(signal.rank_improvement_6h, 2.0);
    assert_eq!(signal.galaxy_change_6h, -1.0);
    assert_eq!(signal.realized_return_6h, 1.5);
    assert_eq!(signal.contributors_6h, 5.5);
    assert_eq!(signal.captured_at, captured_at);
}

#[test]
fn test_symbol_fallback_fields() {
    let from_ticker = json!({"ticker": "eth", "metrics": {}});
    let from_token = json!({"token": "sol", "metrics": {}});

    assert_eq!(decode_signal(&from_ticker, now()).unwrap().symbol, "ETH");
    assert_eq!(decode_signal(&from_token, now()).unwrap().symbol, "SOL");
}

#[test]
fn test_missing_symbol_is_rejected() {
    let record = json!({"type": "memecoin", "metrics": {"r_last6h_pct": 9.0}});
    assert_eq!(
        decode_signal(&record, now()).unwrap_err(),
        DecodeError::MissingSymbol
    );

    let empty_symbol = json!({"symbol": "  ", "metrics": {}});
    assert_eq!(
        decode_signal(&empty_symbol, now()).unwrap_err(),
        DecodeError::MissingSymbol
    );
}

#[test]
fn test_non_object_is_rejected() {
    assert_eq!(
        decode_signal(&json!("BTC"), now()).unwrap_err(),
        DecodeError::NotAnObject
    );
    assert_eq!(
        decode_signal(&json!(null), now()).unwrap_err(),
        DecodeError::NotAnObject
    );
}

#[test]
fn test_memecoin_category_requires_exact_match() {
    let meme = json!({"symbol": "PEPE", "type": "memecoin"});
    let odd = json!({"symbol": "DOGE", "type": "Memecoin"});
    let absent = json!({"symbol": "BTC"});

    assert_eq!(
        decode_signal(&meme, now()).unwrap().category,
        TokenCategory::Memecoin
    );
    assert_eq!(
        decode_signal(&odd, now()).unwrap().category,
        TokenCategory::MajorCoin
    );
    assert_eq!(
        decode_signal(&absent, now()).unwrap().category,
        TokenCategory::MajorCoin
    );
}

#[test]
fn test_numeric_strings_are_coerced() {
    let record = json!({
        "symbol": "BTC",
        "pred_next6h_pct": "2.25",
        "metrics": {"r_last6h_pct": "-7.5"},
    });

    let signal = decode_signal(&record, now()).unwrap();
    assert_eq!(signal.momentum_6h, -7.5);
    assert_eq!(signal.realized_return_6h, 2.25);
}

#[test]
fn test_missing_metrics_default_to_zero() {
    let record = json!({"symbol": "BTC"});
    let signal = decode_signal(&record, now()).unwrap();

    assert_eq!(signal.momentum_6h, 0.0);
    assert_eq!(signal.liquidity_6h, 0.0);
    assert_eq!(signal.buzz_6h, 0.0);
    assert_eq!(signal.contributors_6h, 0.0);
}

#[test]
fn test_unparseable_metric_defaults_to_zero() {
    let record = json!({
        "symbol": "BTC",
        "metrics": {"r_last6h_pct": "n/a", "d_pct_socvol_6h": {"nested": true}},
    });

    let signal = decode_signal(&record, now()).unwrap();
    assert_eq!(signal.momentum_6h, 0.0);
    assert_eq!(signal.buzz_6h, 0.0);
}

#[test]
fn test_batch_skips_invalid_and_preserves_order() {
    let payload = json!([
        {"symbol": "BTC", "metrics": {"r_last6h_pct": 1.0}},
        {"type": "memecoin"},
        "garbage",
        {"ticker": "ETH", "metrics": {"r_last6h_pct": 2.0}},
    ]);

    let signals = decode_signal_batch(&payload, now());
    let symbols: Vec<&str> = signals.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "ETH"]);
}

#[test]
fn test_batch_non_array_is_empty() {
    assert!(decode_signal_batch(&json!({"error": "rate limited"}), now()).is_empty());
}

// ─────────────────────────────── ticks ──────────────────────────────

#[test]
fn test_tick_time_is_unix_millis() {
    let record = json!({
        "symbol": "BTC",
        "time": 1_700_000_000_000i64,
        "metrics": {"r_last6h_pct": 6.0},
    });

    let tick = decode_tick(&record).unwrap();
    assert_eq!(
        tick.timestamp,
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    );
    assert_eq!(tick.momentum_6h, 6.0);
    assert!(!tick.threshold_breached);
}

#[test]
fn test_tick_missing_time_falls_back_to_decode_time() {
    let before = Utc::now();
    let tick = decode_tick(&json!({"symbol": "BTC"})).unwrap();
    let after = Utc::now();

    assert!(tick.timestamp >= before && tick.timestamp <= after);
}

#[test]
fn test_tick_missing_symbol_is_rejected() {
    assert_eq!(
        decode_tick(&json!({"time": 0})).unwrap_err(),
        DecodeError::MissingSymbol
    );
}

#[test]
fn test_tick_batch_decodes_in_order() {
    let payload = json!([
        {"symbol": "BTC", "time": 1000, "metrics": {"r_last6h_pct": 1.0}},
        {"symbol": "BTC", "time": 2000, "metrics": {"r_last6h_pct": -2.0}},
        {"no_symbol": true},
    ]);

    let ticks = decode_tick_batch(&payload);
    assert_eq!(ticks.len(), 2);
    assert!(ticks[0].timestamp < ticks[1].timestamp);
}
