//! Threshold and alert evaluation.
//!
//! All functions here are pure: they take signal data and a threshold and
//! produce breach verdicts, a bounded alerts log, or a rendered payload.
//! Fetching the ticks belongs to the feed; delivery belongs to the caller.

use scout_common::types::{
    AlertPayload, DriverContribution, Severity, TokenSignal, TokenSignalTick,
};

/// Maximum number of entries in an alerts log.
pub const ALERTS_LOG_WINDOW: usize = 4;

/// A tick breaches when its momentum magnitude meets or exceeds the
/// threshold magnitude.
pub fn check_threshold_breach(tick: &TokenSignalTick, threshold: f64) -> bool {
    tick.momentum_6h.abs() >= threshold.abs()
}

/// Filter a token's history down to breaching ticks, mark them, and keep at
/// most the last `ALERTS_LOG_WINDOW` in original chronological order.
pub fn alerts_log(ticks: &[TokenSignalTick], threshold: f64) -> Vec<TokenSignalTick> {
    let mut breached: Vec<TokenSignalTick> = ticks
        .iter()
        .filter(|tick| check_threshold_breach(tick, threshold))
        .cloned()
        .map(|mut tick| {
            tick.threshold_breached = true;
            tick
        })
        .collect();

    let start = breached.len().saturating_sub(ALERTS_LOG_WINDOW);
    breached.split_off(start)
}

/// The top 3 secondary metrics by absolute value — what is driving the
/// signal right now.
pub fn top_driver_contributions(signal: &TokenSignal) -> Vec<DriverContribution> {
    let mut drivers = vec![
        driver("Social Volume", signal.buzz_6h, "Social volume change"),
        driver("Market Volume", signal.liquidity_6h, "Market volume change"),
        driver(
            "AltRank Change",
            signal.rank_improvement_6h,
            "AltRank change (negated)",
        ),
        driver("Sentiment Change", signal.sentiment_6h, "Sentiment change"),
        driver(
            "Galaxy Change",
            signal.galaxy_change_6h,
            "Galaxy composite change",
        ),
        driver(
            "Realized Return",
            signal.realized_return_6h,
            "Realized return last 6h",
        ),
    ];

    drivers.sort_by(|a, b| {
        b.value
            .abs()
            .partial_cmp(&a.value.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    drivers.truncate(3);
    drivers
}

/// Render a breaching tick into a human-readable alert.
///
/// Severity: a breach is a warning; momentum at twice the threshold or more
/// is critical.
pub fn breach_payload(tick: &TokenSignalTick, threshold: f64) -> AlertPayload {
    let severity = if tick.momentum_6h.abs() >= threshold.abs() * 2.0 {
        Severity::Critical
    } else {
        Severity::Warning
    };

    AlertPayload {
        title: format!("Threshold breach: {}", tick.symbol),
        body: format!(
            "{} momentum {:+.2}% crossed the {:.1}% alert threshold at {}",
            tick.symbol,
            tick.momentum_6h,
            threshold.abs(),
            tick.timestamp.format("%Y-%m-%d %H:%M UTC"),
        ),
        severity,
    }
}

fn driver(name: &str, value: f64, description: &str) -> DriverContribution {
    DriverContribution {
        name: name.to_string(),
        value,
        description: description.to_string(),
    }
}
