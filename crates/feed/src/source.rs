//! Remote signal source.
//!
//! `SignalSource` is the seam between the cache and the network; the HTTP
//! implementation talks to the signals API, tests substitute an in-memory
//! fake.

use chrono::Utc;
use reqwest::header::ACCEPT;
use serde_json::Value;

use scout_common::error::AppError;
use scout_common::types::{TokenSignal, TokenSignalTick};
use scout_decoders::signal::decode_signal_batch;
use scout_decoders::tick::decode_tick_batch;

/// Abstraction over the remote signals endpoints.
pub trait SignalSource {
    /// Fetch and decode the full signal list (`/lunarcrush`).
    async fn fetch_signals(&self) -> Result<Vec<TokenSignal>, AppError>;

    /// Fetch and decode one token's 6h history (`/signals/6h?token=...`).
    async fn fetch_ticks(&self, symbol: &str) -> Result<Vec<TokenSignalTick>, AppError>;
}

/// HTTP implementation of `SignalSource`.
pub struct HttpSignalSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSignalSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl SignalSource for HttpSignalSource {
    async fn fetch_signals(&self) -> Result<Vec<TokenSignal>, AppError> {
        let payload = self.get_json("/lunarcrush", &[]).await?;
        Ok(decode_signal_batch(&payload, Utc::now()))
    }

    async fn fetch_ticks(&self, symbol: &str) -> Result<Vec<TokenSignalTick>, AppError> {
        let payload = self.get_json("/signals/6h", &[("token", symbol)]).await?;
        Ok(decode_tick_batch(&payload))
    }
}
