//! TTL-gated signal cache.
//!
//! Holds the last fetched signal list and serves reads from memory while the
//! entry is younger than the TTL; a stale or missing entry triggers a
//! refetch. Read failures degrade to empty results — callers never see a
//! transport error.
//!
//! Overlapping refetches are resolved last-requested-wins: every refetch
//! takes a generation number and only installs its result if no newer
//! request has installed first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use scout_common::types::{Direction, TokenDetail, TokenSignal, TokenSignalTick};

use crate::source::SignalSource;

/// How long a fetched signal list stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Default)]
struct CacheState {
    signals: Option<Vec<TokenSignal>>,
    fetched_at: Option<Instant>,
    installed_generation: u64,
}

/// In-memory signal cache over a `SignalSource`.
pub struct SignalCache<S> {
    source: S,
    ttl: Duration,
    next_generation: AtomicU64,
    state: RwLock<CacheState>,
}

impl<S: SignalSource> SignalCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            next_generation: AtomicU64::new(0),
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Top signals in the requested direction: gainers keep positive
    /// momentum sorted descending, losers keep negative momentum sorted
    /// ascending (most negative first). When the filter leaves nothing, the
    /// unfiltered cached list is returned instead. At most `limit` entries.
    pub async fn top_signals(&self, direction: Direction, limit: usize) -> Vec<TokenSignal> {
        let Some(source) = self.fresh_or_refetched().await else {
            return Vec::new();
        };

        let mut ranked: Vec<TokenSignal> = source
            .iter()
            .filter(|s| match direction {
                Direction::Gainers => s.momentum_6h > 0.0,
                Direction::Losers => s.momentum_6h < 0.0,
            })
            .cloned()
            .collect();

        ranked.sort_by(|a, b| {
            let ordering = match direction {
                Direction::Gainers => b.momentum_6h.partial_cmp(&a.momentum_6h),
                Direction::Losers => a.momentum_6h.partial_cmp(&b.momentum_6h),
            };
            ordering.unwrap_or(std::cmp::Ordering::Equal)
        });

        if ranked.is_empty() {
            ranked = source;
        }
        ranked.truncate(limit);
        ranked
    }

    /// Detail view for one token. Prefers a fresh cache hit; otherwise
    /// refetches and searches the refreshed list. An absent symbol yields
    /// `None`, never an error.
    pub async fn token_detail(&self, symbol: &str) -> Option<TokenDetail> {
        let upper = symbol.trim().to_uppercase();

        if let Some(signals) = self.fresh_signals().await
            && let Some(signal) = signals.iter().find(|s| s.symbol == upper)
        {
            tracing::debug!(symbol = %upper, "Token detail served from cache");
            return Some(TokenDetail::from_signal(signal));
        }

        let refreshed = self.refresh().await?;
        match refreshed.iter().find(|s| s.symbol == upper) {
            Some(signal) => Some(TokenDetail::from_signal(signal)),
            None => {
                tracing::warn!(symbol = %upper, "Token not found in refreshed signals");
                None
            }
        }
    }

    /// One token's 6h history, uncached. Fetch failure yields an empty list.
    pub async fn token_ticks(&self, symbol: &str) -> Vec<TokenSignalTick> {
        match self.source.fetch_ticks(symbol).await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::error!(symbol, error = %e, "Failed to load token history");
                Vec::new()
            }
        }
    }

    /// Signals for the watched symbols, sorted by absolute momentum
    /// descending.
    pub async fn watchlist_signals(&self, symbols: &[String]) -> Vec<TokenSignal> {
        if symbols.is_empty() {
            return Vec::new();
        }
        let Some(source) = self.fresh_or_refetched().await else {
            return Vec::new();
        };

        let mut watched: Vec<TokenSignal> = source
            .iter()
            .filter(|s| symbols.iter().any(|w| *w == s.symbol))
            .cloned()
            .collect();
        watched.sort_by(|a, b| {
            b.momentum_6h
                .abs()
                .partial_cmp(&a.momentum_6h.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        watched
    }

    /// The cached list while fresh, else `None`.
    async fn fresh_signals(&self) -> Option<Vec<TokenSignal>> {
        let state = self.state.read().await;
        if let (Some(signals), Some(fetched_at)) = (&state.signals, state.fetched_at)
            && fetched_at.elapsed() < self.ttl
        {
            return Some(signals.clone());
        }
        None
    }

    async fn fresh_or_refetched(&self) -> Option<Vec<TokenSignal>> {
        match self.fresh_signals().await {
            Some(signals) => Some(signals),
            None => self.refresh().await,
        }
    }

    /// Fetch from the source and install the result unless a newer request
    /// has installed first. Returns whatever list ends up current, or `None`
    /// on fetch failure.
    async fn refresh(&self) -> Option<Vec<TokenSignal>> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "Fetching fresh signals from server");

        match self.source.fetch_signals().await {
            Ok(signals) => {
                let mut state = self.state.write().await;
                if generation > state.installed_generation {
                    state.installed_generation = generation;
                    state.fetched_at = Some(Instant::now());
                    state.signals = Some(signals.clone());
                    tracing::debug!(count = signals.len(), "Cached fresh signals");
                    Some(signals)
                } else {
                    // A newer request already installed; serve its result.
                    tracing::debug!(
                        generation,
                        installed = state.installed_generation,
                        "Discarded stale fetch result"
                    );
                    state.signals.clone()
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load signals from server");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use chrono::Utc;

    use scout_common::error::AppError;
    use scout_common::types::TokenCategory;

    struct FakeSource {
        signals: Vec<TokenSignal>,
        ticks: Vec<TokenSignalTick>,
        fail: bool,
        fetches: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new(signals: Vec<TokenSignal>) -> (Self, Arc<AtomicUsize>) {
            let fetches = Arc::new(AtomicUsize::new(0));
            let source = Self {
                signals,
                ticks: Vec::new(),
                fail: false,
                fetches: fetches.clone(),
            };
            (source, fetches)
        }

        fn failing() -> Self {
            Self {
                signals: Vec::new(),
                ticks: Vec::new(),
                fail: true,
                fetches: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl SignalSource for FakeSource {
        async fn fetch_signals(&self) -> Result<Vec<TokenSignal>, AppError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Decode("fake source failure".to_string()));
            }
            Ok(self.signals.clone())
        }

        async fn fetch_ticks(&self, _symbol: &str) -> Result<Vec<TokenSignalTick>, AppError> {
            if self.fail {
                return Err(AppError::Decode("fake source failure".to_string()));
            }
            Ok(self.ticks.clone())
        }
    }

    fn make_signal(symbol: &str, momentum: f64) -> TokenSignal {
        TokenSignal {
            symbol: symbol.to_string(),
            category: TokenCategory::MajorCoin,
            momentum_6h: momentum,
            liquidity_6h: 0.0,
            buzz_6h: 0.0,
            rank_improvement_6h: 0.0,
            galaxy_change_6h: 0.0,
            sentiment_6h: 0.0,
            realized_return_6h: 0.0,
            contributors_6h: 0.0,
            captured_at: Utc::now(),
        }
    }

    fn mixed_market() -> Vec<TokenSignal> {
        vec![
            make_signal("BTC", 5.0),
            make_signal("ETH", -3.0),
            make_signal("SOL", 10.0),
            make_signal("DOGE", -8.0),
            make_signal("PEPE", 1.5),
        ]
    }

    #[tokio::test]
    async fn test_gainers_positive_sorted_descending() {
        let (source, _) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        let top = cache.top_signals(Direction::Gainers, 10).await;
        let symbols: Vec<&str> = top.iter().map(|s| s.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["SOL", "BTC", "PEPE"]);
        assert!(top.iter().all(|s| s.momentum_6h > 0.0));
    }

    #[tokio::test]
    async fn test_losers_negative_sorted_ascending() {
        let (source, _) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        let top = cache.top_signals(Direction::Losers, 10).await;
        let symbols: Vec<&str> = top.iter().map(|s| s.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["DOGE", "ETH"]);
        assert!(top.iter().all(|s| s.momentum_6h < 0.0));
    }

    #[tokio::test]
    async fn test_limit_truncates() {
        let (source, _) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        let top = cache.top_signals(Direction::Gainers, 2).await;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].symbol, "SOL");
    }

    #[tokio::test]
    async fn test_empty_filter_falls_back_to_unfiltered() {
        let all_positive = vec![make_signal("BTC", 5.0), make_signal("ETH", 2.0)];
        let (source, _) = FakeSource::new(all_positive);
        let cache = SignalCache::new(source);

        let top = cache.top_signals(Direction::Losers, 10).await;
        assert_eq!(top.len(), 2);
    }

    #[tokio::test]
    async fn test_single_fetch_within_ttl() {
        let (source, fetches) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        cache.top_signals(Direction::Gainers, 10).await;
        cache.top_signals(Direction::Losers, 10).await;
        cache.top_signals(Direction::Gainers, 3).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_ttl_refetches() {
        let (source, fetches) = FakeSource::new(mixed_market());
        let cache = SignalCache::with_ttl(source, Duration::ZERO);

        cache.top_signals(Direction::Gainers, 10).await;
        cache.top_signals(Direction::Gainers, 10).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_empty() {
        let cache = SignalCache::new(FakeSource::failing());
        assert!(cache.top_signals(Direction::Gainers, 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_token_detail_from_fresh_cache() {
        let (source, fetches) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        cache.top_signals(Direction::Gainers, 10).await;
        let detail = cache.token_detail("sol").await.unwrap();

        assert_eq!(detail.signal.symbol, "SOL");
        assert!(detail.description.contains("positive momentum"));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_detail_refetches_when_cold() {
        let (source, fetches) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        let detail = cache.token_detail("DOGE").await.unwrap();
        assert_eq!(detail.signal.symbol, "DOGE");
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_detail_unknown_symbol_is_none() {
        let (source, _) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        assert!(cache.token_detail("NOPE").await.is_none());
    }

    #[tokio::test]
    async fn test_token_ticks_failure_yields_empty() {
        let cache = SignalCache::new(FakeSource::failing());
        assert!(cache.token_ticks("BTC").await.is_empty());
    }

    #[tokio::test]
    async fn test_watchlist_sorted_by_absolute_momentum() {
        let (source, _) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        let watched = vec!["BTC".to_string(), "DOGE".to_string(), "PEPE".to_string()];
        let signals = cache.watchlist_signals(&watched).await;
        let symbols: Vec<&str> = signals.iter().map(|s| s.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["DOGE", "BTC", "PEPE"]);
    }

    #[tokio::test]
    async fn test_watchlist_empty_without_symbols() {
        let (source, fetches) = FakeSource::new(mixed_market());
        let cache = SignalCache::new(source);

        assert!(cache.watchlist_signals(&[]).await.is_empty());
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }
}
