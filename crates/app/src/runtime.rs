//! Application runtime.
//!
//! The composition root: every service is constructed here from config and
//! injected explicitly — cache, watchlist, subscription store, and the
//! optional chain client all live exactly as long as the runtime. The watch
//! loop periodically refreshes signals, evaluates every subscription's
//! alerts log, and reports contract counter state.

use std::time::Duration;

use alloy::primitives::{Address, B256};
use alloy::providers::DynProvider;

use scout_chain::contract::CounterStatus;
use scout_chain::{ScoutContract, connect, connect_with_signer, signer_address};
use scout_common::config::AppConfig;
use scout_common::store::LocalStore;
use scout_common::types::{
    Direction, DriverContribution, TokenDetail, TokenSignal, TokenSignalTick, TokenSubscription,
};
use scout_engine::alerts::{alerts_log, breach_payload, top_driver_contributions};
use scout_engine::subscription::{SCOUT_NFT_MIN_SUBSCRIPTIONS, SubscriptionStore};
use scout_feed::cache::SignalCache;
use scout_feed::source::{HttpSignalSource, SignalSource};
use scout_feed::watchlist::Watchlist;

/// How many leaders the watch loop logs per cycle.
const WATCH_LEADER_COUNT: usize = 5;

/// The assembled application: signal feed, local state, optional chain.
pub struct ScoutRuntime<S> {
    fid: Option<u64>,
    poll_interval: Duration,
    cache: SignalCache<S>,
    watchlist: Watchlist,
    subscriptions: SubscriptionStore,
    contract: Option<ScoutContract<DynProvider>>,
    wallet_address: Option<Address>,
}

impl ScoutRuntime<HttpSignalSource> {
    /// Build the runtime from environment configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = LocalStore::open(&config.data_dir)?;
        let watchlist = Watchlist::open(store.clone());
        let subscriptions = SubscriptionStore::open(store);

        let source = HttpSignalSource::new(config.signals_base_url.clone());
        let cache = SignalCache::with_ttl(source, Duration::from_secs(config.cache_ttl_secs));

        let mut runtime = Self::new(
            config.fid,
            Duration::from_secs(config.poll_interval_secs),
            cache,
            watchlist,
            subscriptions,
        );

        if let (Some(rpc_url), Some(address)) = (&config.rpc_url, &config.contract_address) {
            let (provider, wallet_address) = match &config.wallet_key {
                Some(key) => (connect_with_signer(rpc_url, key)?, Some(signer_address(key)?)),
                None => (connect(rpc_url)?, None),
            };
            let contract = ScoutContract::from_parts(address, provider)?;
            tracing::info!(
                contract = %contract.address(),
                signer = wallet_address.is_some(),
                "Chain client ready"
            );
            runtime = runtime.with_contract(contract, wallet_address);
        } else {
            tracing::info!("Chain features disabled (RPC URL or contract address not configured)");
        }

        Ok(runtime)
    }
}

impl<S: SignalSource> ScoutRuntime<S> {
    pub fn new(
        fid: Option<u64>,
        poll_interval: Duration,
        cache: SignalCache<S>,
        watchlist: Watchlist,
        subscriptions: SubscriptionStore,
    ) -> Self {
        Self {
            fid,
            poll_interval,
            cache,
            watchlist,
            subscriptions,
            contract: None,
            wallet_address: None,
        }
    }

    /// Attach a chain client. `wallet_address` is the signing identity when
    /// the provider can sign; reads work without it.
    pub fn with_contract(
        mut self,
        contract: ScoutContract<DynProvider>,
        wallet_address: Option<Address>,
    ) -> Self {
        self.contract = Some(contract);
        self.wallet_address = wallet_address;
        self
    }

    /// Run the watch loop until the task is cancelled.
    pub async fn watch(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "Watch loop started"
        );

        loop {
            self.tick().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One watch cycle: leaders, watchlist, subscription alerts, counter.
    async fn tick(&mut self) {
        let gainers = self.cache.top_signals(Direction::Gainers, WATCH_LEADER_COUNT).await;
        for signal in &gainers {
            tracing::info!(
                symbol = %signal.symbol,
                momentum = signal.momentum_6h,
                "Top gainer"
            );
        }

        let watched = self.cache.watchlist_signals(&self.watchlist.symbols()).await;
        for signal in &watched {
            tracing::info!(
                symbol = %signal.symbol,
                momentum = signal.momentum_6h,
                "Watchlist signal"
            );
        }

        if let Some(fid) = self.fid {
            for sub in self.subscriptions.user_subscriptions(fid) {
                let ticks = self.cache.token_ticks(&sub.token).await;
                for tick in alerts_log(&ticks, sub.threshold) {
                    let payload = breach_payload(&tick, sub.threshold);
                    tracing::warn!(
                        severity = %payload.severity,
                        subscription_id = %sub.id,
                        "{}",
                        payload.body
                    );
                }
            }
        }

        if let Some(status) = self.counter_status().await {
            tracing::info!(
                counter = status.counter,
                next_milestone = status.next_milestone,
                at_milestone = status.at_milestone,
                "Contract counter"
            );
            if status.at_milestone && status.has_nft == Some(false) {
                tracing::info!("Counter at milestone — NFT mint available");
            }
        }
    }

    /// Top signals, delegated to the cache.
    pub async fn signals(&self, direction: Direction, limit: usize) -> Vec<TokenSignal> {
        self.cache.top_signals(direction, limit).await
    }

    /// Detail view plus the top signal drivers for one token.
    pub async fn detail(&self, symbol: &str) -> Option<(TokenDetail, Vec<DriverContribution>)> {
        let detail = self.cache.token_detail(symbol).await?;
        let drivers = top_driver_contributions(&detail.signal);
        Some((detail, drivers))
    }

    /// Subscribe to a token: the on-chain record is attempted first when a
    /// signing chain client exists; on-chain failure falls back to a
    /// local-only subscription. The local record is always created.
    pub async fn subscribe(
        &mut self,
        token: &str,
        threshold: f64,
    ) -> anyhow::Result<TokenSubscription> {
        let fid = self.require_fid()?;

        if let (Some(contract), Some(_)) = (&self.contract, self.wallet_address) {
            let upper = token.trim().to_uppercase();
            match contract.subscribe_to_token(fid, &upper, threshold as u64).await {
                Ok(tx_hash) => {
                    tracing::info!(tx = %tx_hash, token = %upper, "Subscription recorded on-chain");
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        token = %upper,
                        "On-chain subscribe failed; falling back to local-only subscription"
                    );
                }
            }
        }

        Ok(self.subscriptions.add_subscription(fid, token, threshold)?)
    }

    /// Remove a subscription by id. Returns whether a removal occurred.
    pub fn unsubscribe(&mut self, id: &str) -> anyhow::Result<bool> {
        let fid = self.require_fid()?;
        Ok(self.subscriptions.remove_subscription(fid, id)?)
    }

    /// The alerts log for a subscribed token, using the subscription's
    /// threshold.
    pub async fn alerts(&self, token: &str) -> anyhow::Result<Vec<TokenSignalTick>> {
        let fid = self.require_fid()?;
        let upper = token.trim().to_uppercase();

        let threshold = self
            .subscriptions
            .user_subscriptions(fid)
            .into_iter()
            .find(|sub| sub.token == upper)
            .map(|sub| sub.threshold)
            .ok_or_else(|| anyhow::anyhow!("No subscription for token {}", upper))?;

        let ticks = self.cache.token_ticks(&upper).await;
        Ok(alerts_log(&ticks, threshold))
    }

    /// Mint the milestone NFT.
    pub async fn mint_milestone(&self) -> anyhow::Result<B256> {
        self.require_signing_contract()?.mint_nft_at_milestone().await
    }

    /// Mint the Signal Scout NFT; gated on holding enough subscriptions.
    pub async fn mint_scout(&self) -> anyhow::Result<B256> {
        let fid = self.require_fid()?;
        let count = self.subscriptions.subscription_count(fid);
        if count < SCOUT_NFT_MIN_SUBSCRIPTIONS {
            anyhow::bail!(
                "Signal Scout NFT requires at least {} active subscriptions (have {})",
                SCOUT_NFT_MIN_SUBSCRIPTIONS,
                count
            );
        }
        self.require_signing_contract()?.mint_signal_scout_nft().await
    }

    /// Contract counter snapshot. Read failures degrade to `None`, logged.
    pub async fn counter_status(&self) -> Option<CounterStatus> {
        let contract = self.contract.as_ref()?;
        match contract.counter_status(self.wallet_address).await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch contract counter status");
                None
            }
        }
    }

    pub fn watchlist_add(&mut self, symbol: &str) -> anyhow::Result<bool> {
        Ok(self.watchlist.add(symbol)?)
    }

    pub fn watchlist_remove(&mut self, symbol: &str) -> anyhow::Result<bool> {
        Ok(self.watchlist.remove(symbol)?)
    }

    pub fn watchlist_symbols(&self) -> Vec<String> {
        self.watchlist.symbols()
    }

    pub async fn watchlist_signals(&self) -> Vec<TokenSignal> {
        self.cache.watchlist_signals(&self.watchlist.symbols()).await
    }

    pub fn subscriptions(&self) -> &SubscriptionStore {
        &self.subscriptions
    }

    pub fn fid(&self) -> Option<u64> {
        self.fid
    }

    fn require_fid(&self) -> anyhow::Result<u64> {
        self.fid
            .ok_or_else(|| anyhow::anyhow!("SCOUT_FID must be set for subscription commands"))
    }

    fn require_signing_contract(&self) -> anyhow::Result<&ScoutContract<DynProvider>> {
        match (&self.contract, self.wallet_address) {
            (Some(contract), Some(_)) => Ok(contract),
            _ => anyhow::bail!(
                "Contract writes require ARBITRUM_RPC_URL, SCOUT_CONTRACT_ADDRESS, and SCOUT_WALLET_KEY"
            ),
        }
    }
}
