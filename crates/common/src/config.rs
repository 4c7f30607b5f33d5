use std::path::PathBuf;

use serde::Deserialize;

/// Default base URL of the remote signals API.
pub const DEFAULT_SIGNALS_BASE_URL: &str = "https://farcaster.maxxit.ai";

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the signals API
    pub signals_base_url: String,

    /// Signal cache time-to-live in seconds (default: 60)
    pub cache_ttl_secs: u64,

    /// Watch-loop poll interval in seconds (default: 300)
    pub poll_interval_secs: u64,

    /// Directory for local persistence (watchlist, subscriptions)
    pub data_dir: PathBuf,

    /// Farcaster id of the local user; required for subscription commands
    pub fid: Option<u64>,

    /// JSON-RPC endpoint of the chain hosting the milestone contract
    pub rpc_url: Option<String>,

    /// Address of the Top Signals Browser contract
    pub contract_address: Option<String>,

    /// Hex-encoded private key used to sign contract writes
    pub wallet_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            signals_base_url: std::env::var("SIGNALS_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_SIGNALS_BASE_URL.to_string()),
            cache_ttl_secs: std::env::var("SIGNALS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SIGNALS_CACHE_TTL_SECS must be a valid u64"))?,
            poll_interval_secs: std::env::var("WATCH_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("WATCH_POLL_INTERVAL_SECS must be a valid u64"))?,
            data_dir: std::env::var("SCOUT_DATA_DIR")
                .unwrap_or_else(|_| ".signal-scout".to_string())
                .into(),
            fid: match std::env::var("SCOUT_FID") {
                Ok(raw) => Some(
                    raw.parse()
                        .map_err(|_| anyhow::anyhow!("SCOUT_FID must be a valid u64"))?,
                ),
                Err(_) => None,
            },
            rpc_url: std::env::var("ARBITRUM_RPC_URL").ok(),
            contract_address: std::env::var("SCOUT_CONTRACT_ADDRESS").ok(),
            wallet_key: std::env::var("SCOUT_WALLET_KEY").ok(),
        })
    }
}
