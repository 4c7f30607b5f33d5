//! Client for the deployed Top Signals Browser contract.
//!
//! The contract keeps a global interaction counter, mints a commemorative
//! NFT when the counter sits at a multiple of 10, mints the Signal Scout
//! NFT, and records on-chain token subscriptions. This client wraps those
//! calls behind a typed interface; milestone arithmetic is also mirrored
//! locally so displays don't need a round-trip.
//!
//! # Usage
//!
//! ```rust,no_run
//! use scout_chain::{ScoutContract, connect};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = connect("https://arb1.arbitrum.io/rpc")?;
//! let contract = ScoutContract::from_parts(
//!     "0x0000000000000000000000000000000000000042",
//!     provider,
//! )?;
//! let status = contract.counter_status(None).await?;
//! println!("counter at {}", status.counter);
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use serde::Serialize;

// Solidity interface for the Top Signals Browser contract.
// Only the functions we call are defined.
sol! {
    #[sol(rpc)]
    interface ITopSignalsBrowser {
        function getCounter() external view returns (uint256);
        function getNextCounterMilestone() external view returns (uint256);
        function isCounterMultipleOfTen() external view returns (bool);
        function getSubscriptionCounter() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function mintNftAtMilestone() external;
        function mintSignalScoutNft() external;
        function subscribeToToken(uint256 fid, string token, uint256 threshold) external returns (uint256);
    }
}

/// Counter milestones fall on multiples of this step.
pub const COUNTER_MILESTONE_STEP: u64 = 10;

/// The next counter milestone at or above `counter`.
pub fn next_milestone(counter: u64) -> u64 {
    let remainder = counter % COUNTER_MILESTONE_STEP;
    if remainder == 0 {
        counter
    } else {
        counter + COUNTER_MILESTONE_STEP - remainder
    }
}

/// Whether the counter currently sits on a milestone. Zero never counts.
pub fn is_at_milestone(counter: u64) -> bool {
    counter > 0 && counter % COUNTER_MILESTONE_STEP == 0
}

/// Snapshot of the contract's counter state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CounterStatus {
    pub counter: u64,
    pub next_milestone: u64,
    pub at_milestone: bool,
    pub subscription_counter: u64,
    /// Whether the queried owner already holds an NFT; `None` when no owner
    /// address was supplied.
    pub has_nft: Option<bool>,
}

/// Connect a read-only HTTP provider.
pub fn connect(rpc_url: &str) -> anyhow::Result<DynProvider> {
    Ok(ProviderBuilder::new().connect_http(rpc_url.parse()?).erased())
}

/// Connect an HTTP provider with a local signing key for contract writes.
pub fn connect_with_signer(rpc_url: &str, private_key: &str) -> anyhow::Result<DynProvider> {
    let signer: PrivateKeySigner = private_key.parse()?;
    let wallet = EthereumWallet::from(signer);
    Ok(ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(rpc_url.parse()?)
        .erased())
}

/// The address a private key signs as.
pub fn signer_address(private_key: &str) -> anyhow::Result<Address> {
    let signer: PrivateKeySigner = private_key.parse()?;
    Ok(signer.address())
}

/// Typed client for the deployed contract.
pub struct ScoutContract<P> {
    address: Address,
    provider: P,
}

impl<P: Provider + Clone> ScoutContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self { address, provider }
    }

    /// Build a client from a hex contract address.
    pub fn from_parts(address: &str, provider: P) -> anyhow::Result<Self> {
        let address = Address::from_str(address)
            .map_err(|e| anyhow::anyhow!("Invalid contract address '{}': {}", address, e))?;
        Ok(Self::new(address, provider))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn instance(&self) -> ITopSignalsBrowser::ITopSignalsBrowserInstance<P> {
        ITopSignalsBrowser::new(self.address, self.provider.clone())
    }

    /// Current global interaction counter.
    pub async fn counter(&self) -> anyhow::Result<u64> {
        Ok(to_u64(self.instance().getCounter().call().await?))
    }

    /// Next milestone as reported by the contract.
    pub async fn next_counter_milestone(&self) -> anyhow::Result<u64> {
        Ok(to_u64(
            self.instance().getNextCounterMilestone().call().await?,
        ))
    }

    /// Whether the counter sits on a milestone right now.
    pub async fn is_counter_at_milestone(&self) -> anyhow::Result<bool> {
        Ok(self.instance().isCounterMultipleOfTen().call().await?)
    }

    /// Number of on-chain token subscriptions recorded so far.
    pub async fn subscription_counter(&self) -> anyhow::Result<u64> {
        Ok(to_u64(self.instance().getSubscriptionCounter().call().await?))
    }

    /// Whether `owner` already holds one of the contract's NFTs.
    pub async fn has_nft(&self, owner: Address) -> anyhow::Result<bool> {
        let balance = self.instance().balanceOf(owner).call().await?;
        Ok(balance > U256::ZERO)
    }

    /// All counter reads in one snapshot.
    pub async fn counter_status(&self, owner: Option<Address>) -> anyhow::Result<CounterStatus> {
        let counter = self.counter().await?;
        let next_milestone = self.next_counter_milestone().await?;
        let at_milestone = self.is_counter_at_milestone().await?;
        let subscription_counter = self.subscription_counter().await?;
        let has_nft = match owner {
            Some(owner) => Some(self.has_nft(owner).await?),
            None => None,
        };

        Ok(CounterStatus {
            counter,
            next_milestone,
            at_milestone,
            subscription_counter,
            has_nft,
        })
    }

    /// Mint the milestone NFT. Requires a signer-capable provider; the
    /// contract rejects the call when the counter is off-milestone or the
    /// sender already holds an NFT.
    pub async fn mint_nft_at_milestone(&self) -> anyhow::Result<B256> {
        let pending = self.instance().mintNftAtMilestone().send().await?;
        let tx_hash = pending.watch().await?;
        tracing::info!(tx = %tx_hash, "Milestone NFT mint confirmed");
        Ok(tx_hash)
    }

    /// Mint the Signal Scout NFT. Requires a signer-capable provider.
    pub async fn mint_signal_scout_nft(&self) -> anyhow::Result<B256> {
        let pending = self.instance().mintSignalScoutNft().send().await?;
        let tx_hash = pending.watch().await?;
        tracing::info!(tx = %tx_hash, "Signal Scout NFT mint confirmed");
        Ok(tx_hash)
    }

    /// Record a token subscription on-chain. Requires a signer-capable
    /// provider.
    pub async fn subscribe_to_token(
        &self,
        fid: u64,
        token: &str,
        threshold: u64,
    ) -> anyhow::Result<B256> {
        let pending = self
            .instance()
            .subscribeToToken(U256::from(fid), token.to_string(), U256::from(threshold))
            .send()
            .await?;
        let tx_hash = pending.watch().await?;
        tracing::info!(tx = %tx_hash, fid, token, threshold, "On-chain subscription confirmed");
        Ok(tx_hash)
    }
}

fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
