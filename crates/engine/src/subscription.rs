//! Subscription store — CRUD operations for user token-alert subscriptions.
//!
//! Subscriptions link a user (fid) to a token symbol and an alert threshold.
//! The full map persists to the local store on every mutation, and every
//! mutation emits a change event on a broadcast channel. Gone or lagging
//! receivers are ignored so one bad listener cannot block the rest.

use std::collections::HashMap;

use tokio::sync::broadcast;

use scout_common::error::AppError;
use scout_common::store::{LocalStore, SUBSCRIPTIONS_KEY};
use scout_common::types::TokenSubscription;

/// Active subscriptions required before the Signal Scout NFT can be claimed.
pub const SCOUT_NFT_MIN_SUBSCRIPTIONS: usize = 3;

const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// A mutation of the subscription map.
#[derive(Debug, Clone)]
pub enum SubscriptionChange {
    Added(TokenSubscription),
    Removed { fid: u64, id: String },
}

/// Persisted per-user subscription map.
///
/// Keys are the fid rendered as a string, matching the persisted layout.
/// Duplicate subscriptions to the same token by the same user are allowed;
/// `add_subscription` never dedups.
pub struct SubscriptionStore {
    subscriptions: HashMap<String, Vec<TokenSubscription>>,
    store: LocalStore,
    changes: broadcast::Sender<SubscriptionChange>,
}

impl SubscriptionStore {
    /// Load the subscription map from the store. A corrupt or unreadable
    /// entry is logged and treated as empty, never fatal.
    pub fn open(store: LocalStore) -> Self {
        let subscriptions = match store.read(SUBSCRIPTIONS_KEY) {
            Ok(Some(saved)) => saved,
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load subscriptions; starting empty");
                HashMap::new()
            }
        };
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            subscriptions,
            store,
            changes,
        }
    }

    /// Create a subscription and append it to the user's list.
    pub fn add_subscription(
        &mut self,
        fid: u64,
        token: &str,
        threshold: f64,
    ) -> Result<TokenSubscription, AppError> {
        let subscription = TokenSubscription::new(fid, token, threshold);

        self.subscriptions
            .entry(fid.to_string())
            .or_default()
            .push(subscription.clone());
        self.persist()?;
        self.notify(SubscriptionChange::Added(subscription.clone()));

        tracing::info!(
            subscription_id = %subscription.id,
            fid,
            token = %subscription.token,
            threshold,
            "Subscription created"
        );

        Ok(subscription)
    }

    /// Remove a subscription by id. Returns whether a removal occurred.
    pub fn remove_subscription(&mut self, fid: u64, id: &str) -> Result<bool, AppError> {
        let Some(user_subs) = self.subscriptions.get_mut(&fid.to_string()) else {
            return Ok(false);
        };

        let before = user_subs.len();
        user_subs.retain(|sub| sub.id != id);
        let removed = user_subs.len() != before;

        if removed {
            self.persist()?;
            self.notify(SubscriptionChange::Removed {
                fid,
                id: id.to_string(),
            });
            tracing::info!(subscription_id = %id, fid, "Subscription removed");
        }

        Ok(removed)
    }

    /// Change a subscription's threshold by removing the record and
    /// recreating it — records are never mutated in place.
    pub fn update_threshold(
        &mut self,
        fid: u64,
        id: &str,
        threshold: f64,
    ) -> Result<TokenSubscription, AppError> {
        let token = self
            .user_subscriptions(fid)
            .into_iter()
            .find(|sub| sub.id == id)
            .map(|sub| sub.token)
            .ok_or_else(|| AppError::NotFound(format!("Subscription {} not found", id)))?;

        self.remove_subscription(fid, id)?;
        self.add_subscription(fid, &token, threshold)
    }

    /// All subscriptions belonging to a user.
    pub fn user_subscriptions(&self, fid: u64) -> Vec<TokenSubscription> {
        self.subscriptions
            .get(&fid.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the user holds at least one subscription for the token.
    pub fn is_subscribed(&self, fid: u64, token: &str) -> bool {
        let upper = token.trim().to_uppercase();
        self.user_subscriptions(fid)
            .iter()
            .any(|sub| sub.token == upper)
    }

    pub fn subscription_count(&self, fid: u64) -> usize {
        self.subscriptions
            .get(&fid.to_string())
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Whether the user has enough active subscriptions for the Signal
    /// Scout NFT.
    pub fn is_scout_eligible(&self, fid: u64) -> bool {
        self.subscription_count(fid) >= SCOUT_NFT_MIN_SUBSCRIPTIONS
    }

    /// Subscribe to change notifications.
    pub fn changes(&self) -> broadcast::Receiver<SubscriptionChange> {
        self.changes.subscribe()
    }

    fn persist(&self) -> Result<(), AppError> {
        self.store.write(SUBSCRIPTIONS_KEY, &self.subscriptions)
    }

    fn notify(&self, change: SubscriptionChange) {
        // Send fails only when no receiver is listening; that is fine.
        let _ = self.changes.send(change);
    }
}
