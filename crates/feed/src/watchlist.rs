//! Persisted watchlist of token symbols.

use std::collections::BTreeSet;

use scout_common::error::AppError;
use scout_common::store::{LocalStore, WATCHLIST_KEY};

/// A user's watched symbols, persisted under `signals-watchlist`.
///
/// Symbols are normalized to uppercase on the way in; iteration order is
/// alphabetical.
pub struct Watchlist {
    symbols: BTreeSet<String>,
    store: LocalStore,
}

impl Watchlist {
    /// Load the watchlist from the store. A corrupt or unreadable entry is
    /// logged and treated as empty.
    pub fn open(store: LocalStore) -> Self {
        let symbols = match store.read::<Vec<String>>(WATCHLIST_KEY) {
            Ok(Some(saved)) => saved.into_iter().collect(),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load watchlist; starting empty");
                BTreeSet::new()
            }
        };
        Self { symbols, store }
    }

    /// Add a symbol. Returns whether the watchlist changed.
    pub fn add(&mut self, symbol: &str) -> Result<bool, AppError> {
        let added = self.symbols.insert(symbol.trim().to_uppercase());
        if added {
            self.persist()?;
        }
        Ok(added)
    }

    /// Remove a symbol. Returns whether a removal occurred.
    pub fn remove(&mut self, symbol: &str) -> Result<bool, AppError> {
        let removed = self.symbols.remove(&symbol.trim().to_uppercase());
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.trim().to_uppercase())
    }

    pub fn symbols(&self) -> Vec<String> {
        self.symbols.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn persist(&self) -> Result<(), AppError> {
        self.store.write(WATCHLIST_KEY, &self.symbols())
    }
}
