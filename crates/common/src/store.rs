//! Local JSON persistence.
//!
//! Each key maps to one pretty-printed JSON file in the store directory.
//! Writes go through a temp file and rename so a crash mid-write cannot
//! leave a half-written value behind.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Store key for the persisted watchlist (JSON array of symbols).
pub const WATCHLIST_KEY: &str = "signals-watchlist";

/// Store key for the persisted subscription map (fid string → subscriptions).
pub const SUBSCRIPTIONS_KEY: &str = "token-subscriptions";

/// File-backed key-value store for session-spanning state.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "Local store opened");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read and deserialize the value stored under `key`.
    /// Returns `Ok(None)` when the key has never been written.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Serialize and persist `value` under `key`, replacing any prior value.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
