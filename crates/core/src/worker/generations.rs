//! Activate-time cleanup of stale cache generations.

use futures_util::future::try_join_all;

use crate::Error;
use crate::cache::CacheDb;

/// Deletes every store that is not the active generation.
pub struct CacheGenerationManager {
    db: CacheDb,
}

impl CacheGenerationManager {
    pub fn new(db: CacheDb) -> Self {
        Self { db }
    }

    /// Delete all stores except `active`, returning the deleted names.
    ///
    /// Idempotent; a second run deletes nothing. A failed deletion is
    /// returned to the caller.
    pub async fn reconcile(&self, active: &str) -> Result<Vec<String>, Error> {
        let stale: Vec<String> = self
            .db
            .list_stores()
            .await?
            .into_iter()
            .filter(|name| name != active)
            .collect();

        if stale.is_empty() {
            tracing::debug!(active, "no stale cache generations");
            return Ok(Vec::new());
        }

        let deleted = try_join_all(stale.iter().map(|name| self.db.delete_store(name))).await?;

        let deleted: Vec<String> = stale
            .into_iter()
            .zip(deleted)
            .filter_map(|(name, existed)| existed.then_some(name))
            .collect();

        tracing::info!(active, deleted = ?deleted, "deleted stale cache generations");
        Ok(deleted)
    }
}
