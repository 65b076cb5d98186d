//! # Fallback Draft Store
//!
//! A [`MemoryDraftStore`] cache in front of an optional durable store.
//!
//! ## Write path
//!
//! 1. The cache is always written first. A cache write cannot fail except
//!    for a section write to an unknown draft.
//! 2. The durable store is written next. On failure the key is marked
//!    pending and the caller gets [`SaveOutcome::Cached`].
//! 3. The next write for a pending key pushes the whole cached draft to the
//!    durable store instead of just the change, which re-syncs it. Success
//!    clears the pending mark.
//!
//! ## Read path
//!
//! A pending key is served from the cache, because the durable copy is
//! known to be behind. Otherwise the durable store is asked first and its
//! answer warms the cache. A durable read failure falls back to the cache.
//!
//! Without a durable store every write reports `Cached`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use testament_core::{OwnerId, StepKey, WillId};
use testament_schema::WillDraft;

use crate::{check_key, DraftStore, MemoryDraftStore, SaveOutcome, StoreError};

const NO_DURABLE_STORE: &str = "no durable store configured";

#[derive(Clone)]
pub struct FallbackDraftStore {
    cache: MemoryDraftStore,
    durable: Option<Arc<dyn DraftStore>>,
    pending: Arc<Mutex<HashSet<(OwnerId, WillId)>>>,
}

impl std::fmt::Debug for FallbackDraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackDraftStore")
            .field("cached", &self.cache.len())
            .field("durable", &self.durable.is_some())
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

impl FallbackDraftStore {
    pub fn new(durable: Arc<dyn DraftStore>) -> Self {
        Self {
            cache: MemoryDraftStore::new(),
            durable: Some(durable),
            pending: Arc::default(),
        }
    }

    /// Cache-only mode, used when no database is configured.
    pub fn memory_only() -> Self {
        Self {
            cache: MemoryDraftStore::new(),
            durable: None,
            pending: Arc::default(),
        }
    }

    pub fn has_durable(&self) -> bool {
        self.durable.is_some()
    }

    pub fn cache(&self) -> &MemoryDraftStore {
        &self.cache
    }

    pub fn is_pending(&self, owner: OwnerId, will: WillId) -> bool {
        self.pending.lock().contains(&(owner, will))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    fn mark_pending(&self, owner: OwnerId, will: WillId, error: &StoreError) -> SaveOutcome {
        tracing::warn!(
            owner_id = %owner,
            will_id = %will,
            error = %error,
            "durable draft write failed, keeping cached copy"
        );
        self.pending.lock().insert((owner, will));
        SaveOutcome::Cached {
            reason: error.to_string(),
        }
    }

    fn clear_pending(&self, owner: OwnerId, will: WillId) {
        if self.pending.lock().remove(&(owner, will)) {
            tracing::info!(owner_id = %owner, will_id = %will, "cached draft re-synced");
        }
    }

    /// Push the full cached copy of a pending key to the durable store.
    async fn resync(
        &self,
        durable: &dyn DraftStore,
        owner: OwnerId,
        will: WillId,
    ) -> Result<SaveOutcome, StoreError> {
        let Some(cached) = self.cache.get(owner, will) else {
            // Nothing to push; the mark is stale.
            self.pending.lock().remove(&(owner, will));
            return Ok(SaveOutcome::Durable);
        };
        match durable.save_full(owner, will, &cached).await {
            Ok(outcome) => {
                self.clear_pending(owner, will);
                Ok(outcome)
            }
            Err(e) => Ok(self.mark_pending(owner, will, &e)),
        }
    }

    /// Make sure the cache holds `(owner, will)` before a section write,
    /// pulling it from the durable store if needed.
    async fn warm(&self, owner: OwnerId, will: WillId) -> Result<(), StoreError> {
        if self.cache.contains(owner, will) {
            return Ok(());
        }
        let Some(durable) = &self.durable else {
            return Err(StoreError::NotFound { owner, will });
        };
        match durable.load(owner, will).await? {
            Some(draft) => {
                self.cache.put_full(&draft);
                Ok(())
            }
            None => Err(StoreError::NotFound { owner, will }),
        }
    }
}

#[async_trait]
impl DraftStore for FallbackDraftStore {
    async fn load(&self, owner: OwnerId, will: WillId) -> Result<Option<WillDraft>, StoreError> {
        let Some(durable) = &self.durable else {
            return Ok(self.cache.get(owner, will));
        };
        if self.is_pending(owner, will) {
            return Ok(self.cache.get(owner, will));
        }
        match durable.load(owner, will).await {
            Ok(Some(draft)) => {
                self.cache.put_full(&draft);
                Ok(self.cache.get(owner, will).or(Some(draft)))
            }
            Ok(None) => Ok(self.cache.get(owner, will)),
            Err(e) => {
                tracing::warn!(
                    owner_id = %owner,
                    will_id = %will,
                    error = %e,
                    "durable draft read failed, serving cached copy"
                );
                Ok(self.cache.get(owner, will))
            }
        }
    }

    async fn save_section(
        &self,
        owner: OwnerId,
        will: WillId,
        step: StepKey,
        payload: &Value,
    ) -> Result<SaveOutcome, StoreError> {
        self.warm(owner, will).await?;
        self.cache.put_section(owner, will, step, payload)?;

        let Some(durable) = &self.durable else {
            return Ok(SaveOutcome::Cached {
                reason: NO_DURABLE_STORE.into(),
            });
        };
        if self.is_pending(owner, will) {
            return self.resync(durable.as_ref(), owner, will).await;
        }
        match durable.save_section(owner, will, step, payload).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => Ok(self.mark_pending(owner, will, &e)),
        }
    }

    async fn save_full(
        &self,
        owner: OwnerId,
        will: WillId,
        draft: &WillDraft,
    ) -> Result<SaveOutcome, StoreError> {
        check_key(owner, will, draft)?;
        self.cache.put_full(draft);

        let Some(durable) = &self.durable else {
            return Ok(SaveOutcome::Cached {
                reason: NO_DURABLE_STORE.into(),
            });
        };
        if self.is_pending(owner, will) {
            // The cache now holds the newest revision; push that.
            return self.resync(durable.as_ref(), owner, will).await;
        }
        match durable.save_full(owner, will, draft).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => Ok(self.mark_pending(owner, will, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use testament_core::WillType;

    #[tokio::test]
    async fn memory_only_reports_cached() {
        let store = FallbackDraftStore::memory_only();
        let d = WillDraft::new(OwnerId::new(), WillType::Simple);
        let outcome = store.save_full(d.owner, d.id, &d).await.unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Cached {
                reason: NO_DURABLE_STORE.into()
            }
        );
        assert!(store.load(d.owner, d.id).await.unwrap().is_some());
        assert_eq!(store.pending_count(), 0);
    }

    #[tokio::test]
    async fn memory_only_section_write_to_unknown_draft_fails() {
        let store = FallbackDraftStore::memory_only();
        let err = store
            .save_section(OwnerId::new(), WillId::new(), StepKey::Review, &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn durable_success_reports_durable() {
        let durable = Arc::new(MemoryDraftStore::new());
        let store = FallbackDraftStore::new(durable.clone());
        let d = WillDraft::new(OwnerId::new(), WillType::Comprehensive);
        assert!(store.save_full(d.owner, d.id, &d).await.unwrap().is_durable());
        assert!(durable.contains(d.owner, d.id));
        assert!(store.cache().contains(d.owner, d.id));
    }

    #[tokio::test]
    async fn section_write_pulls_draft_from_durable_store() {
        let durable = Arc::new(MemoryDraftStore::new());
        let d = WillDraft::new(OwnerId::new(), WillType::Simple);
        durable.put_full(&d);

        let store = FallbackDraftStore::new(durable.clone());
        let outcome = store
            .save_section(d.owner, d.id, StepKey::Review, &json!({"placeOfSigning": "Goa"}))
            .await
            .unwrap();
        assert!(outcome.is_durable());
        let cached = store.cache().get(d.owner, d.id).unwrap();
        assert_eq!(cached.section(StepKey::Review)["placeOfSigning"], json!("Goa"));
    }
}
