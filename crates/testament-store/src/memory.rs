//! # In-Memory Draft Store
//!
//! Non-durable `(owner, will) → WillDraft` map. Serves as the cache tier of
//! [`FallbackDraftStore`](crate::FallbackDraftStore) and as the whole store
//! when no database is configured.
//!
//! The lock is a `parking_lot::RwLock` and every operation is synchronous,
//! so it is never held across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use testament_core::{OwnerId, StepKey, Timestamp, WillId};
use testament_schema::WillDraft;

use crate::{check_key, DraftStore, SaveOutcome, StoreError};

type DraftKey = (OwnerId, WillId);

#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    data: Arc<RwLock<HashMap<DraftKey, WillDraft>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: OwnerId, will: WillId) -> Option<WillDraft> {
        self.data.read().get(&(owner, will)).cloned()
    }

    /// Store a full snapshot unless a newer revision is already held.
    /// Returns whether the snapshot was applied.
    pub fn put_full(&self, draft: &WillDraft) -> bool {
        let mut guard = self.data.write();
        let key = (draft.owner, draft.id);
        if let Some(existing) = guard.get(&key) {
            if existing.revision > draft.revision {
                tracing::debug!(
                    will_id = %draft.id,
                    stored = existing.revision,
                    incoming = draft.revision,
                    "ignoring stale full snapshot"
                );
                return false;
            }
        }
        let mut stored = draft.clone();
        stored.mark_saved(Timestamp::now());
        guard.insert(key, stored);
        true
    }

    /// Replace one section of a held draft.
    pub fn put_section(
        &self,
        owner: OwnerId,
        will: WillId,
        step: StepKey,
        payload: &Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.data.write();
        let draft = guard
            .get_mut(&(owner, will))
            .ok_or(StoreError::NotFound { owner, will })?;
        draft.set_section(step, payload.clone());
        draft.mark_saved(Timestamp::now());
        Ok(())
    }

    pub fn contains(&self, owner: OwnerId, will: WillId) -> bool {
        self.data.read().contains_key(&(owner, will))
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self, owner: OwnerId, will: WillId) -> Result<Option<WillDraft>, StoreError> {
        Ok(self.get(owner, will))
    }

    async fn save_section(
        &self,
        owner: OwnerId,
        will: WillId,
        step: StepKey,
        payload: &Value,
    ) -> Result<SaveOutcome, StoreError> {
        self.put_section(owner, will, step, payload)?;
        Ok(SaveOutcome::Durable)
    }

    async fn save_full(
        &self,
        owner: OwnerId,
        will: WillId,
        draft: &WillDraft,
    ) -> Result<SaveOutcome, StoreError> {
        check_key(owner, will, draft)?;
        self.put_full(draft);
        Ok(SaveOutcome::Durable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use testament_core::WillType;

    fn draft() -> WillDraft {
        WillDraft::new(OwnerId::new(), WillType::Simple)
    }

    #[tokio::test]
    async fn load_of_unknown_key_is_none() {
        let store = MemoryDraftStore::new();
        assert!(store.load(OwnerId::new(), WillId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn full_save_then_load() {
        let store = MemoryDraftStore::new();
        let mut d = draft();
        d.set_field(StepKey::Testator, "fullName", json!("Ravi Kumar")).unwrap();
        let snap = d.snapshot_for_save();
        store.save_full(d.owner, d.id, &snap).await.unwrap();

        let loaded = store.load(d.owner, d.id).await.unwrap().unwrap();
        assert_eq!(loaded.section(StepKey::Testator)["fullName"], json!("Ravi Kumar"));
        assert_eq!(loaded.revision, 1);
        assert!(loaded.last_saved_at.is_some());
        assert!(!loaded.is_dirty());
    }

    #[tokio::test]
    async fn stale_snapshot_is_ignored() {
        let store = MemoryDraftStore::new();
        let mut d = draft();
        d.set_field(StepKey::Testator, "city", json!("Pune")).unwrap();
        let early = d.snapshot_for_save();
        d.set_field(StepKey::Testator, "city", json!("Mumbai")).unwrap();
        let late = d.snapshot_for_save();

        store.save_full(d.owner, d.id, &late).await.unwrap();
        store.save_full(d.owner, d.id, &early).await.unwrap();

        let loaded = store.get(d.owner, d.id).unwrap();
        assert_eq!(loaded.section(StepKey::Testator)["city"], json!("Mumbai"));
        assert_eq!(loaded.revision, 2);
    }

    #[tokio::test]
    async fn section_save_requires_existing_draft() {
        let store = MemoryDraftStore::new();
        let d = draft();
        let err = store
            .save_section(d.owner, d.id, StepKey::Review, &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn section_save_is_last_write_wins() {
        let store = MemoryDraftStore::new();
        let d = draft();
        store.save_full(d.owner, d.id, &d).await.unwrap();
        store
            .save_section(d.owner, d.id, StepKey::Review, &json!({"placeOfSigning": "Pune"}))
            .await
            .unwrap();
        store
            .save_section(d.owner, d.id, StepKey::Review, &json!({"placeOfSigning": "Delhi"}))
            .await
            .unwrap();
        let loaded = store.get(d.owner, d.id).unwrap();
        assert_eq!(loaded.section(StepKey::Review)["placeOfSigning"], json!("Delhi"));
        assert!(!loaded.is_dirty());
    }

    #[tokio::test]
    async fn full_save_under_wrong_key_fails() {
        let store = MemoryDraftStore::new();
        let d = draft();
        assert!(store.save_full(OwnerId::new(), d.id, &d).await.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_data() {
        let store = MemoryDraftStore::new();
        let other = store.clone();
        let d = draft();
        store.put_full(&d);
        assert!(other.contains(d.owner, d.id));
        assert_eq!(other.len(), 1);
    }
}
