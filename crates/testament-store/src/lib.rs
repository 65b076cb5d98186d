//! # testament-store: Draft Persistence
//!
//! The [`DraftStore`] trait and its three implementations:
//!
//! - [`MemoryDraftStore`]: a non-durable map keyed by `(owner, will)`.
//! - [`PgDraftStore`]: the durable Postgres store (`will_drafts` table).
//! - [`FallbackDraftStore`]: writes the cache first, then the durable store.
//!   When the durable write fails the save still succeeds as
//!   [`SaveOutcome::Cached`], and the draft is re-synced in full at the
//!   next write for the same key.
//!
//! ## Ordering
//!
//! Section writes are last-write-wins per step key. Full writes carry the
//! draft's `revision`; every store ignores a full write whose revision is
//! older than the one it holds, so a slow early snapshot can never
//! overwrite a later one.
//!
//! ## Crate Policy
//!
//! - Stores are `Send + Sync + Clone` with `Arc` internals. No lock is held
//!   across an `.await`.
//! - Nothing retries in the background. Failures are logged with `tracing`
//!   and reported to the caller.

pub mod error;
pub mod fallback;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use testament_core::{OwnerId, StepKey, WillId};
use testament_schema::WillDraft;

pub use error::StoreError;
pub use fallback::FallbackDraftStore;
pub use memory::MemoryDraftStore;
pub use postgres::PgDraftStore;

/// Where a successful write ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "persisted", rename_all = "camelCase")]
pub enum SaveOutcome {
    /// Written to the store's own backing tier.
    Durable,
    /// Held in the fallback cache only. The durable tier rejected the write
    /// or is not configured.
    Cached { reason: String },
}

impl SaveOutcome {
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Durable)
    }
}

/// Persistence boundary for will drafts.
///
/// Object-safe so the controller and the HTTP layer can hold an
/// `Arc<dyn DraftStore>`.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// The stored draft, or `None` if the key has never been saved.
    async fn load(&self, owner: OwnerId, will: WillId) -> Result<Option<WillDraft>, StoreError>;

    /// Replace one step's payload. The draft must already exist.
    async fn save_section(
        &self,
        owner: OwnerId,
        will: WillId,
        step: StepKey,
        payload: &Value,
    ) -> Result<SaveOutcome, StoreError>;

    /// Write a full snapshot. A snapshot older than the stored revision is
    /// accepted and dropped.
    async fn save_full(
        &self,
        owner: OwnerId,
        will: WillId,
        draft: &WillDraft,
    ) -> Result<SaveOutcome, StoreError>;
}

#[async_trait]
impl<S: DraftStore + ?Sized> DraftStore for Arc<S> {
    async fn load(&self, owner: OwnerId, will: WillId) -> Result<Option<WillDraft>, StoreError> {
        (**self).load(owner, will).await
    }

    async fn save_section(
        &self,
        owner: OwnerId,
        will: WillId,
        step: StepKey,
        payload: &Value,
    ) -> Result<SaveOutcome, StoreError> {
        (**self).save_section(owner, will, step, payload).await
    }

    async fn save_full(
        &self,
        owner: OwnerId,
        will: WillId,
        draft: &WillDraft,
    ) -> Result<SaveOutcome, StoreError> {
        (**self).save_full(owner, will, draft).await
    }
}

/// Reject a full write whose draft does not belong to the key it is
/// written under.
pub(crate) fn check_key(owner: OwnerId, will: WillId, draft: &WillDraft) -> Result<(), StoreError> {
    if draft.owner != owner || draft.id != will {
        return Err(StoreError::KeyMismatch {
            owner,
            will,
            draft_owner: draft.owner,
            draft_id: draft.id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_persisted_tag() {
        let durable = serde_json::to_value(SaveOutcome::Durable).unwrap();
        assert_eq!(durable, serde_json::json!({"persisted": "durable"}));
        let cached = serde_json::to_value(SaveOutcome::Cached {
            reason: "connection refused".into(),
        })
        .unwrap();
        assert_eq!(
            cached,
            serde_json::json!({"persisted": "cached", "reason": "connection refused"})
        );
    }

    #[test]
    fn key_mismatch_is_rejected() {
        let draft = WillDraft::new(OwnerId::new(), testament_core::WillType::Simple);
        assert!(check_key(draft.owner, draft.id, &draft).is_ok());
        assert!(matches!(
            check_key(OwnerId::new(), draft.id, &draft),
            Err(StoreError::KeyMismatch { .. })
        ));
    }
}
