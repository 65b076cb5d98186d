//! Degradation and re-sync behaviour of `FallbackDraftStore` against a
//! durable store that can be switched off.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use testament_core::{OwnerId, StepKey, WillId, WillType};
use testament_schema::WillDraft;
use testament_store::{DraftStore, FallbackDraftStore, MemoryDraftStore, SaveOutcome, StoreError};

#[derive(Default)]
struct FlakyStore {
    inner: MemoryDraftStore,
    down: AtomicBool,
    full_writes: AtomicUsize,
    section_writes: AtomicUsize,
}

impl FlakyStore {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl DraftStore for FlakyStore {
    async fn load(&self, owner: OwnerId, will: WillId) -> Result<Option<WillDraft>, StoreError> {
        self.check()?;
        self.inner.load(owner, will).await
    }

    async fn save_section(
        &self,
        owner: OwnerId,
        will: WillId,
        step: StepKey,
        payload: &Value,
    ) -> Result<SaveOutcome, StoreError> {
        self.check()?;
        self.section_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.save_section(owner, will, step, payload).await
    }

    async fn save_full(
        &self,
        owner: OwnerId,
        will: WillId,
        draft: &WillDraft,
    ) -> Result<SaveOutcome, StoreError> {
        self.check()?;
        self.full_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.save_full(owner, will, draft).await
    }
}

fn setup() -> (Arc<FlakyStore>, FallbackDraftStore, WillDraft) {
    let durable = Arc::new(FlakyStore::default());
    let store = FallbackDraftStore::new(durable.clone());
    let draft = WillDraft::new(OwnerId::new(), WillType::Simple);
    (durable, store, draft)
}

#[tokio::test]
async fn durable_failure_degrades_to_cache() {
    let (durable, store, mut draft) = setup();
    durable.set_down(true);

    draft.set_field(StepKey::Testator, "fullName", json!("Ravi Kumar")).unwrap();
    let snap = draft.snapshot_for_save();
    let outcome = store.save_full(draft.owner, draft.id, &snap).await.unwrap();

    assert!(matches!(outcome, SaveOutcome::Cached { .. }));
    assert!(store.is_pending(draft.owner, draft.id));
    assert!(!durable.inner.contains(draft.owner, draft.id));

    // Reads keep working from the cache.
    let loaded = store.load(draft.owner, draft.id).await.unwrap().unwrap();
    assert_eq!(loaded.section(StepKey::Testator)["fullName"], json!("Ravi Kumar"));
}

#[tokio::test]
async fn next_section_write_resyncs_full_draft() {
    let (durable, store, mut draft) = setup();
    durable.set_down(true);
    draft.set_field(StepKey::Testator, "fullName", json!("Ravi Kumar")).unwrap();
    let snap = draft.snapshot_for_save();
    store.save_full(draft.owner, draft.id, &snap).await.unwrap();

    durable.set_down(false);
    let outcome = store
        .save_section(draft.owner, draft.id, StepKey::Review, &json!({"placeOfSigning": "Pune"}))
        .await
        .unwrap();

    assert!(outcome.is_durable());
    assert!(!store.is_pending(draft.owner, draft.id));
    // The re-sync went out as one full write, not a section write.
    assert_eq!(durable.full_writes.load(Ordering::SeqCst), 1);
    assert_eq!(durable.section_writes.load(Ordering::SeqCst), 0);

    let stored = durable.inner.get(draft.owner, draft.id).unwrap();
    assert_eq!(stored.section(StepKey::Testator)["fullName"], json!("Ravi Kumar"));
    assert_eq!(stored.section(StepKey::Review)["placeOfSigning"], json!("Pune"));
}

#[tokio::test]
async fn next_full_write_resyncs_and_clears_pending() {
    let (durable, store, mut draft) = setup();
    durable.set_down(true);
    let first = draft.snapshot_for_save();
    store.save_full(draft.owner, draft.id, &first).await.unwrap();

    durable.set_down(false);
    draft.set_field(StepKey::Testator, "city", json!("Chennai")).unwrap();
    let second = draft.snapshot_for_save();
    assert!(store
        .save_full(draft.owner, draft.id, &second)
        .await
        .unwrap()
        .is_durable());

    assert_eq!(store.pending_count(), 0);
    let stored = durable.inner.get(draft.owner, draft.id).unwrap();
    assert_eq!(stored.revision, 2);
    assert_eq!(stored.section(StepKey::Testator)["city"], json!("Chennai"));
}

#[tokio::test]
async fn pending_key_is_served_from_cache_even_when_durable_recovers() {
    let (durable, store, mut draft) = setup();
    let v1 = draft.snapshot_for_save();
    store.save_full(draft.owner, draft.id, &v1).await.unwrap();

    durable.set_down(true);
    draft.set_field(StepKey::Testator, "city", json!("Kochi")).unwrap();
    let v2 = draft.snapshot_for_save();
    store.save_full(draft.owner, draft.id, &v2).await.unwrap();
    durable.set_down(false);

    let loaded = store.load(draft.owner, draft.id).await.unwrap().unwrap();
    assert_eq!(loaded.revision, 2);
    assert_eq!(loaded.section(StepKey::Testator)["city"], json!("Kochi"));
}

#[tokio::test]
async fn section_write_failure_marks_pending() {
    let (durable, store, draft) = setup();
    store.save_full(draft.owner, draft.id, &draft).await.unwrap();

    durable.set_down(true);
    let outcome = store
        .save_section(draft.owner, draft.id, StepKey::Review, &json!({"placeOfSigning": "Agra"}))
        .await
        .unwrap();
    let SaveOutcome::Cached { reason } = outcome else {
        panic!("expected cached outcome");
    };
    assert!(reason.contains("database error"));
    assert!(store.is_pending(draft.owner, draft.id));
}

#[tokio::test]
async fn stale_snapshot_never_overwrites_newer_one() {
    let (durable, store, mut draft) = setup();
    draft.set_field(StepKey::Testator, "city", json!("Pune")).unwrap();
    let early = draft.snapshot_for_save();
    draft.set_field(StepKey::Testator, "city", json!("Mumbai")).unwrap();
    let late = draft.snapshot_for_save();

    store.save_full(draft.owner, draft.id, &late).await.unwrap();
    store.save_full(draft.owner, draft.id, &early).await.unwrap();

    for copy in [
        durable.inner.get(draft.owner, draft.id).unwrap(),
        store.cache().get(draft.owner, draft.id).unwrap(),
        store.load(draft.owner, draft.id).await.unwrap().unwrap(),
    ] {
        assert_eq!(copy.section(StepKey::Testator)["city"], json!("Mumbai"));
    }
}
