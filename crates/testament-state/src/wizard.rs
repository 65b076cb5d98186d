//! # Wizard Controller
//!
//! Owns one draft and the wizard's navigation state. All mutation goes
//! through `&mut self`, so there is exactly one writer; the only concurrency
//! is the save task spawned for each write.
//!
//! Saves carry a full snapshot with a fresh revision. A store drops any
//! snapshot older than the one it holds, so whichever save was submitted
//! last wins regardless of completion order.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use testament_core::{DraftError, FieldError, FieldPath, OwnerId, StepKey, Timestamp, WillId, WillType};
use testament_schema::{
    first_invalid_in_plan, normalize, resolve_derived, validate_draft, validate_step,
    DerivedState, ValidationContext, WillDraft,
};
use testament_store::{DraftStore, SaveOutcome, StoreError};

use crate::assembler::{AssembledDocument, DocumentAssembler};
use crate::autosave::AutosaveTimer;
use crate::config::WizardConfig;
use crate::error::WizardError;

/// Result of the last save attempt, for the UI's save indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SaveStatus {
    /// Nothing saved during this session yet.
    Idle,
    Saved { at: Timestamp },
    /// Held by the fallback cache only.
    SavedLocally { at: Timestamp, reason: String },
    /// The write failed outright. The draft stays dirty.
    Failed { reason: String },
}

/// What [`WizardController::go_next`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTransition {
    /// The step passed and the wizard moved on.
    Advanced { from: usize, to: usize },
    /// The final step passed. Use `submit` to finish.
    AtFinalStep,
    /// The step has errors. Nothing was saved.
    Blocked { error_count: usize },
}

pub struct WizardController {
    draft: WillDraft,
    store: Arc<dyn DraftStore>,
    assembler: Arc<dyn DocumentAssembler>,
    current: usize,
    completed: BTreeSet<usize>,
    errors: Vec<FieldError>,
    derived: DerivedState,
    save_status: SaveStatus,
    autosave: AutosaveTimer,
    today: Option<NaiveDate>,
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("will_id", &self.draft.id)
            .field("current", &self.current)
            .field("completed", &self.completed)
            .field("errors", &self.errors.len())
            .field("dirty", &self.draft.is_dirty())
            .field("save_status", &self.save_status)
            .finish()
    }
}

impl WizardController {
    /// Start the wizard on step 1 of `draft`.
    pub fn new(
        draft: WillDraft,
        store: Arc<dyn DraftStore>,
        assembler: Arc<dyn DocumentAssembler>,
        config: WizardConfig,
    ) -> Self {
        let mut controller = Self {
            draft,
            store,
            assembler,
            current: 1,
            completed: BTreeSet::new(),
            errors: Vec::new(),
            derived: DerivedState::default(),
            save_status: SaveStatus::Idle,
            autosave: AutosaveTimer::new(config.autosave_debounce),
            today: None,
        };
        controller.refresh();
        controller
    }

    /// Resume a stored draft, or start a fresh one of `will_type` under the
    /// given key if none exists.
    pub async fn open(
        store: Arc<dyn DraftStore>,
        assembler: Arc<dyn DocumentAssembler>,
        owner: OwnerId,
        will: WillId,
        will_type: WillType,
        config: WizardConfig,
    ) -> Result<Self, StoreError> {
        let draft = match store.load(owner, will).await? {
            Some(draft) => {
                tracing::info!(owner_id = %owner, will_id = %will, revision = draft.revision, "resuming draft");
                draft
            }
            None => {
                tracing::info!(owner_id = %owner, will_id = %will, %will_type, "starting new draft");
                WillDraft::with_id(owner, will, will_type)
            }
        };
        Ok(Self::new(draft, store, assembler, config))
    }

    /// Pin the reference date used for ages and date checks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self.refresh();
        self
    }

    fn ctx(&self) -> ValidationContext {
        self.today
            .map(ValidationContext::new)
            .unwrap_or_else(ValidationContext::current)
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn draft(&self) -> &WillDraft {
        &self.draft
    }

    /// 1-based.
    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn current_step_key(&self) -> StepKey {
        // `current` is kept within 1..=N and N >= 1 for every will type.
        self.draft
            .will_type
            .step_at(self.current)
            .unwrap_or(StepKey::Testator)
    }

    pub fn step_count(&self) -> usize {
        self.draft.will_type.step_count()
    }

    pub fn completed_steps(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The error to focus: earliest step in the plan, then earliest field by
    /// the step's declared order.
    pub fn first_invalid_field(&self) -> Option<&FieldError> {
        first_invalid_in_plan(self.draft.will_type, &self.errors)
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.is_dirty()
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn is_locked(&self, step: StepKey, path: &FieldPath) -> bool {
        self.derived.is_locked(step, path)
    }

    pub fn next_autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    // ─── Editing ────────────────────────────────────────────────────

    /// Set a field in a step's payload.
    ///
    /// # Errors
    ///
    /// [`WizardError::Locked`] for a derived field,
    /// [`WizardError::StepNotInPlan`] for a step the will type does not use,
    /// and [`WizardError::Draft`] for a path that cannot be written.
    pub fn update_field(&mut self, step: StepKey, path: &str, value: Value) -> Result<(), WizardError> {
        let path = FieldPath::parse(path).map_err(DraftError::from)?;
        self.check_editable(step, &path)?;
        self.draft.set_field_at(step, &path, value)?;
        self.after_edit(step, &path, Instant::now());
        Ok(())
    }

    /// Clear a field back to empty. Clearing a path that does not exist is
    /// a no-op.
    pub fn clear_field(&mut self, step: StepKey, path: &str) -> Result<(), WizardError> {
        let path = FieldPath::parse(path).map_err(DraftError::from)?;
        self.check_editable(step, &path)?;
        if self.draft.clear_field_at(step, &path) {
            self.after_edit(step, &path, Instant::now());
        }
        Ok(())
    }

    fn check_editable(&self, step: StepKey, path: &FieldPath) -> Result<(), WizardError> {
        let will_type = self.draft.will_type;
        if !will_type.includes(step) {
            return Err(WizardError::StepNotInPlan { step, will_type });
        }
        if self.derived.is_locked(step, path) {
            return Err(WizardError::Locked {
                step,
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn after_edit(&mut self, step: StepKey, path: &FieldPath, now: Instant) {
        self.errors
            .retain(|e| !(e.step == step && (e.path.starts_with(path) || path.starts_with(&e.path))));
        self.autosave.arm(now);
        self.refresh();
    }

    /// Re-apply derived values and clear inactive answers.
    fn refresh(&mut self) {
        let today = self.ctx().today;
        if normalize(&mut self.draft, today) {
            tracing::debug!(will_id = %self.draft.id, "draft normalized");
        }
        self.derived = resolve_derived(&self.draft);
    }

    // ─── Navigation ─────────────────────────────────────────────────

    /// Validate the current step and move forward if it passes.
    pub async fn go_next(&mut self) -> StepTransition {
        self.refresh();
        let step = self.current_step_key();
        let errors = validate_step(step, self.draft.section(step), &self.ctx());
        if !errors.is_empty() {
            tracing::debug!(will_id = %self.draft.id, %step, count = errors.len(), "step blocked");
            let error_count = errors.len();
            self.errors = errors;
            return StepTransition::Blocked { error_count };
        }

        self.errors.clear();
        self.completed.insert(self.current);
        self.persist().await;

        if self.current < self.step_count() {
            let from = self.current;
            self.current += 1;
            StepTransition::Advanced { from, to: self.current }
        } else {
            StepTransition::AtFinalStep
        }
    }

    /// Step back. Never validates or saves. Returns whether the step changed.
    pub fn go_previous(&mut self) -> bool {
        if self.current > 1 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Validate the whole draft, save it, and hand it to the assembler.
    pub async fn submit(&mut self) -> Result<AssembledDocument, WizardError> {
        let last = self.step_count();
        if self.current != last {
            return Err(WizardError::NotAtFinalStep {
                current: self.current,
                last,
            });
        }

        self.refresh();
        let validated = match validate_draft(&self.draft, &self.ctx()) {
            Ok(validated) => validated,
            Err(errors) => {
                let count = errors.len();
                tracing::info!(will_id = %self.draft.id, count, "submit blocked by validation");
                self.errors = errors;
                return Err(WizardError::Invalid { count });
            }
        };

        self.errors.clear();
        self.completed.insert(last);
        self.persist().await;

        let document = self.assembler.assemble(&validated)?;
        tracing::info!(will_id = %self.draft.id, digest = %document.digest, "will submitted");
        Ok(document)
    }

    // ─── Saving ─────────────────────────────────────────────────────

    /// Explicit save. One write, no validation.
    pub async fn save_progress(&mut self) -> &SaveStatus {
        self.persist().await;
        &self.save_status
    }

    /// Save if the debounce window has passed and there are unsaved edits.
    /// Returns whether a save was attempted.
    pub async fn poll_autosave(&mut self, now: Instant) -> bool {
        if !self.autosave.is_due(now) {
            return false;
        }
        if !self.draft.is_dirty() {
            self.autosave.disarm();
            return false;
        }
        self.persist().await;
        true
    }

    async fn persist(&mut self) {
        self.autosave.disarm();
        let snapshot = self.draft.snapshot_for_save();
        let (owner, will, revision) = (snapshot.owner, snapshot.id, snapshot.revision);
        let store = Arc::clone(&self.store);

        // The spawned task finishes the write even if this future is dropped.
        let handle = tokio::spawn(async move { store.save_full(owner, will, &snapshot).await });

        self.save_status = match handle.await {
            Ok(Ok(outcome)) => {
                let at = Timestamp::now();
                self.draft.mark_saved(at);
                match outcome {
                    SaveOutcome::Durable => {
                        tracing::debug!(will_id = %will, revision, "draft saved");
                        SaveStatus::Saved { at }
                    }
                    SaveOutcome::Cached { reason } => {
                        tracing::warn!(will_id = %will, revision, %reason, "draft saved to cache only");
                        SaveStatus::SavedLocally { at, reason }
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!(will_id = %will, revision, error = %e, "draft save failed");
                SaveStatus::Failed {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(will_id = %will, revision, error = %e, "draft save task failed");
                SaveStatus::Failed {
                    reason: "save task did not complete".into(),
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::OutlineAssembler;
    use serde_json::json;
    use testament_store::MemoryDraftStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn controller(will_type: WillType) -> (MemoryDraftStore, WizardController) {
        let store = MemoryDraftStore::new();
        let draft = WillDraft::new(OwnerId::new(), will_type);
        let c = WizardController::new(
            draft,
            Arc::new(store.clone()),
            Arc::new(OutlineAssembler),
            WizardConfig::default(),
        )
        .with_today(today());
        (store, c)
    }

    #[test]
    fn starts_on_step_one_clean() {
        let (_, c) = controller(WillType::Simple);
        assert_eq!(c.current_step(), 1);
        assert_eq!(c.current_step_key(), StepKey::Testator);
        assert!(c.completed_steps().is_empty());
        assert!(!c.is_dirty());
        assert_eq!(c.save_status(), &SaveStatus::Idle);
        assert_eq!(c.next_autosave_deadline(), None);
    }

    #[test]
    fn go_previous_stops_at_one() {
        let (_, mut c) = controller(WillType::Simple);
        assert!(!c.go_previous());
        assert_eq!(c.current_step(), 1);
    }

    #[test]
    fn update_field_marks_dirty_and_arms_autosave() {
        let (_, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Testator, "fullName", json!("Ravi")).unwrap();
        assert!(c.is_dirty());
        assert!(c.next_autosave_deadline().is_some());
    }

    #[test]
    fn comprehensive_only_step_is_rejected_for_simple_will() {
        let (_, mut c) = controller(WillType::Simple);
        let err = c
            .update_field(StepKey::Charities, "hasCharities", json!(true))
            .unwrap_err();
        assert!(matches!(err, WizardError::StepNotInPlan { .. }));
    }

    #[test]
    fn minor_child_locks_has_minor_children() {
        let (_, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Family, "hasChildren", json!(true)).unwrap();
        c.update_field(StepKey::Family, "children.0.isMinor", json!(true)).unwrap();

        let flag = FieldPath::parse("hasMinorChildren").unwrap();
        assert!(c.is_locked(StepKey::Guardianship, &flag));
        assert_eq!(c.draft().get_field(StepKey::Guardianship, &flag), Some(&json!(true)));

        let err = c
            .update_field(StepKey::Guardianship, "hasMinorChildren", json!(false))
            .unwrap_err();
        assert!(matches!(err, WizardError::Locked { .. }));

        c.update_field(StepKey::Family, "children.0.isMinor", json!(false)).unwrap();
        assert!(!c.is_locked(StepKey::Guardianship, &flag));
        c.update_field(StepKey::Guardianship, "hasMinorChildren", json!(false)).unwrap();
    }

    #[test]
    fn changing_marital_status_clears_spouse() {
        let (_, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Family, "maritalStatus", json!("Married")).unwrap();
        c.update_field(StepKey::Family, "spouse.name", json!("Priya")).unwrap();
        c.update_field(StepKey::Family, "maritalStatus", json!("Single")).unwrap();
        assert_eq!(c.draft().section(StepKey::Family)["spouse"], Value::Null);
    }

    #[test]
    fn spouse_entered_before_marital_status_is_kept() {
        let (_, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Family, "spouse.name", json!("Priya")).unwrap();
        assert_eq!(c.draft().section(StepKey::Family)["spouse"]["name"], json!("Priya"));

        c.update_field(StepKey::Family, "maritalStatus", json!("Married")).unwrap();
        assert_eq!(c.draft().section(StepKey::Family)["spouse"]["name"], json!("Priya"));
    }

    #[test]
    fn guardian_entered_before_beneficiary_age_is_kept() {
        let (_, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Beneficiaries, "beneficiaries.0.guardianName", json!("Asha"))
            .unwrap();
        let entry = &c.draft().section(StepKey::Beneficiaries)["beneficiaries"][0];
        assert_eq!(entry["guardianName"], json!("Asha"));

        c.update_field(StepKey::Beneficiaries, "beneficiaries.0.dateOfBirth", json!("1990-01-01"))
            .unwrap();
        let entry = &c.draft().section(StepKey::Beneficiaries)["beneficiaries"][0];
        assert_eq!(entry["guardianName"], Value::Null);
    }

    #[test]
    fn children_entered_before_has_children_are_kept() {
        let (_, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Family, "children.0.name", json!("Ira")).unwrap();
        assert_eq!(c.draft().section(StepKey::Family)["children"][0]["name"], json!("Ira"));

        c.update_field(StepKey::Family, "hasChildren", json!(false)).unwrap();
        assert_eq!(c.draft().section(StepKey::Family)["children"], json!([]));
    }

    #[tokio::test]
    async fn blocked_step_surfaces_every_error_in_declared_order() {
        let (store, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Testator, "pan", json!("bad")).unwrap();
        let outcome = c.go_next().await;
        let StepTransition::Blocked { error_count } = outcome else {
            panic!("expected blocked, got {outcome:?}");
        };
        assert!(error_count > 1);
        assert_eq!(c.errors().len(), error_count);
        assert_eq!(c.first_invalid_field().unwrap().path.to_string(), "fullName");
        assert_eq!(c.current_step(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn submit_before_last_step_is_rejected() {
        let (_, mut c) = controller(WillType::Simple);
        assert!(matches!(
            c.submit().await,
            Err(WizardError::NotAtFinalStep { current: 1, last: 8 })
        ));
    }

    #[tokio::test]
    async fn save_progress_writes_once_without_validating() {
        let (store, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Testator, "fullName", json!("Ravi")).unwrap();
        let status = c.save_progress().await.clone();
        assert!(matches!(status, SaveStatus::Saved { .. }));
        assert!(!c.is_dirty());
        assert!(c.errors().is_empty());
        let stored = store.get(c.draft().owner, c.draft().id).unwrap();
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn autosave_fires_after_the_debounce_window() {
        let (store, mut c) = controller(WillType::Simple);
        c.update_field(StepKey::Testator, "city", json!("Pune")).unwrap();
        let deadline = c.next_autosave_deadline().unwrap();

        assert!(!c.poll_autosave(Instant::now()).await);
        assert!(c.poll_autosave(deadline).await);
        assert!(!c.is_dirty());
        assert!(store.contains(c.draft().owner, c.draft().id));
        assert_eq!(c.next_autosave_deadline(), None);
        assert!(!c.poll_autosave(deadline).await);
    }
}
