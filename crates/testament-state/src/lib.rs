//! # testament-state: Wizard Step Controller
//!
//! Drives a [`WillDraft`](testament_schema::WillDraft) through its steps.
//!
//! ## State
//!
//! ```text
//! current_step ∈ 1..=N      completed_steps ⊆ 1..=N      errors: Vec<FieldError>
//!
//!   go_next      validate step ── errors ──▶ stay, surface all, zero writes
//!                     │
//!                     └── ok ──▶ mark complete, one save, advance if < N
//!   go_previous  step - 1 if > 1, no validation, no write
//!   submit       only at N: validate whole draft, one save, assemble
//! ```
//!
//! Every edit goes through [`WizardController::update_field`], which rejects
//! locked fields, re-applies derived values, clears answers that no longer
//! apply, and re-arms the autosave debounce.
//!
//! ## Crate Policy
//!
//! - Validation failures are data on the controller, never `Err`.
//! - Save failures never block navigation. They show up in
//!   [`SaveStatus`] and are logged.
//! - Saves run on a spawned task so that a dropped caller does not cancel
//!   the write.

pub mod assembler;
pub mod autosave;
pub mod config;
pub mod error;
pub mod wizard;

pub use assembler::{
    AssembledDocument, DocumentAssembler, DocumentSection, OutlineAssembler, SignatureBlock,
};
pub use autosave::AutosaveTimer;
pub use config::{WizardConfig, DEFAULT_AUTOSAVE_DEBOUNCE};
pub use error::{AssemblyError, WizardError};
pub use wizard::{SaveStatus, StepTransition, WizardController};
