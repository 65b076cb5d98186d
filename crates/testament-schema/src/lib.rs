//! # testament-schema: Field Schema & Conditional Rules
//!
//! Everything the wizard knows about what a valid answer is.
//!
//! ## Modules
//!
//! - [`payload`]: typed, lenient views over each step's JSON payload, and
//!   the default payload every new draft starts with.
//! - [`draft`]: the [`WillDraft`] aggregate with dotted-path edits.
//! - [`definition`]: per-step titles and declared field order, used to pick
//!   the first invalid field.
//! - [`rules`]: the conditional rule resolver. Required fields, inactive
//!   subtrees, and cross-step derived values, all as pure functions.
//! - [`validate`]: [`validate_step`] and [`validate_draft`].
//!
//! ## Crate Policy
//!
//! - Depends only on `testament-core` internally.
//! - No I/O. Every function here is a pure function of its inputs and the
//!   reference date carried by [`ValidationContext`].
//! - Validation outcomes are data. Nothing in this crate returns `Err` for a
//!   user's answers being wrong.

pub mod definition;
pub mod draft;
pub mod payload;
pub mod rules;
pub mod validate;

pub use definition::{first_invalid_in_plan, step_plan, StepDefinition};
pub use draft::{WillDraft, MAX_LIST_ENTRIES};
pub use payload::default_payload;
pub use rules::{
    equal_shares, normalize, resolve_derived, resolve_step, DerivedState, DerivedValue,
    RequiredField, Requirement, StepResolution, PROFESSIONAL_EXECUTOR,
};
pub use validate::{validate_draft, validate_step, ValidatedDraft, ValidationContext};
