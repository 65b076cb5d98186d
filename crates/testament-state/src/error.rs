//! Controller and assembler errors.
//!
//! Field validation failures are not here; they live on the controller as
//! [`FieldError`](testament_core::FieldError) data.

use testament_core::{DraftError, StepKey, WillType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("submit is only available on step {last}; current step is {current}")]
    NotAtFinalStep { current: usize, last: usize },

    /// The draft failed whole-draft validation. The errors are on the
    /// controller.
    #[error("draft has {count} invalid field(s)")]
    Invalid { count: usize },

    #[error("{step}.{path} is derived from other answers and cannot be edited")]
    Locked { step: StepKey, path: String },

    #[error("step {step} is not part of a {will_type} will")]
    StepNotInPlan { step: StepKey, will_type: WillType },

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("document assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("section {step} could not be read: {reason}")]
    Unreadable { step: StepKey, reason: String },
}
