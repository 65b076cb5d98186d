//! # testament-core: Foundational Types for the Will Drafting Wizard
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! primitives every other crate speaks in: identifiers, timestamps, the single
//! shared age calculation, Indian government-ID formats, step keys, field
//! paths, and field-level validation errors.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `OwnerId` and `WillId` are distinct
//!    types; a draft is always addressed by the pair.
//!
//! 2. **One age definition.** [`calculate_age`] is the only place whole-year
//!    ages are derived. Testator, spouse, beneficiary, guardian, executor, and
//!    witness checks all route through it.
//!
//! 3. **Fixed formats.** [`Pan`] and [`Aadhaar`] validate at construction with
//!    constant rules. There is no configuration knob for them.
//!
//! 4. **Errors are data.** [`FieldError`] carries the step, the dot-delimited
//!    path inside the step payload, a machine-readable kind, and a message.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `testament-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod field;
pub mod identity;
pub mod step;
pub mod temporal;

pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{DraftError, ValidationError};
pub use field::{FieldError, FieldErrorKind, FieldPath, PathSegment};
pub use identity::{Aadhaar, OwnerId, Pan, WillId};
pub use step::{StepKey, WillType};
pub use temporal::{calculate_age, parse_date, Timestamp, MAJORITY_AGE};
