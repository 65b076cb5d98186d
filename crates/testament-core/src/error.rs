//! # Error Types
//!
//! Errors raised by constructors and draft edits. Field-level validation
//! outcomes are not errors in this sense; they are [`crate::FieldError`]
//! values returned as data.

use thiserror::Error;

/// A value failed a fixed format rule at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// PAN did not match `^[A-Z]{5}[0-9]{4}[A-Z]$`.
    #[error("invalid PAN {0:?}: expected five uppercase letters, four digits, one uppercase letter")]
    InvalidPan(String),

    /// Aadhaar was not exactly 12 digits.
    #[error("invalid Aadhaar number {0:?}: expected exactly 12 digits")]
    InvalidAadhaar(String),

    /// Date was not a calendar date in `YYYY-MM-DD` form.
    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Timestamp was not RFC 3339 UTC.
    #[error("invalid timestamp {0:?}: {1}")]
    InvalidTimestamp(String, String),

    /// Unknown step key.
    #[error("unknown step key {0:?}")]
    UnknownStep(String),

    /// Unknown will type.
    #[error("unknown will type {0:?}")]
    UnknownWillType(String),

    /// Field path was empty or contained an empty segment.
    #[error("invalid field path {0:?}")]
    InvalidFieldPath(String),
}

/// An edit could not be applied to a draft payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// A path segment addressed a scalar as if it were a container.
    #[error("cannot set {path}: segment {segment:?} addresses a non-container value")]
    NotAContainer {
        /// Full path that was being written.
        path: String,
        /// The segment at which navigation failed.
        segment: String,
    },

    /// An index segment exceeded the maximum list length.
    #[error("cannot set {path}: index {index} exceeds the maximum list length {max}")]
    IndexOutOfRange {
        /// Full path that was being written.
        path: String,
        /// The requested index.
        index: usize,
        /// Maximum number of entries a list may hold.
        max: usize,
    },

    /// The field is derived from other answers and cannot be edited directly.
    #[error("field {step}.{path} is locked while it is derived from other answers")]
    Locked {
        /// Step key of the locked field.
        step: String,
        /// Path of the locked field.
        path: String,
    },

    /// The path could not be parsed.
    #[error(transparent)]
    InvalidPath(#[from] ValidationError),
}
