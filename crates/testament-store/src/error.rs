//! Store error types.

use testament_core::{OwnerId, WillId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A section write targeted a draft that has never been saved.
    #[error("draft {will} for owner {owner} not found")]
    NotFound { owner: OwnerId, will: WillId },

    #[error("draft {draft_id} (owner {draft_owner}) cannot be written under key {owner}/{will}")]
    KeyMismatch {
        owner: OwnerId,
        will: WillId,
        draft_owner: OwnerId,
        draft_id: WillId,
    },

    /// A stored row could not be turned back into a draft.
    #[error("stored draft {will} is corrupt: {reason}")]
    Corrupt { will: WillId, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
