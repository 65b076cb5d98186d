//! # Postgres Draft Store
//!
//! Durable storage in the `will_drafts` table, one row per
//! `(owner_id, will_id)`. Step payloads are kept together in a `jsonb`
//! column keyed by step key. Full writes are an upsert guarded on
//! `revision`. Section writes patch one key with `jsonb_set`.
//!
//! The database is optional. Hosts without a connection string run on
//! [`FallbackDraftStore::memory_only`](crate::FallbackDraftStore::memory_only).

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use testament_core::{OwnerId, StepKey, Timestamp, WillId, WillType};
use testament_schema::WillDraft;
use uuid::Uuid;

use crate::{check_key, DraftStore, SaveOutcome, StoreError};

#[derive(Debug, Clone)]
pub struct PgDraftStore {
    pool: PgPool,
}

impl PgDraftStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool on `url` and run migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(url)
            .await?;
        tracing::info!("connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("draft store migrations applied");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DraftRow {
    owner_id: Uuid,
    will_id: Uuid,
    will_type: String,
    sections: Value,
    revision: i64,
    last_saved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl DraftRow {
    fn into_draft(self) -> Result<WillDraft, StoreError> {
        let will = WillId::from_uuid(self.will_id);
        let corrupt = |reason: String| {
            tracing::error!(will_id = %will, %reason, "corrupt will_drafts row");
            StoreError::Corrupt { will, reason }
        };

        let will_type = WillType::from_str(&self.will_type).map_err(|e| corrupt(e.to_string()))?;
        let revision = u64::try_from(self.revision)
            .map_err(|_| corrupt(format!("negative revision {}", self.revision)))?;
        let Value::Object(map) = self.sections else {
            return Err(corrupt("sections column is not a JSON object".into()));
        };

        let mut sections = BTreeMap::new();
        for (key, payload) in map {
            match StepKey::from_str(&key) {
                Ok(step) => {
                    sections.insert(step, payload);
                }
                Err(_) => {
                    tracing::warn!(will_id = %will, key = %key, "dropping unknown section key");
                }
            }
        }

        Ok(WillDraft::from_parts(
            OwnerId::from_uuid(self.owner_id),
            will,
            will_type,
            sections,
            revision,
            self.last_saved_at.map(Timestamp::from_utc),
            Timestamp::from_utc(self.created_at),
        ))
    }
}

fn sections_json(draft: &WillDraft) -> Result<Value, sqlx::Error> {
    serde_json::to_value(draft.sections()).map_err(|e| {
        tracing::error!(error = %e, will_id = %draft.id, "failed to serialize draft sections");
        sqlx::Error::Encode(Box::new(e))
    })
}

#[async_trait]
impl DraftStore for PgDraftStore {
    async fn load(&self, owner: OwnerId, will: WillId) -> Result<Option<WillDraft>, StoreError> {
        let row = sqlx::query_as::<_, DraftRow>(
            "SELECT owner_id, will_id, will_type, sections, revision, last_saved_at, created_at
             FROM will_drafts WHERE owner_id = $1 AND will_id = $2",
        )
        .bind(owner.as_uuid())
        .bind(will.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(DraftRow::into_draft).transpose()
    }

    async fn save_section(
        &self,
        owner: OwnerId,
        will: WillId,
        step: StepKey,
        payload: &Value,
    ) -> Result<SaveOutcome, StoreError> {
        let result = sqlx::query(
            "UPDATE will_drafts
             SET sections = jsonb_set(sections, ARRAY[$3]::text[], $4, true),
                 last_saved_at = now(),
                 updated_at = now()
             WHERE owner_id = $1 AND will_id = $2",
        )
        .bind(owner.as_uuid())
        .bind(will.as_uuid())
        .bind(step.as_str())
        .bind(payload)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { owner, will });
        }
        Ok(SaveOutcome::Durable)
    }

    async fn save_full(
        &self,
        owner: OwnerId,
        will: WillId,
        draft: &WillDraft,
    ) -> Result<SaveOutcome, StoreError> {
        check_key(owner, will, draft)?;
        let sections = sections_json(draft)?;
        let revision = i64::try_from(draft.revision).map_err(|e| {
            tracing::error!(will_id = %will, revision = draft.revision, "revision out of range");
            StoreError::Database(sqlx::Error::Encode(Box::new(e)))
        })?;

        let result = sqlx::query(
            "INSERT INTO will_drafts
                 (owner_id, will_id, will_type, sections, revision, last_saved_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, now(), $6, now())
             ON CONFLICT (owner_id, will_id) DO UPDATE SET
                 will_type = EXCLUDED.will_type,
                 sections = EXCLUDED.sections,
                 revision = EXCLUDED.revision,
                 last_saved_at = EXCLUDED.last_saved_at,
                 updated_at = EXCLUDED.updated_at
             WHERE will_drafts.revision <= EXCLUDED.revision",
        )
        .bind(owner.as_uuid())
        .bind(will.as_uuid())
        .bind(draft.will_type.as_str())
        .bind(&sections)
        .bind(revision)
        .bind(draft.created_at.as_datetime())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(will_id = %will, revision, "ignoring stale full snapshot");
        }
        Ok(SaveOutcome::Durable)
    }
}
