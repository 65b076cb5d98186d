//! # Draft API
//!
//! Load and save will drafts, validate a stored draft as a whole, and
//! assemble its outline. Drafts are addressed by `(owner, will)`.
//!
//! Saves always succeed once the cache has the write. The response's
//! `persisted` field says whether the durable store has it too.

use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use testament_core::{FieldError, OwnerId, StepKey, Timestamp, WillId, WillType};
use testament_schema::{first_invalid_in_plan, normalize, validate_draft, WillDraft};
use testament_state::{DocumentSection, SignatureBlock};
use testament_store::{DraftStore, SaveOutcome};
use utoipa::ToSchema;

use super::steps::parse_step;
use super::TodayQuery;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, extract_query, extract_validated_json, Validate};
use crate::state::AppState;

// ─── DTOs ───────────────────────────────────────────────────────────

/// Full draft save.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    #[schema(value_type = String, example = "comprehensive")]
    pub will_type: WillType,
    /// Step payloads keyed by step key. Missing steps get their defaults.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub sections: BTreeMap<StepKey, Value>,
    /// The revision the client last loaded. A save based on an older
    /// revision than the stored one is rejected.
    #[serde(default)]
    pub revision: Option<u64>,
}

impl Validate for SaveDraftRequest {
    fn validate(&self) -> Result<(), String> {
        for (step, payload) in &self.sections {
            if !payload.is_object() {
                return Err(format!("section {step} must be a JSON object"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    #[schema(value_type = String, format = Uuid)]
    pub will_id: WillId,
    pub revision: u64,
    /// `durable` or `cached`.
    pub persisted: String,
    /// Why the write is only cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SaveResponse {
    fn new(will_id: WillId, revision: u64, outcome: SaveOutcome) -> Self {
        let (persisted, reason) = match outcome {
            SaveOutcome::Durable => ("durable", None),
            SaveOutcome::Cached { reason } => ("cached", Some(reason)),
        };
        Self {
            will_id,
            revision,
            persisted: persisted.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftValidationResponse {
    pub valid: bool,
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<FieldError>,
    /// Earliest step in the plan, then earliest field in that step.
    #[schema(value_type = Option<Object>)]
    pub first_invalid_field: Option<FieldError>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutlineResponse {
    #[schema(value_type = String, format = Uuid)]
    pub will_id: WillId,
    pub title: String,
    #[schema(value_type = Vec<Object>)]
    pub sections: Vec<DocumentSection>,
    #[schema(value_type = Vec<Object>)]
    pub signatures: Vec<SignatureBlock>,
    /// `sha256:<hex>` over `text`.
    pub digest: String,
    pub text: String,
}

// ─── Router ─────────────────────────────────────────────────────────

/// Build the drafts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/owners/{owner}/wills/{will}",
            get(get_draft).put(save_draft),
        )
        .route(
            "/v1/owners/{owner}/wills/{will}/sections/{step}",
            put(save_section),
        )
        .route("/v1/owners/{owner}/wills/{will}/validate", post(validate_stored))
        .route("/v1/owners/{owner}/wills/{will}/outline", post(assemble_outline))
}

async fn load_existing(state: &AppState, owner: OwnerId, will: WillId) -> Result<WillDraft, AppError> {
    state
        .drafts
        .load(owner, will)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no draft {will} for owner {owner}")))
}

// ─── Handlers ───────────────────────────────────────────────────────

/// GET /v1/owners/{owner}/wills/{will}: Load a draft.
#[utoipa::path(
    get,
    path = "/v1/owners/{owner}/wills/{will}",
    params(
        ("owner" = String, Path, description = "Owner ID (UUID)"),
        ("will" = String, Path, description = "Will ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Draft found", body = Object),
        (status = 404, description = "No such draft", body = crate::error::ErrorBody),
    ),
    tag = "drafts"
)]
async fn get_draft(
    State(state): State<AppState>,
    path: Result<Path<(OwnerId, WillId)>, PathRejection>,
) -> Result<Json<WillDraft>, AppError> {
    let (owner, will) = extract_path(path)?;
    load_existing(&state, owner, will).await.map(Json)
}

/// PUT /v1/owners/{owner}/wills/{will}: Save a full draft.
#[utoipa::path(
    put,
    path = "/v1/owners/{owner}/wills/{will}",
    params(
        ("owner" = String, Path, description = "Owner ID (UUID)"),
        ("will" = String, Path, description = "Will ID (UUID)"),
    ),
    request_body = SaveDraftRequest,
    responses(
        (status = 200, description = "Draft saved", body = SaveResponse),
        (status = 409, description = "Based on a stale revision", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed sections", body = crate::error::ErrorBody),
    ),
    tag = "drafts"
)]
async fn save_draft(
    State(state): State<AppState>,
    path: Result<Path<(OwnerId, WillId)>, PathRejection>,
    body: Result<Json<SaveDraftRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let (owner, will) = extract_path(path)?;
    let req = extract_validated_json(body)?;

    let existing = state.drafts.load(owner, will).await?;
    let stored_revision = existing.as_ref().map_or(0, |d| d.revision);
    if let Some(base) = req.revision {
        if base < stored_revision {
            return Err(AppError::Conflict(format!(
                "draft {will} is at revision {stored_revision}; save was based on revision {base}"
            )));
        }
    }

    let revision = stored_revision.max(req.revision.unwrap_or(0)) + 1;
    let created_at = existing.map_or_else(Timestamp::now, |d| d.created_at);
    let mut draft = WillDraft::from_parts(
        owner,
        will,
        req.will_type,
        req.sections,
        revision,
        None,
        created_at,
    );
    normalize(&mut draft, Timestamp::now().date());

    let outcome = state.drafts.save_full(owner, will, &draft).await?;
    tracing::info!(%owner, %will, revision, durable = outcome.is_durable(), "draft saved");
    Ok(Json(SaveResponse::new(will, revision, outcome)))
}

/// PUT /v1/owners/{owner}/wills/{will}/sections/{step}: Save one step.
#[utoipa::path(
    put,
    path = "/v1/owners/{owner}/wills/{will}/sections/{step}",
    params(
        ("owner" = String, Path, description = "Owner ID (UUID)"),
        ("will" = String, Path, description = "Will ID (UUID)"),
        ("step" = String, Path, description = "Step key"),
    ),
    request_body(content = Object, description = "The step payload"),
    responses(
        (status = 200, description = "Section saved", body = SaveResponse),
        (status = 404, description = "No such draft or step", body = crate::error::ErrorBody),
        (status = 422, description = "Step not used by this will type", body = crate::error::ErrorBody),
    ),
    tag = "drafts"
)]
async fn save_section(
    State(state): State<AppState>,
    path: Result<Path<(OwnerId, WillId, String)>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let (owner, will, raw_step) = extract_path(path)?;
    let step = parse_step(&raw_step)?;
    let payload = extract_json(body)?;
    if !payload.is_object() {
        return Err(AppError::BadRequest(format!(
            "section {step} must be a JSON object"
        )));
    }

    let mut draft = load_existing(&state, owner, will).await?;
    if !draft.will_type.includes(step) {
        return Err(AppError::Validation(format!(
            "step {step} is not part of a {} will",
            draft.will_type
        )));
    }

    // Inactive answers inside the step are dropped before storing. Derived
    // values that land in other steps are re-applied at validation time.
    draft.set_section(step, payload);
    normalize(&mut draft, Timestamp::now().date());

    let outcome = state
        .drafts
        .save_section(owner, will, step, draft.section(step))
        .await?;
    tracing::info!(%owner, %will, step = %step, durable = outcome.is_durable(), "section saved");
    Ok(Json(SaveResponse::new(will, draft.revision, outcome)))
}

/// POST /v1/owners/{owner}/wills/{will}/validate: Validate a stored draft.
#[utoipa::path(
    post,
    path = "/v1/owners/{owner}/wills/{will}/validate",
    params(
        ("owner" = String, Path, description = "Owner ID (UUID)"),
        ("will" = String, Path, description = "Will ID (UUID)"),
        TodayQuery,
    ),
    responses(
        (status = 200, description = "Validation result", body = DraftValidationResponse),
        (status = 404, description = "No such draft", body = crate::error::ErrorBody),
    ),
    tag = "drafts"
)]
async fn validate_stored(
    State(state): State<AppState>,
    path: Result<Path<(OwnerId, WillId)>, PathRejection>,
    query: Result<Query<TodayQuery>, QueryRejection>,
) -> Result<Json<DraftValidationResponse>, AppError> {
    let (owner, will) = extract_path(path)?;
    let ctx = extract_query(query)?.context()?;
    let draft = load_existing(&state, owner, will).await?;

    let response = match validate_draft(&draft, &ctx) {
        Ok(_) => DraftValidationResponse {
            valid: true,
            errors: Vec::new(),
            first_invalid_field: None,
        },
        Err(errors) => {
            let first_invalid_field = first_invalid_in_plan(draft.will_type, &errors).cloned();
            DraftValidationResponse {
                valid: false,
                errors,
                first_invalid_field,
            }
        }
    };
    Ok(Json(response))
}

/// POST /v1/owners/{owner}/wills/{will}/outline: Assemble the will outline.
#[utoipa::path(
    post,
    path = "/v1/owners/{owner}/wills/{will}/outline",
    params(
        ("owner" = String, Path, description = "Owner ID (UUID)"),
        ("will" = String, Path, description = "Will ID (UUID)"),
        TodayQuery,
    ),
    responses(
        (status = 200, description = "Assembled outline", body = OutlineResponse),
        (status = 404, description = "No such draft", body = crate::error::ErrorBody),
        (status = 422, description = "Draft is invalid; details lists field errors", body = crate::error::ErrorBody),
    ),
    tag = "drafts"
)]
async fn assemble_outline(
    State(state): State<AppState>,
    path: Result<Path<(OwnerId, WillId)>, PathRejection>,
    query: Result<Query<TodayQuery>, QueryRejection>,
) -> Result<Json<OutlineResponse>, AppError> {
    let (owner, will) = extract_path(path)?;
    let ctx = extract_query(query)?.context()?;
    let draft = load_existing(&state, owner, will).await?;

    let validated = validate_draft(&draft, &ctx).map_err(AppError::InvalidDraft)?;
    let document = state
        .assembler
        .assemble(&validated)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let text = document.render_text();
    Ok(Json(OutlineResponse {
        will_id: document.will_id,
        title: document.title,
        sections: document.sections,
        signatures: document.signatures,
        digest: document.digest.to_string(),
        text,
    }))
}
