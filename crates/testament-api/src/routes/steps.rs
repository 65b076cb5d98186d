//! # Step Plan API
//!
//! The ordered step plan for a will type, and stateless validation of a
//! single step payload. Neither endpoint touches stored drafts.

use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use testament_core::{FieldError, StepKey, WillType};
use testament_schema::{step_plan, validate_step, StepDefinition};
use utoipa::{IntoParams, ToSchema};

use super::TodayQuery;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, extract_query};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StepPlanQuery {
    /// `simple` or `comprehensive`. Defaults to `simple`.
    pub will_type: Option<String>,
}

/// One step in a plan.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    /// 1-based position in the plan.
    pub position: usize,
    pub key: String,
    pub title: String,
    /// Declared field patterns in on-screen order. `*` matches a list index.
    pub fields: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepPlanResponse {
    pub will_type: String,
    pub step_count: usize,
    /// Idle time clients should wait after the last edit before saving.
    pub autosave_debounce_ms: u64,
    pub steps: Vec<StepSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepValidationResponse {
    pub step: String,
    pub valid: bool,
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<FieldError>,
    /// The error to focus: earliest field in the step's declared order.
    #[schema(value_type = Option<Object>)]
    pub first_invalid_field: Option<FieldError>,
}

/// Build the steps router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/steps", get(get_step_plan))
        .route("/v1/steps/{step}/validate", post(validate_step_payload))
}

pub(crate) fn parse_step(raw: &str) -> Result<StepKey, AppError> {
    StepKey::from_str(raw).map_err(|e| AppError::NotFound(e.to_string()))
}

fn summarize(position: usize, def: StepDefinition) -> StepSummary {
    StepSummary {
        position,
        key: def.key.as_str().to_string(),
        title: def.title.to_string(),
        fields: def.fields.iter().map(|f| (*f).to_string()).collect(),
    }
}

/// GET /v1/steps: Step plan for a will type.
#[utoipa::path(
    get,
    path = "/v1/steps",
    params(StepPlanQuery),
    responses(
        (status = 200, description = "Ordered step plan", body = StepPlanResponse),
        (status = 400, description = "Unknown will type", body = crate::error::ErrorBody),
    ),
    tag = "steps"
)]
async fn get_step_plan(
    State(state): State<AppState>,
    query: Result<Query<StepPlanQuery>, QueryRejection>,
) -> Result<Json<StepPlanResponse>, AppError> {
    let query = extract_query(query)?;
    let will_type = match query.will_type.as_deref() {
        Some(raw) => WillType::from_str(raw).map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => WillType::default(),
    };

    let steps: Vec<StepSummary> = step_plan(will_type)
        .into_iter()
        .enumerate()
        .map(|(i, def)| summarize(i + 1, def))
        .collect();

    Ok(Json(StepPlanResponse {
        will_type: will_type.as_str().to_string(),
        step_count: steps.len(),
        autosave_debounce_ms: u64::try_from(state.config.autosave_debounce.as_millis())
            .unwrap_or(u64::MAX),
        steps,
    }))
}

/// POST /v1/steps/{step}/validate: Validate one step payload.
#[utoipa::path(
    post,
    path = "/v1/steps/{step}/validate",
    params(
        ("step" = String, Path, description = "Step key, e.g. `testator`"),
        TodayQuery,
    ),
    request_body(content = Object, description = "The step payload"),
    responses(
        (status = 200, description = "Validation result", body = StepValidationResponse),
        (status = 404, description = "Unknown step", body = crate::error::ErrorBody),
    ),
    tag = "steps"
)]
async fn validate_step_payload(
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<TodayQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StepValidationResponse>, AppError> {
    let step = parse_step(&extract_path(path)?)?;
    let ctx = extract_query(query)?.context()?;
    let payload = extract_json(body)?;

    let errors = validate_step(step, &payload, &ctx);
    let first_invalid_field = StepDefinition::of(step).first_invalid(&errors).cloned();
    tracing::debug!(step = %step, errors = errors.len(), "validated step payload");

    Ok(Json(StepValidationResponse {
        step: step.as_str().to_string(),
        valid: errors.is_empty(),
        errors,
        first_invalid_field,
    }))
}
