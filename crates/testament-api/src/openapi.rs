//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI 3.1 document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Testament API",
        version = "0.1.0",
        description = "Step plans, step and draft validation, draft persistence, and will outlines for the will drafting wizard.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Steps
        crate::routes::steps::get_step_plan,
        crate::routes::steps::validate_step_payload,
        // Drafts
        crate::routes::drafts::get_draft,
        crate::routes::drafts::save_draft,
        crate::routes::drafts::save_section,
        crate::routes::drafts::validate_stored,
        crate::routes::drafts::assemble_outline,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::steps::StepSummary,
        crate::routes::steps::StepPlanResponse,
        crate::routes::steps::StepValidationResponse,
        crate::routes::drafts::SaveDraftRequest,
        crate::routes::drafts::SaveResponse,
        crate::routes::drafts::DraftValidationResponse,
        crate::routes::drafts::OutlineResponse,
    )),
    tags(
        (name = "steps", description = "Step plan and per-step validation"),
        (name = "drafts", description = "Draft persistence, validation, and outline assembly"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
