//! # testament-api: HTTP Service for the Will Drafting Wizard
//!
//! A thin Axum layer over the schema, store, and assembler crates. The
//! browser wizard runs its own controller; this service validates what it
//! sends and keeps its drafts.
//!
//! ## API Surface
//!
//! | Route                                              | Module               |
//! |----------------------------------------------------|----------------------|
//! | `GET /v1/steps`                                    | [`routes::steps`]    |
//! | `POST /v1/steps/{step}/validate`                   | [`routes::steps`]    |
//! | `GET, PUT /v1/owners/{owner}/wills/{will}`         | [`routes::drafts`]   |
//! | `PUT /v1/owners/{owner}/wills/{will}/sections/{step}` | [`routes::drafts`] |
//! | `POST /v1/owners/{owner}/wills/{will}/validate`    | [`routes::drafts`]   |
//! | `POST /v1/owners/{owner}/wills/{will}/outline`     | [`routes::drafts`]   |
//!
//! ## Middleware
//!
//! `TraceLayer` only. Authentication is the front end's concern.
//!
//! ## OpenAPI
//!
//! Generated with utoipa and served at `/openapi.json`.

pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::steps::router())
        .merge(routes::drafts::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe. 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
async fn readiness() -> &'static str {
    "ready"
}
