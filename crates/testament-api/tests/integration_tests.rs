//! # Integration Tests for testament-api
//!
//! Health probes, the step plan, stateless step validation, draft save and
//! load with revision checks, section saves, full-draft validation, outline
//! assembly, and OpenAPI generation. Every test runs memory-only.

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use testament_api::state::AppState;
use testament_core::{OwnerId, WillId};
use testament_schema::WillDraft;

const TODAY: &str = "2026-10-19";

/// Helper: build the test app with memory-only drafts.
fn test_app() -> axum::Router {
    testament_api::app(AppState::new())
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn complete_draft() -> WillDraft {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path.pop();
    let text = std::fs::read_to_string(path.join("fixtures/drafts/complete_comprehensive.yaml"))
        .expect("fixture readable");
    serde_yaml::from_str(&text).expect("fixture parses")
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn draft_uri(owner: OwnerId, will: WillId) -> String {
    format!("/v1/owners/{owner}/wills/{will}")
}

fn save_body(draft: &WillDraft, revision: Option<u64>) -> Value {
    let mut body = json!({
        "willType": draft.will_type.as_str(),
        "sections": draft.sections(),
    });
    if let Some(r) = revision {
        body["revision"] = json!(r);
    }
    body
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app()
        .oneshot(empty_request("GET", "/health/liveness"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app()
        .oneshot(empty_request("GET", "/health/readiness"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Step Plan ----------------------------------------------------------------

#[tokio::test]
async fn test_step_plan_defaults_to_simple() {
    let response = test_app()
        .oneshot(empty_request("GET", "/v1/steps"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["willType"], "simple");
    assert_eq!(body["stepCount"], 8);
    assert_eq!(body["autosaveDebounceMs"], 3000);
    assert_eq!(body["steps"][0]["key"], "testator");
    assert_eq!(body["steps"][0]["position"], 1);
    assert_eq!(body["steps"][7]["key"], "review");
}

#[tokio::test]
async fn test_comprehensive_plan_has_ten_steps() {
    let response = test_app()
        .oneshot(empty_request("GET", "/v1/steps?willType=comprehensive"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["stepCount"], 10);
    let keys: Vec<&str> = body["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["key"].as_str().unwrap())
        .collect();
    assert!(keys.contains(&"charities"));
    assert!(keys.contains(&"disputeResolution"));
    assert_eq!(keys.last(), Some(&"review"));
}

#[tokio::test]
async fn test_unknown_will_type_is_bad_request() {
    let response = test_app()
        .oneshot(empty_request("GET", "/v1/steps?willType=holographic"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// -- Step Validation ----------------------------------------------------------

#[tokio::test]
async fn test_validate_step_reports_first_invalid_field() {
    let payload = json!({
        "fullName": "Ravi Shankar Kumar",
        "dateOfBirth": "1968-03-14",
        "pan": "ABCDE12345"
    });
    let response = test_app()
        .oneshot(json_request(
            "POST",
            &format!("/v1/steps/testator/validate?today={TODAY}"),
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], false);
    let errors = body["errors"].as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e["path"] == "pan" && e["kind"] == "invalidFormat"));
    // gender precedes pan in the declared order and is missing.
    assert_eq!(body["firstInvalidField"]["path"], "gender");
}

#[tokio::test]
async fn test_validate_step_underage_testator() {
    let payload = json!({"dateOfBirth": "2010-01-01"});
    let response = test_app()
        .oneshot(json_request(
            "POST",
            &format!("/v1/steps/testator/validate?today={TODAY}"),
            &payload,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["path"] == "dateOfBirth" && e["kind"] == "underage"));
}

#[tokio::test]
async fn test_validate_unknown_step_is_404() {
    let response = test_app()
        .oneshot(json_request("POST", "/v1/steps/pets/validate", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate_step_bad_today_is_422() {
    let response = test_app()
        .oneshot(json_request(
            "POST",
            "/v1/steps/review/validate?today=19-10-2026",
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_validate_step_rejects_non_json_body() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/steps/review/validate")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Draft Persistence --------------------------------------------------------

#[tokio::test]
async fn test_get_missing_draft_is_404() {
    let response = test_app()
        .oneshot(empty_request("GET", &draft_uri(OwnerId::new(), WillId::new())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_will_id_is_bad_request() {
    let uri = format!("/v1/owners/{}/wills/not-a-uuid", OwnerId::new());
    let response = test_app()
        .oneshot(empty_request("GET", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let app = test_app();
    let draft = complete_draft();
    let uri = draft_uri(draft.owner, draft.id);

    let response = app
        .clone()
        .oneshot(json_request("PUT", &uri, &save_body(&draft, None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;
    assert_eq!(saved["revision"], 1);
    // No database configured: the cache holds the write.
    assert_eq!(saved["persisted"], "cached");
    assert!(saved["reason"].is_string());

    let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let loaded = body_json(response).await;
    assert_eq!(loaded["willType"], "comprehensive");
    assert_eq!(loaded["revision"], 1);
    assert_eq!(
        loaded["sections"]["testator"]["fullName"],
        "Ravi Shankar Kumar"
    );
}

#[tokio::test]
async fn test_stale_revision_is_conflict() {
    let app = test_app();
    let draft = complete_draft();
    let uri = draft_uri(draft.owner, draft.id);

    for expected in [1, 2] {
        let response = app
            .clone()
            .oneshot(json_request("PUT", &uri, &save_body(&draft, None)))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["revision"], expected);
    }

    let response = app
        .clone()
        .oneshot(json_request("PUT", &uri, &save_body(&draft, Some(1))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(json_request("PUT", &uri, &save_body(&draft, Some(2))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["revision"], 3);
}

#[tokio::test]
async fn test_save_rejects_non_object_section() {
    let uri = draft_uri(OwnerId::new(), WillId::new());
    let body = json!({"willType": "simple", "sections": {"testator": [1, 2]}});
    let response = test_app()
        .oneshot(json_request("PUT", &uri, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_section_save_updates_one_step() {
    let app = test_app();
    let owner = OwnerId::new();
    let will = WillId::new();
    let uri = draft_uri(owner, will);

    let response = app
        .clone()
        .oneshot(json_request("PUT", &uri, &json!({"willType": "simple"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("{uri}/sections/review"),
            &json!({"placeOfSigning": "Pune", "soundMind": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let loaded = body_json(app.oneshot(empty_request("GET", &uri)).await.unwrap()).await;
    assert_eq!(loaded["sections"]["review"]["placeOfSigning"], "Pune");
}

#[tokio::test]
async fn test_section_save_to_missing_draft_is_404() {
    let uri = format!(
        "{}/sections/review",
        draft_uri(OwnerId::new(), WillId::new())
    );
    let response = test_app()
        .oneshot(json_request("PUT", &uri, &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_section_outside_plan_is_422() {
    let app = test_app();
    let uri = draft_uri(OwnerId::new(), WillId::new());
    app.clone()
        .oneshot(json_request("PUT", &uri, &json!({"willType": "simple"})))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("{uri}/sections/charities"),
            &json!({"hasCharities": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// -- Draft Validation & Outline -----------------------------------------------

#[tokio::test]
async fn test_validate_stored_complete_draft() {
    let app = test_app();
    let draft = complete_draft();
    let uri = draft_uri(draft.owner, draft.id);
    app.clone()
        .oneshot(json_request("PUT", &uri, &save_body(&draft, None)))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("POST", &format!("{uri}/validate?today={TODAY}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert!(body["firstInvalidField"].is_null());
}

#[tokio::test]
async fn test_validate_stored_focuses_earliest_step() {
    let app = test_app();
    let mut draft = complete_draft();
    draft
        .set_field(testament_core::StepKey::Review, "placeOfSigning", Value::Null)
        .unwrap();
    draft
        .set_field(testament_core::StepKey::Testator, "pan", json!("ABCDE12345"))
        .unwrap();
    let uri = draft_uri(draft.owner, draft.id);
    app.clone()
        .oneshot(json_request("PUT", &uri, &save_body(&draft, None)))
        .await
        .unwrap();

    let body = body_json(
        app.oneshot(empty_request("POST", &format!("{uri}/validate?today={TODAY}")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    assert_eq!(body["firstInvalidField"]["step"], "testator");
    assert_eq!(body["firstInvalidField"]["path"], "pan");
}

#[tokio::test]
async fn test_outline_of_complete_draft() {
    let app = test_app();
    let draft = complete_draft();
    let uri = draft_uri(draft.owner, draft.id);
    app.clone()
        .oneshot(json_request("PUT", &uri, &save_body(&draft, None)))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("POST", &format!("{uri}/outline?today={TODAY}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "LAST WILL AND TESTAMENT OF RAVI SHANKAR KUMAR");
    assert_eq!(body["sections"][2]["heading"], "Appointment of Guardian");
    assert_eq!(body["sections"][2]["letter"], "C");
    assert!(body["digest"].as_str().unwrap().starts_with("sha256:"));
    assert!(body["text"].as_str().unwrap().contains("XXXX XXXX 9012"));
    assert!(!body["text"].as_str().unwrap().contains("123456789012"));
}

#[tokio::test]
async fn test_outline_of_invalid_draft_is_422_with_details() {
    let app = test_app();
    let uri = draft_uri(OwnerId::new(), WillId::new());
    app.clone()
        .oneshot(json_request("PUT", &uri, &json!({"willType": "simple"})))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("POST", &format!("{uri}/outline?today={TODAY}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_DRAFT");
    assert!(!body["error"]["details"].as_array().unwrap().is_empty());
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_lists_routes() {
    let response = test_app()
        .oneshot(empty_request("GET", "/openapi.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/v1/steps"));
    assert!(paths.contains_key("/v1/owners/{owner}/wills/{will}/outline"));
}
