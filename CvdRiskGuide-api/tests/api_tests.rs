use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use cvd_risk_guide_api::api::create_application;
use cvd_risk_guide_api::config::AppConfig;
use serde_json::{json, Value};
use std::sync::Once;
use tower::ServiceExt;

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn create_test_app() -> Router {
    initialize();
    create_application(&AppConfig::default())
}

fn reference_form() -> Value {
    json!({
        "age": 60,
        "sex": "male",
        "weight_kg": 75.0,
        "height_cm": 170.0,
        "total_cholesterol": 5.2,
        "hdl": 1.3,
        "ldl": 3.0,
        "crp": 2.5,
        "hba1c": 5.8,
        "triglycerides": 1.2,
        "systolic_bp": 140,
        "egfr": 90,
        "newly_started": ["atorvastatin_high"]
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, body) = send_json(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["calculator"]["status"], "ok");
    assert_eq!(body["components"]["session_store"]["status"], "ok");
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn test_therapy_catalog() {
    let app = create_test_app();

    let (status, body) = send_json(&app, Method::GET, "/api/v1/cvd/therapies", None).await;

    assert_eq!(status, StatusCode::OK);
    let oral = body["oral"].as_array().unwrap();
    assert_eq!(oral.len(), 8);
    assert_eq!(oral[0]["drug"], "simvastatin_low");
    assert_eq!(body["advanced_threshold"], 1.8);
}

#[tokio::test]
async fn test_ldl_projection() {
    let app = create_test_app();

    let request = json!({
        "ldl": 3.0,
        "pre_admission": ["atorvastatin_high"],
        "newly_started": ["ezetimibe"]
    });
    let (status, body) = send_json(&app, Method::POST, "/api/v1/cvd/ldl-projection", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert!((body["projected"].as_f64().unwrap() - 1.2).abs() < 1e-9);
    assert_eq!(body["advanced_therapy_eligible"], false);
    assert_eq!(body["statement"], "Projected LDL-C: 1.2 mmol/L (↓ 1.8 mmol/L)");
}

#[tokio::test]
async fn test_assessment_lifecycle() {
    let app = create_test_app();

    // Nothing submitted yet
    let (status, body) = send_json(&app, Method::GET, "/api/v1/cvd/assessment", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    // Submit the reference patient
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/v1/cvd/assessment",
        Some(reference_form()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"][0], "5-year: 9.8%, 10-year: 18.6%, Lifetime: 40.2%");
    assert!((body["projected_ldl"].as_f64().unwrap() - 1.5).abs() < 1e-9);
    assert_eq!(body["chart"].as_array().unwrap().len(), 3);

    // Read it back
    let (status, current) = send_json(&app, Method::GET, "/api/v1/cvd/assessment", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["summary"], body["summary"]);

    // Export
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/cvd/assessment/export")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"cvd_results.csv\""
    );
    let csv = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        String::from_utf8(csv.to_vec()).unwrap(),
        "Metric,Value\n5yr,9.8\n10yr,18.6\nLifetime,40.2\n"
    );

    // Reset
    let (status, _) = send(&app, Method::DELETE, "/api/v1/cvd/assessment", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/v1/cvd/assessment/export", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resubmission_replaces_session() {
    let app = create_test_app();

    send_json(&app, Method::POST, "/api/v1/cvd/assessment", Some(reference_form())).await;

    let mut older = reference_form();
    older["age"] = json!(86);
    let (status, body) = send_json(&app, Method::POST, "/api/v1/cvd/assessment", Some(older)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["lifetime_risk"].is_null());
    assert!(body["outcome"].is_null());
    assert_eq!(body["summary"][1], "ARR/RRR/NNT not applicable for age ≥ 85");

    let (_, bytes) = send(&app, Method::GET, "/api/v1/cvd/assessment/export", None).await;
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "Metric,Value\n5yr,41.9\n10yr,66.2\n"
    );
}

#[tokio::test]
async fn test_out_of_range_fields_are_rejected() {
    let app = create_test_app();

    let mut form = reference_form();
    form["age"] = json!(25);
    form["hdl"] = json!(4.0);

    let (status, body) = send_json(&app, Method::POST, "/api/v1/cvd/assessment", Some(form)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);

    // Nothing was stored
    let (status, _) = send(&app, Method::GET, "/api/v1/cvd/assessment", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_advanced_therapy_gate() {
    let app = create_test_app();

    let mut form = reference_form();
    form["advanced_therapies"] = json!(["inclisiran"]);
    let (status, body) = send_json(&app, Method::POST, "/api/v1/cvd/assessment", Some(form.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    form["newly_started"] = json!([]);
    let (status, body) = send_json(&app, Method::POST, "/api/v1/cvd/assessment", Some(form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["advanced_therapy_eligible"], true);
    assert_eq!(body["advanced_therapies"], json!(["inclisiran"]));
}

#[tokio::test]
async fn test_repeated_advanced_therapy_is_rejected() {
    let app = create_test_app();

    let mut form = reference_form();
    form["newly_started"] = json!([]);
    form["advanced_therapies"] = json!(["inclisiran", "inclisiran"]);
    let (status, body) = send_json(&app, Method::POST, "/api/v1/cvd/assessment", Some(form)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(
        body["details"][0],
        "advanced_therapies: Inclisiran is listed more than once"
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app();

    let (status, body) = send_json(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/cvd/assessment"].is_object());
}
