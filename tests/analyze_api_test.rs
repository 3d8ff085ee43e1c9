// API boundary tests for the analysis endpoints
// Input validation rejects bad URLs before the core runs; the core itself
// always produces a result.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use phishguard_core::{
    analyze_routes, AnalysisService, AppConfig, AppState, DomainInfoService, FeatureExtractor,
    ScoringContext,
};

fn test_config() -> AppConfig {
    AppConfig::from_env().expect("test config")
}

fn test_app() -> Router {
    // Offline wiring: no registration lookups, neutral scoring
    let analysis_service = Arc::new(AnalysisService::new(
        FeatureExtractor::new(DomainInfoService::disabled()),
        Arc::new(ScoringContext::without_model()),
    ));

    let state = AppState {
        config: Arc::new(test_config()),
        analysis_service,
    };

    Router::new()
        .nest("/api/v1", analyze_routes())
        .with_state(state)
}

async fn post_analyze(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_analyze_rejects_empty_url() {
    let (status, body) = post_analyze(test_app(), json!({ "url": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_analyze_rejects_unparseable_url() {
    let (status, body) = post_analyze(test_app(), json!({ "url": "not a url" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid URL format");
}

#[tokio::test]
async fn test_analyze_rejects_url_without_host() {
    // Parses, but carries no host component
    let (status, _) = post_analyze(test_app(), json!({ "url": "mailto:alice@example.com" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_returns_full_result() {
    let (status, body) =
        post_analyze(test_app(), json!({ "url": "https://example.com/login" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://example.com/login");
    assert_eq!(body["phishing_probability"], 0.5);
    assert_eq!(body["threat_level"], "Medium");
    assert!(body["threat_indicators"].as_array().unwrap().is_empty());

    // All 11 feature values ride along, flat
    for feature in [
        "url_length",
        "domain_length",
        "hostname_ip_count",
        "hostname_special_chars",
        "path_length",
        "query_length",
        "subdomain_count",
        "suspicious_keywords",
        "domain_age_days",
        "registration_days_to_expiry",
        "nameserver_count",
    ] {
        assert!(body[feature].is_u64(), "missing feature field {}", feature);
    }
    assert_eq!(body["suspicious_keywords"], 1);
}

#[tokio::test]
async fn test_analyze_reports_threat_indicators() {
    let (status, body) = post_analyze(
        test_app(),
        json!({ "url": "http://192.168.1.1/update.exe" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let indicators: Vec<String> = body["threat_indicators"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        indicators,
        vec!["IP address as hostname", "Executable file download"]
    );
}

#[tokio::test]
async fn test_analyze_trims_surrounding_whitespace() {
    let (status, body) =
        post_analyze(test_app(), json!({ "url": "  https://example.com  " })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://example.com");
}

#[tokio::test]
async fn test_health_reports_classifier_mode() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "phishguard-backend");
    assert_eq!(body["components"]["classifier"]["status"], "neutral-fallback");
}
