// URL analysis API endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;
use url::Url;
use validator::Validate;

use crate::{app::AppState, models::AnalyzeRequest, utils::service_error::ServiceError};

/// Analyze a URL for phishing risk
/// POST /api/v1/analyze
///
/// Invalid input (missing, empty, or syntactically broken URL) is rejected
/// here, before the core pipeline runs; the core itself always produces a
/// result.
pub async fn analyze_url(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ServiceError::from(e).into_response();
    }

    let url = request.url.trim();
    if url.is_empty() {
        return ServiceError::ValidationError("No URL provided".to_string()).into_response();
    }
    if url.chars().count() as u64 > state.config.max_url_length {
        return ServiceError::ValidationError(format!(
            "URL exceeds maximum length of {} characters",
            state.config.max_url_length
        ))
        .into_response();
    }

    // A usable URL needs at least a scheme and a host
    let has_scheme_and_host = Url::parse(url).map(|u| u.has_host()).unwrap_or(false);
    if !has_scheme_and_host {
        return ServiceError::InvalidUrl.into_response();
    }

    let result = state.analysis_service.analyze_url(url).await;
    info!(
        "analyzed URL (probability {:.3}, level {})",
        result.phishing_probability, result.threat_level
    );

    (StatusCode::OK, Json(result)).into_response()
}

/// Service health and classifier mode
/// GET /api/v1/health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_loaded = state.analysis_service.is_model_loaded();

    Json(json!({
        "status": "healthy",
        "service": "phishguard-backend",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "components": {
            "classifier": {
                "status": if model_loaded { "loaded" } else { "neutral-fallback" },
            }
        }
    }))
}
