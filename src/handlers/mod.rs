// HTTP handlers for the analysis API

pub mod analyze;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

// Analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze::analyze_url))
        .route("/health", get(analyze::health_check))
}
