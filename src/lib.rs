// Library exports for PhishGuard Backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use models::{AnalysisResult, AnalyzeRequest, DomainInfo, FeatureVector, ThreatLevel};
pub use services::{
    AnalysisService, DomainInfoService, FeatureExtractor, ScoringContext,
    WhoisRegistrationLookup, NEUTRAL_PROBABILITY,
};
pub use utils::{check_threat_indicators, ServiceError};

// Re-export handler route builders
pub use handlers::analyze_routes;

/// Build the shared application state: load (or bootstrap) the classifier,
/// wire the registration resolver and feature extractor.
///
/// The classifier load-or-train step runs to completion here, before any
/// request is served; afterwards the scoring context is immutable and shared
/// read-only across request tasks.
pub fn initialize_app_state(config: &AppConfig) -> AppState {
    let scoring = Arc::new(ScoringContext::load_or_train(
        std::path::Path::new(&config.model_path),
        std::path::Path::new(&config.scaler_path),
    ));
    if !scoring.is_model_loaded() {
        info!("serving with neutral-probability scoring (no classifier)");
    }

    let domain_info = if config.whois_enabled {
        DomainInfoService::new(Arc::new(WhoisRegistrationLookup::new(
            Duration::from_secs(config.whois_timeout_secs),
        )))
    } else {
        info!("registration lookups disabled; domain features default to zero");
        DomainInfoService::disabled()
    };

    let analysis_service = Arc::new(AnalysisService::new(
        FeatureExtractor::new(domain_info),
        scoring,
    ));

    AppState {
        config: Arc::new(config.clone()),
        analysis_service,
    }
}
