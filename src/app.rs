// Application state and configuration
use std::sync::Arc;

use crate::{app_config::AppConfig, services::AnalysisService};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analysis_service: Arc<AnalysisService>,
}
