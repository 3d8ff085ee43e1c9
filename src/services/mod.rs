// Services module for PhishGuard Backend
// Business logic layer for the application

pub mod analysis;
pub mod domain_info;
pub mod features;
pub mod scoring;

// Re-export commonly used services
pub use analysis::AnalysisService;
pub use domain_info::{
    DomainInfoService, LookupError, RegistrationLookup, WhoisRegistrationLookup,
};
pub use features::{FeatureError, FeatureExtractor};
pub use scoring::{
    LogisticModel, ScoringContext, ScoringError, StandardScaler, NEUTRAL_PROBABILITY,
};
