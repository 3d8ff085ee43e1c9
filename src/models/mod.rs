pub mod analysis;

// Re-export common types
pub use analysis::{AnalysisResult, AnalyzeRequest, DomainInfo, FeatureVector, ThreatLevel};
