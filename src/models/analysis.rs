// URL analysis data model: feature vector, domain registration info,
// threat level verdicts and the final analysis result.

use serde::{Deserialize, Serialize};
use validator::Validate;

// =============================================================================
// FEATURE VECTOR
// =============================================================================

/// Fixed 11-feature vector extracted from a URL.
///
/// Field order is significant: it is the input contract to the classifier,
/// preserved by `to_array`. All values are non-negative by construction.
/// `Default` is the canonical all-zero fallback vector used when extraction
/// fails — partial extraction results never leak through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub url_length: u32,
    pub domain_length: u32,
    pub hostname_ip_count: u32,
    pub hostname_special_chars: u32,
    pub path_length: u32,
    pub query_length: u32,
    pub subdomain_count: u32,
    pub suspicious_keywords: u32,
    pub domain_age_days: u32,
    pub registration_days_to_expiry: u32,
    pub nameserver_count: u32,
}

impl FeatureVector {
    /// Number of features in the vector — the classifier input width.
    pub const LEN: usize = 11;

    /// Flatten into the fixed-order array consumed by the scorer.
    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.url_length as f64,
            self.domain_length as f64,
            self.hostname_ip_count as f64,
            self.hostname_special_chars as f64,
            self.path_length as f64,
            self.query_length as f64,
            self.subdomain_count as f64,
            self.suspicious_keywords as f64,
            self.domain_age_days as f64,
            self.registration_days_to_expiry as f64,
            self.nameserver_count as f64,
        ]
    }

    pub fn with_domain_info(mut self, info: DomainInfo) -> Self {
        self.domain_age_days = info.domain_age_days;
        self.registration_days_to_expiry = info.registration_days_to_expiry;
        self.nameserver_count = info.nameserver_count;
        self
    }
}

// =============================================================================
// DOMAIN REGISTRATION INFO
// =============================================================================

/// Domain registration metadata derived from a WHOIS-style lookup.
///
/// Unlike the full feature vector, each field defaults to 0 independently:
/// a record with a creation date but no expiry still contributes its age.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub domain_age_days: u32,
    pub registration_days_to_expiry: u32,
    pub nameserver_count: u32,
}

// =============================================================================
// THREAT LEVEL
// =============================================================================

/// Discrete risk bucket derived from the phishing probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    /// Threshold policy: > 0.7 is High, > 0.4 is Medium, otherwise Low.
    /// Boundaries are inclusive on the low side — exactly 0.7 is Medium.
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.7 {
            ThreatLevel::High
        } else if probability > 0.4 {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatLevel::Low => write!(f, "Low"),
            ThreatLevel::Medium => write!(f, "Medium"),
            ThreatLevel::High => write!(f, "High"),
        }
    }
}

// =============================================================================
// ANALYSIS RESULT
// =============================================================================

/// Complete analysis of one URL. Constructed fresh per request, immutable
/// once returned, never persisted. Serializes flat: the 11 feature values
/// sit alongside the verdict fields.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub url: String,
    #[serde(flatten)]
    pub features: FeatureVector,
    pub phishing_probability: f64,
    pub threat_level: ThreatLevel,
    pub threat_indicators: Vec<String>,
}

// =============================================================================
// REQUEST DTO
// =============================================================================

/// Body of `POST /api/v1/analyze`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, max = 8192, message = "URL must be 1-8192 characters"))]
    pub url: String,
}
