// URL feature extraction.
//
// Builds the fixed 11-feature vector from a raw URL string. The extractor is
// total: a URL that cannot be parsed yields the canonical all-zero vector,
// with no partial values from earlier steps leaking through. Registration
// features come from the domain info resolver, which degrades to zeros on
// its own.

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::FeatureVector;
use crate::services::domain_info::DomainInfoService;
use crate::utils::registrable;

/// Fixed keyword set scanned case-insensitively against the raw URL.
/// Each keyword is counted at most once, regardless of occurrences.
const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "login",
    "verify",
    "secure",
    "account",
    "update",
    "authentication",
    "banking",
];

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("URL parse failure: {0}")]
    Parse(#[from] url::ParseError),
}

pub struct FeatureExtractor {
    domain_info: DomainInfoService,
}

impl FeatureExtractor {
    pub fn new(domain_info: DomainInfoService) -> Self {
        Self { domain_info }
    }

    /// Extract the 11-feature vector from a raw URL.
    ///
    /// Never fails: any parse fault discards all partial work and yields the
    /// all-zero default vector (logged, not propagated).
    pub async fn extract_features(&self, url: &str) -> FeatureVector {
        match self.try_extract(url).await {
            Ok(features) => features,
            Err(e) => {
                debug!("feature extraction failed for {:?}: {}", url, e);
                FeatureVector::default()
            },
        }
    }

    async fn try_extract(&self, raw: &str) -> Result<FeatureVector, FeatureError> {
        let parsed = Url::parse(raw)?;
        let host = parsed.host_str().unwrap_or("");

        let features = FeatureVector {
            url_length: char_count(raw),
            domain_length: char_count(host),
            hostname_ip_count: host.chars().filter(|c| c.is_ascii_digit()).count() as u32,
            hostname_special_chars: host
                .chars()
                .filter(|&c| !(c.is_ascii_alphanumeric() || c == '-' || c == '.'))
                .count() as u32,
            path_length: char_count(parsed.path()),
            query_length: char_count(parsed.query().unwrap_or("")),
            subdomain_count: registrable::subdomain_count(host),
            suspicious_keywords: count_suspicious_keywords(raw),
            ..Default::default()
        };

        // Registration features are resolved separately and default to zero
        // on any lookup failure without disturbing the lexical features
        let domain_info = self.domain_info.get_domain_info(host).await;

        Ok(features.with_domain_info(domain_info))
    }
}

fn char_count(s: &str) -> u32 {
    s.chars().count() as u32
}

fn count_suspicious_keywords(url: &str) -> u32 {
    let lowered = url.to_lowercase();
    SUSPICIOUS_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .count() as u32
}
