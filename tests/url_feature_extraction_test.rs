// End-to-end feature extraction properties

use std::sync::Arc;

use async_trait::async_trait;
use phishguard_core::services::domain_info::{LookupError, RegistrationLookup};
use phishguard_core::{DomainInfoService, FeatureExtractor, FeatureVector};

struct UnreachableLookup;

#[async_trait]
impl RegistrationLookup for UnreachableLookup {
    async fn lookup(&self, _hostname: &str) -> Result<String, LookupError> {
        Err(LookupError::Unreachable("no route to host".to_string()))
    }
}

fn offline_extractor() -> FeatureExtractor {
    FeatureExtractor::new(DomainInfoService::disabled())
}

#[tokio::test]
async fn test_well_formed_urls_produce_eleven_finite_features() {
    let extractor = offline_extractor();
    let urls = [
        "https://example.com",
        "http://sub.domain.example.org/path/to/page?q=1&x=2",
        "https://a.b.example.co.uk/reset",
        "http://192.168.1.1:8080/admin",
        "https://xn--nxasmq6b.example/login",
    ];

    for url in urls {
        let features = extractor.extract_features(url).await;
        let array = features.to_array();
        assert_eq!(array.len(), 11);
        for value in array {
            assert!(value.is_finite() && value >= 0.0, "bad feature for {}", url);
        }
        assert!(features.url_length > 0, "url_length zero for {}", url);
    }
}

#[tokio::test]
async fn test_parse_failure_yields_canonical_zero_vector() {
    let extractor = offline_extractor();
    for bad in ["", "not a url", "http//missing-colon", "://no-scheme"] {
        let features = extractor.extract_features(bad).await;
        assert_eq!(features, FeatureVector::default(), "input {:?}", bad);
    }
}

#[tokio::test]
async fn test_keyword_property_from_fixture() {
    let extractor = offline_extractor();
    let features = extractor
        .extract_features("http://secure-login-update.com")
        .await;
    // secure + login + update, each counted once
    assert_eq!(features.suspicious_keywords, 3);
}

#[tokio::test]
async fn test_extraction_is_idempotent() {
    let extractor = offline_extractor();
    let url = "https://banking.example.com/verify?account=42";
    assert_eq!(
        extractor.extract_features(url).await,
        extractor.extract_features(url).await
    );
}

#[tokio::test]
async fn test_unreachable_resolver_does_not_propagate() {
    let extractor = FeatureExtractor::new(DomainInfoService::new(Arc::new(UnreachableLookup)));
    let features = extractor.extract_features("https://www.example.com/").await;

    assert_eq!(features.domain_age_days, 0);
    assert_eq!(features.registration_days_to_expiry, 0);
    assert_eq!(features.nameserver_count, 0);
    // Lexical features are unaffected by the failed lookup
    assert_eq!(features.domain_length, 15);
    assert_eq!(features.subdomain_count, 1);
}

#[tokio::test]
async fn test_resolver_failure_simulated_directly() {
    let service = DomainInfoService::new(Arc::new(UnreachableLookup));
    let info = service.get_domain_info("example.com").await;
    assert_eq!(info.domain_age_days, 0);
    assert_eq!(info.registration_days_to_expiry, 0);
    assert_eq!(info.nameserver_count, 0);
}
