// Domain registration metadata resolver.
//
// Wraps a WHOIS-style registration lookup behind an async trait so the
// feature extractor can be exercised without network access. The resolver is
// total: unreachable registries, unsupported TLDs, malformed records and
// timeouts all degrade to the zero-valued DomainInfo.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::debug;
use whois_rust::{WhoIs, WhoIsLookupOptions};

use crate::models::DomainInfo;
use crate::utils::registrable_domain;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Registration lookup failed: {0}")]
    Unreachable(String),

    #[error("Hostname not queryable: {0}")]
    InvalidHostname(String),

    #[error("Registration lookup timed out")]
    Timeout,

    #[error("Registration lookup task failed")]
    TaskFailed,

    #[error("Registration lookups disabled")]
    Disabled,
}

// =============================================================================
// LOOKUP SEAM
// =============================================================================

/// Backing registration lookup: hostname in, raw record text out.
#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    async fn lookup(&self, hostname: &str) -> Result<String, LookupError>;
}

/// WHOIS-backed lookup. The query itself is blocking network I/O, so it runs
/// on the blocking pool under a bounded timeout.
pub struct WhoisRegistrationLookup {
    timeout: Duration,
}

// Minimal server map used when no external configuration is present;
// unlisted TLDs fall through to IANA.
const WHOIS_SERVERS: &str = r#"{
    "com": "whois.verisign-grs.com",
    "net": "whois.verisign-grs.com",
    "org": "whois.pir.org",
    "io": "whois.nic.io",
    "co": "whois.nic.co",
    "info": "whois.afilias.net",
    "biz": "whois.nic.biz",
    "uk": "whois.nic.uk",
    "": "whois.iana.org"
}"#;

impl WhoisRegistrationLookup {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_client() -> Result<WhoIs, LookupError> {
        WhoIs::from_path("whois-servers.json")
            .or_else(|_| WhoIs::from_string(WHOIS_SERVERS))
            .map_err(|e| LookupError::Unreachable(format!("WHOIS client setup failed: {}", e)))
    }
}

#[async_trait]
impl RegistrationLookup for WhoisRegistrationLookup {
    async fn lookup(&self, hostname: &str) -> Result<String, LookupError> {
        let whois = Self::build_client()?;
        let options = WhoIsLookupOptions::from_string(hostname)
            .map_err(|e| LookupError::InvalidHostname(e.to_string()))?;

        match tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || whois.lookup(options)),
        )
        .await
        {
            Ok(Ok(Ok(raw))) => Ok(raw),
            Ok(Ok(Err(e))) => Err(LookupError::Unreachable(e.to_string())),
            Ok(Err(_)) => Err(LookupError::TaskFailed),
            Err(_) => Err(LookupError::Timeout),
        }
    }
}

/// Lookup used when registration queries are switched off by configuration.
struct DisabledLookup;

#[async_trait]
impl RegistrationLookup for DisabledLookup {
    async fn lookup(&self, _hostname: &str) -> Result<String, LookupError> {
        Err(LookupError::Disabled)
    }
}

// =============================================================================
// DOMAIN INFO SERVICE
// =============================================================================

pub struct DomainInfoService {
    lookup: Arc<dyn RegistrationLookup>,
}

impl DomainInfoService {
    pub fn new(lookup: Arc<dyn RegistrationLookup>) -> Self {
        Self { lookup }
    }

    pub fn disabled() -> Self {
        Self {
            lookup: Arc::new(DisabledLookup),
        }
    }

    /// Resolve registration metadata for a hostname. Never fails: any lookup
    /// or parse problem yields the zero-valued record.
    pub async fn get_domain_info(&self, hostname: &str) -> DomainInfo {
        if hostname.is_empty() {
            return DomainInfo::default();
        }

        // Registries answer for the registrable domain, not arbitrary
        // subdomains
        let query = registrable_domain(hostname).unwrap_or_else(|| hostname.to_string());

        match self.lookup.lookup(&query).await {
            Ok(raw) => parse_registration_record(&raw, Utc::now()),
            Err(e) => {
                debug!("registration lookup failed for {}: {}", query, e);
                DomainInfo::default()
            },
        }
    }
}

// =============================================================================
// RECORD PARSING
// =============================================================================

lazy_static! {
    static ref CREATION_DATE: Regex = Regex::new(
        r"(?im)^[ \t]*(?:creation date|created on|registered on|registration date|created)[ \t]*:[ \t]*(\S.*?)[ \t\r]*$"
    )
    .expect("invalid creation date pattern");
    static ref EXPIRY_DATE: Regex = Regex::new(
        r"(?im)^[ \t]*(?:registry expiry date|registrar registration expiration date|expiration date|expiry date|expires on|paid-till)[ \t]*:[ \t]*(\S.*?)[ \t\r]*$"
    )
    .expect("invalid expiry date pattern");
    static ref NAMESERVER: Regex =
        Regex::new(r"(?im)^[ \t]*(?:name server|nameserver|nserver)[ \t]*:[ \t]*(\S+)")
            .expect("invalid nameserver pattern");
}

/// Extract DomainInfo from raw registration record text.
///
/// Registries frequently repeat date fields (historical values); the first
/// occurrence wins, matching the list-valued consumption contract. Fields
/// default to 0 independently: a record missing its expiry still contributes
/// the domain age.
pub fn parse_registration_record(raw: &str, now: DateTime<Utc>) -> DomainInfo {
    let domain_age_days = first_capture(&CREATION_DATE, raw)
        .and_then(parse_record_date)
        .map(|created| clamp_days((now - created).num_days()))
        .unwrap_or(0);

    let registration_days_to_expiry = first_capture(&EXPIRY_DATE, raw)
        .and_then(parse_record_date)
        .map(|expires| clamp_days((expires - now).num_days()))
        .unwrap_or(0);

    let nameservers: HashSet<String> = NAMESERVER
        .captures_iter(raw)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_ascii_lowercase())
        .collect();

    DomainInfo {
        domain_age_days,
        registration_days_to_expiry,
        nameserver_count: nameservers.len() as u32,
    }
}

fn first_capture<'a>(pattern: &Regex, raw: &'a str) -> Option<&'a str> {
    pattern
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn clamp_days(days: i64) -> u32 {
    days.clamp(0, u32::MAX as i64) as u32
}

/// Registration records carry dates in a handful of formats depending on the
/// registry; try the common ones in decreasing specificity.
fn parse_record_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y.%m.%d %H:%M:%S"];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%d.%m.%Y"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct UnreachableLookup;

    #[async_trait]
    impl RegistrationLookup for UnreachableLookup {
        async fn lookup(&self, _hostname: &str) -> Result<String, LookupError> {
            Err(LookupError::Unreachable("connection refused".to_string()))
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_full_record() {
        let raw = "\
Domain Name: EXAMPLE.COM
Creation Date: 2025-10-03T00:00:00Z
Registry Expiry Date: 2026-03-11T00:00:00Z
Name Server: NS1.EXAMPLE.COM
Name Server: NS2.EXAMPLE.COM
";
        let info = parse_registration_record(raw, fixed_now());
        assert_eq!(info.domain_age_days, 90);
        assert_eq!(info.registration_days_to_expiry, 69);
        assert_eq!(info.nameserver_count, 2);
    }

    #[test]
    fn test_repeated_date_fields_use_first_value() {
        let raw = "\
Creation Date: 2025-12-22T00:00:00Z
Creation Date: 2020-01-01T00:00:00Z
";
        let info = parse_registration_record(raw, fixed_now());
        assert_eq!(info.domain_age_days, 10);
    }

    #[test]
    fn test_date_format_variants() {
        let raw = "Registered on: 02-Dec-2025\nExpiry date: 2026-01-31";
        let info = parse_registration_record(raw, fixed_now());
        assert_eq!(info.domain_age_days, 30);
        assert_eq!(info.registration_days_to_expiry, 30);
    }

    #[test]
    fn test_fields_default_independently() {
        let raw = "Creation Date: 2025-12-02T00:00:00Z\nName Server: ns1.example.com";
        let info = parse_registration_record(raw, fixed_now());
        assert_eq!(info.domain_age_days, 30);
        assert_eq!(info.registration_days_to_expiry, 0);
        assert_eq!(info.nameserver_count, 1);
    }

    #[test]
    fn test_future_creation_and_past_expiry_clamp_to_zero() {
        let raw = "\
Creation Date: 2027-01-01T00:00:00Z
Registry Expiry Date: 2024-01-01T00:00:00Z
";
        let info = parse_registration_record(raw, fixed_now());
        assert_eq!(info.domain_age_days, 0);
        assert_eq!(info.registration_days_to_expiry, 0);
    }

    #[test]
    fn test_nameservers_deduplicate_case_insensitively() {
        let raw = "\
Name Server: NS1.EXAMPLE.COM
Name Server: ns1.example.com.
nserver: ns2.example.com
";
        let info = parse_registration_record(raw, fixed_now());
        assert_eq!(info.nameserver_count, 2);
    }

    #[test]
    fn test_unparseable_record_yields_zero_info() {
        let info = parse_registration_record("No match for domain", fixed_now());
        assert_eq!(info, DomainInfo::default());
    }

    #[tokio::test]
    async fn test_unreachable_lookup_degrades_to_zero_info() {
        let service = DomainInfoService::new(Arc::new(UnreachableLookup));
        let info = service.get_domain_info("example.com").await;
        assert_eq!(info, DomainInfo::default());
    }

    #[tokio::test]
    async fn test_empty_hostname_short_circuits() {
        let service = DomainInfoService::disabled();
        assert_eq!(service.get_domain_info("").await, DomainInfo::default());
    }
}
