// Utility modules for PhishGuard Backend

pub mod registrable;
pub mod service_error;
pub mod threat_scanner;

pub use registrable::{registrable_domain, subdomain_count};
pub use service_error::ServiceError;
pub use threat_scanner::check_threat_indicators;
