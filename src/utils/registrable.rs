// Public-suffix-aware registrable domain decomposition.
//
// Uses the compiled public suffix list so that compound suffixes resolve
// correctly: the registrable domain of `a.b.example.co.uk` is
// `example.co.uk`, leaving two subdomain labels.

use std::net::IpAddr;

/// Registrable (public-suffix-aware) base domain of a host, lowercased.
///
/// Returns `None` for empty hosts, IP literals and hosts with no
/// registrable decomposition (e.g. a bare suffix like `co.uk`).
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let root = psl::domain_str(&host)?;
    // A host equal to its suffix (no registrable label) yields nothing usable
    if root.is_empty() {
        return None;
    }
    Some(root.to_string())
}

/// Number of dot-separated labels in the subdomain portion of `host`.
///
/// `www.example.com` has one, `a.b.example.co.uk` has two, a host with no
/// subdomain (or no registrable decomposition at all) has zero.
pub fn subdomain_count(host: &str) -> u32 {
    let normalized = host.trim_end_matches('.').to_ascii_lowercase();

    let root = match registrable_domain(&normalized) {
        Some(root) => root,
        None => return 0,
    };

    if normalized.len() <= root.len() {
        return 0;
    }

    let subdomain = &normalized[..normalized.len() - root.len() - 1];
    if subdomain.is_empty() {
        0
    } else {
        subdomain.split('.').count() as u32
    }
}
