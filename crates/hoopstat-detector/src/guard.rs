//! Outbound URL guard.
//!
//! URL-mode requests make the server fetch an arbitrary caller-supplied
//! location. Unless private hosts are explicitly allowed, locations that
//! point back into the local network or at cloud metadata endpoints are
//! rejected before any connection is attempted.

use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::warn;
use url::{Host, Url};

/// Hostnames that resolve to internal services.
const BLOCKED_HOSTNAMES: &[&str] = &["localhost", "metadata.google.internal", "metadata"];

/// Returns a reason when `url` targets an internal or restricted host.
pub fn restricted_host(url: &Url) -> Option<String> {
    let restricted = match url.host() {
        Some(Host::Ipv4(ip)) => is_internal_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_internal_ipv6(ip),
        Some(Host::Domain(domain)) => is_internal_domain(domain),
        None => true,
    };

    if restricted {
        warn!(url = %url, "Blocked URL targeting internal host");
        Some("URL appears to target an internal or restricted endpoint".to_string())
    } else {
        None
    }
}

fn is_internal_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // 100.64.0.0/10 carrier-grade NAT
        || (ip.octets()[0] == 100 && (ip.octets()[1] & 0xc0) == 64)
}

fn is_internal_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_internal_ipv4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
}

fn is_internal_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    BLOCKED_HOSTNAMES.contains(&domain.as_str())
        || domain.ends_with(".localhost")
        || domain.ends_with(".internal")
        || domain.starts_with("metadata.")
}
