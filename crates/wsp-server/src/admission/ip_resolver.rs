//! Trusted client-IP resolution from a chain of proxy headers.
//!
//! Naively trusting the first hop of `X-Forwarded-For` lets any client reset
//! an IP-keyed rate limiter at will; this resolver fails closed to
//! `"unknown"` unless the configured policy explicitly trusts a header.

use axum::http::HeaderMap;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// The sentinel returned when no trustworthy client IP can be derived.
pub const UNKNOWN: &str = "unknown";

/// Policy governing which proxy headers are trusted and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct IpResolverPolicy {
    /// Whether `X-Forwarded-For` / `X-Real-IP` are trusted at all.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "TRUST_PROXY_HEADERS", default_value = "false")
    )]
    pub trust_proxy_headers: bool,

    /// Whether a single-hop `X-Forwarded-For` (no intermediate proxies) is
    /// trusted. Ignored when `trust_proxy_headers` is false.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "TRUST_SINGLE_X_FORWARDED_FOR", default_value = "false")
    )]
    pub trust_single_x_forwarded_for: bool,

    /// Shared secret a trusted edge proxy must present on every request.
    #[cfg_attr(feature = "config", arg(long, env = "TRUSTED_PROXY_SHARED_SECRET"))]
    pub trusted_proxy_shared_secret: Option<String>,

    /// Header name carrying the shared secret.
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "TRUSTED_PROXY_SHARED_SECRET_HEADER",
            default_value = "x-trusted-proxy-secret"
        )
    )]
    pub trusted_proxy_shared_secret_header: String,

    /// Whether the admission middleware must reject anonymous bootstrap /
    /// capability-check requests with `503 SERVER_ERROR` when no trusted
    /// client IP can be resolved. Disabling this falls back to rate-limiting
    /// all such requests under the shared `"unknown"` identifier.
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "REQUIRE_TRUSTED_CLIENT_IP_FOR_ANONYMOUS_RATE_LIMITS",
            default_value = "true"
        )
    )]
    pub require_trusted_client_ip_for_anonymous_rate_limits: bool,
}

impl Default for IpResolverPolicy {
    fn default() -> Self {
        Self {
            trust_proxy_headers: false,
            trust_single_x_forwarded_for: false,
            trusted_proxy_shared_secret: None,
            trusted_proxy_shared_secret_header: "x-trusted-proxy-secret".to_owned(),
            require_trusted_client_ip_for_anonymous_rate_limits: true,
        }
    }
}

/// Derives one canonical client IP for a request, per the configured policy.
///
/// Fails closed to [`UNKNOWN`] at every branch: a missing or malformed header,
/// an untrusted direct-edge header, or a single-hop chain without explicit
/// trust all resolve to the sentinel rather than guessing.
pub fn resolve(headers: &HeaderMap, policy: &IpResolverPolicy) -> String {
    if let Some(expected) = &policy.trusted_proxy_shared_secret {
        let header_name = policy.trusted_proxy_shared_secret_header.as_str();
        let provided = headers
            .get(header_name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
            return UNKNOWN.to_owned();
        }
    }

    if let Some(ip) = header_ip(headers, "cf-connecting-ip") {
        return ip;
    }

    if !policy.trust_proxy_headers {
        return UNKNOWN.to_owned();
    }

    if let Some(ip) = header_ip(headers, "x-real-ip") {
        return ip;
    }

    if let Some(chain) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let hops: Vec<&str> = chain.split(',').map(str::trim).filter(|h| !h.is_empty()).collect();

        match hops.len() {
            0 => return UNKNOWN.to_owned(),
            1 => {
                if policy.trust_single_x_forwarded_for {
                    if let Some(ip) = normalize_hop(hops[0]) {
                        return ip;
                    }
                }
                return UNKNOWN.to_owned();
            }
            _ => {
                if let Some(ip) = normalize_hop(hops[hops.len() - 1]) {
                    return ip;
                }
                return UNKNOWN.to_owned();
            }
        }
    }

    UNKNOWN.to_owned()
}

/// Compares two byte slices in constant time with respect to their content
/// (length is not secret here, so an early length check is fine).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).and_then(normalize_hop)
}

/// Strips bracket/port decoration from a single forwarded-for hop and
/// validates it parses as an IP address.
fn normalize_hop(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    if let Some(stripped) = trimmed.strip_prefix('[') {
        let host = stripped.split(']').next().unwrap_or("");
        return host.parse::<std::net::Ipv6Addr>().ok().map(|ip| ip.to_string());
    }

    if trimmed.parse::<std::net::Ipv6Addr>().is_ok() {
        return Some(trimmed.to_owned());
    }

    let host = trimmed.rsplit_once(':').map(|(h, _)| h).unwrap_or(trimmed);
    host.parse::<std::net::Ipv4Addr>().ok().map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for (k, v) in pairs {
            h.insert(
                axum::http::HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        h
    }

    #[test]
    fn default_policy_never_trusts_forwarded_headers() {
        let policy = IpResolverPolicy::default();
        let h = headers(&[("x-forwarded-for", "198.51.100.77")]);
        assert_eq!(resolve(&h, &policy), UNKNOWN);
    }

    #[test]
    fn direct_edge_header_always_trusted() {
        let policy = IpResolverPolicy::default();
        let h = headers(&[("cf-connecting-ip", "203.0.113.5")]);
        assert_eq!(resolve(&h, &policy), "203.0.113.5");
    }

    #[test]
    fn multi_hop_chain_uses_last_hop_not_first() {
        let policy = IpResolverPolicy {
            trust_proxy_headers: true,
            ..IpResolverPolicy::default()
        };
        let h = headers(&[("x-forwarded-for", "203.0.113.1, 10.0.0.5, 10.0.0.6")]);
        assert_eq!(resolve(&h, &policy), "10.0.0.6");
    }

    #[test]
    fn single_hop_requires_explicit_trust() {
        let mut policy = IpResolverPolicy {
            trust_proxy_headers: true,
            ..IpResolverPolicy::default()
        };
        let h = headers(&[("x-forwarded-for", "203.0.113.1")]);
        assert_eq!(resolve(&h, &policy), UNKNOWN);

        policy.trust_single_x_forwarded_for = true;
        assert_eq!(resolve(&h, &policy), "203.0.113.1");
    }

    #[test]
    fn missing_shared_secret_fails_closed() {
        let policy = IpResolverPolicy {
            trusted_proxy_shared_secret: Some("s3cret".to_owned()),
            ..IpResolverPolicy::default()
        };
        let h = headers(&[("cf-connecting-ip", "203.0.113.5")]);
        assert_eq!(resolve(&h, &policy), UNKNOWN);
    }

    #[test]
    fn matching_shared_secret_unlocks_resolution() {
        let policy = IpResolverPolicy {
            trusted_proxy_shared_secret: Some("s3cret".to_owned()),
            ..IpResolverPolicy::default()
        };
        let h = headers(&[
            ("x-trusted-proxy-secret", "s3cret"),
            ("cf-connecting-ip", "203.0.113.5"),
        ]);
        assert_eq!(resolve(&h, &policy), "203.0.113.5");
    }
}
