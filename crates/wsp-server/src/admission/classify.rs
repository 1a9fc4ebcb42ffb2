//! Operation classifier: maps an HTTP method + path to a rate-limit
//! operation, and extracts the identifier admission uses to key the
//! rate-limit counter.

use axum::http::Method;

/// A rate-limited operation category. Each variant has its own default
/// limit/window pair (see [`crate::admission::rate_limit::defaults_for`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Bootstrap,
    Read,
    Write,
    Append,
    Search,
    Subscribe,
    Bulk,
    WebhookCreate,
    CapabilityCheck,
}

/// Classifies a request by method and path. The most specific rule wins;
/// unmatched requests fall through to [`Operation::Read`].
pub fn classify(method: &Method, path: &str) -> Operation {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if method == Method::POST && path == "/bootstrap" {
        return Operation::Bootstrap;
    }

    if method == Method::POST
        && (path == "/capabilities/check" || is_capability_check_path(&segments))
    {
        return Operation::CapabilityCheck;
    }

    if method == Method::GET && is_subscribe_path(&segments) {
        return Operation::Subscribe;
    }

    if method == Method::GET && is_search_path(path, &segments) {
        return Operation::Search;
    }

    if method == Method::POST && segments.last() == Some(&"bulk") {
        return Operation::Bulk;
    }

    if method == Method::POST && is_webhook_create_path(&segments) {
        return Operation::WebhookCreate;
    }

    let tier = segments.first().copied();

    if matches!(method, Method::POST | Method::PUT | Method::DELETE) && tier == Some("w") {
        return Operation::Write;
    }

    if method == Method::POST && tier == Some("a") {
        return Operation::Append;
    }

    Operation::Read
}

/// `POST /w/:k/capabilities/check` — a capability-scoped path has tier `w`
/// followed by a key segment then `capabilities`/`check`.
fn is_capability_check_path(segments: &[&str]) -> bool {
    matches!(segments, [tier, _key, "capabilities", "check"] if is_tier(tier))
}

/// `GET /{r|a|w}/:k/ops/subscribe` or `.../ops/folders/subscribe`.
fn is_subscribe_path(segments: &[&str]) -> bool {
    match segments {
        [tier, _key, "ops", "subscribe"] => is_tier(tier),
        [tier, _key, "ops", "folders", "subscribe"] => is_tier(tier),
        _ => false,
    }
}

/// `GET /r/:k/search`, `GET /r/:k/ops/folders/search`, `GET /api/v1/search`.
fn is_search_path(path: &str, segments: &[&str]) -> bool {
    if path == "/api/v1/search" {
        return true;
    }
    match segments {
        [tier, _key, "search"] => *tier == "r",
        [tier, _key, "ops", "folders", "search"] => *tier == "r",
        _ => false,
    }
}

/// `POST /w/:k/webhooks`, `POST /w/:k/folders/.../webhooks`,
/// `POST /workspaces/:id/webhooks`.
fn is_webhook_create_path(segments: &[&str]) -> bool {
    if segments.last() != Some(&"webhooks") {
        return false;
    }
    match segments.first() {
        Some(&"w") => segments.len() >= 3,
        Some(&"workspaces") => segments.len() == 3,
        _ => false,
    }
}

fn is_tier(segment: &str) -> bool {
    matches!(segment, "r" | "a" | "w")
}

/// Paths that never go through admission at all.
pub fn is_admission_exempt(path: &str) -> bool {
    path == "/health" || path == "/openapi.json" || path.starts_with("/docs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_takes_priority() {
        assert_eq!(
            classify(&Method::POST, "/bootstrap"),
            Operation::Bootstrap
        );
    }

    #[test]
    fn capability_check_is_classified() {
        assert_eq!(
            classify(&Method::POST, "/capabilities/check"),
            Operation::CapabilityCheck
        );
        assert_eq!(
            classify(&Method::POST, "/w/abcdef0123456789abcdef/capabilities/check"),
            Operation::CapabilityCheck
        );
    }

    #[test]
    fn subscribe_paths() {
        assert_eq!(
            classify(&Method::GET, "/r/key123/ops/subscribe"),
            Operation::Subscribe
        );
        assert_eq!(
            classify(&Method::GET, "/w/key123/ops/folders/subscribe"),
            Operation::Subscribe
        );
    }

    #[test]
    fn search_paths() {
        assert_eq!(classify(&Method::GET, "/r/key123/search"), Operation::Search);
        assert_eq!(
            classify(&Method::GET, "/r/key123/ops/folders/search"),
            Operation::Search
        );
        assert_eq!(classify(&Method::GET, "/api/v1/search"), Operation::Search);
    }

    #[test]
    fn bulk_requires_trailing_segment() {
        assert_eq!(
            classify(&Method::POST, "/a/key123/folders/docs/bulk"),
            Operation::Bulk
        );
    }

    #[test]
    fn webhook_create_paths() {
        assert_eq!(
            classify(&Method::POST, "/w/key123/webhooks"),
            Operation::WebhookCreate
        );
        assert_eq!(
            classify(&Method::POST, "/w/key123/folders/docs/webhooks"),
            Operation::WebhookCreate
        );
        assert_eq!(
            classify(&Method::POST, "/workspaces/abc/webhooks"),
            Operation::WebhookCreate
        );
    }

    #[test]
    fn write_tier_falls_through_to_write() {
        assert_eq!(classify(&Method::PUT, "/w/key123/file.md"), Operation::Write);
        assert_eq!(
            classify(&Method::DELETE, "/w/key123/file.md"),
            Operation::Write
        );
    }

    #[test]
    fn append_tier_falls_through_to_append() {
        assert_eq!(
            classify(&Method::POST, "/a/key123/file.md"),
            Operation::Append
        );
    }

    #[test]
    fn everything_else_defaults_to_read() {
        assert_eq!(classify(&Method::GET, "/r/key123/file.md"), Operation::Read);
        assert_eq!(classify(&Method::GET, "/anything"), Operation::Read);
    }

    #[test]
    fn exempt_paths() {
        assert!(is_admission_exempt("/health"));
        assert!(is_admission_exempt("/openapi.json"));
        assert!(is_admission_exempt("/docs"));
        assert!(is_admission_exempt("/docs/ui"));
        assert!(!is_admission_exempt("/r/key123/file.md"));
    }
}
