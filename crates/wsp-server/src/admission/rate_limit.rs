//! Fixed-window rate-limit engine: per-(operation, identifier) counters
//! persisted in the shared store, with the response headers and 429 body
//! the rest of the admission plane renders verbatim.

#[cfg(feature = "config")]
use clap::Args;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use wsp_postgres::query::RateLimitRepository;
use wsp_postgres::{PgConnection, PgResult};

use crate::admission::classify::Operation;
use crate::error::Error;

/// Limit and window for a single operation, seconds-granular window label
/// used in the 429 body's `details.window`.
#[derive(Debug, Clone, Copy)]
pub struct OperationLimits {
    pub limit: i32,
    pub window_ms: i64,
    pub window_label: &'static str,
}

/// Per-operation overrides; any field left `None` falls back to the builtin
/// default for that operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RateLimitConfig {
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_BOOTSTRAP_LIMIT"))]
    pub bootstrap_limit: Option<i32>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_BOOTSTRAP_WINDOW_MS"))]
    pub bootstrap_window_ms: Option<i64>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_READ_LIMIT"))]
    pub read_limit: Option<i32>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_READ_WINDOW_MS"))]
    pub read_window_ms: Option<i64>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_WRITE_LIMIT"))]
    pub write_limit: Option<i32>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_WRITE_WINDOW_MS"))]
    pub write_window_ms: Option<i64>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_APPEND_LIMIT"))]
    pub append_limit: Option<i32>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_APPEND_WINDOW_MS"))]
    pub append_window_ms: Option<i64>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_SEARCH_LIMIT"))]
    pub search_limit: Option<i32>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_SEARCH_WINDOW_MS"))]
    pub search_window_ms: Option<i64>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_SUBSCRIBE_LIMIT"))]
    pub subscribe_limit: Option<i32>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_SUBSCRIBE_WINDOW_MS"))]
    pub subscribe_window_ms: Option<i64>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_BULK_LIMIT"))]
    pub bulk_limit: Option<i32>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_BULK_WINDOW_MS"))]
    pub bulk_window_ms: Option<i64>,
    #[cfg_attr(feature = "config", arg(long, env = "RATE_LIMIT_WEBHOOK_CREATE_LIMIT"))]
    pub webhook_create_limit: Option<i32>,
    #[cfg_attr(
        feature = "config",
        arg(long, env = "RATE_LIMIT_WEBHOOK_CREATE_WINDOW_MS")
    )]
    pub webhook_create_window_ms: Option<i64>,
    #[cfg_attr(
        feature = "config",
        arg(long, env = "RATE_LIMIT_CAPABILITY_CHECK_LIMIT")
    )]
    pub capability_check_limit: Option<i32>,
    #[cfg_attr(
        feature = "config",
        arg(long, env = "RATE_LIMIT_CAPABILITY_CHECK_WINDOW_MS")
    )]
    pub capability_check_window_ms: Option<i64>,
}

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;

/// Returns the effective limits for `operation`, applying `config` overrides
/// over the §4.D defaults. Invalid (non-positive) overrides are ignored.
pub fn limits_for(operation: Operation, config: &RateLimitConfig) -> OperationLimits {
    let (default_limit, default_window_ms, window_label, limit_override, window_override): (
        i32,
        i64,
        &'static str,
        Option<i32>,
        Option<i64>,
    ) = match operation {
        Operation::Bootstrap => (10, HOUR_MS, "1h", config.bootstrap_limit, config.bootstrap_window_ms),
        Operation::Read => (1000, MINUTE_MS, "1m", config.read_limit, config.read_window_ms),
        Operation::Write => (100, MINUTE_MS, "1m", config.write_limit, config.write_window_ms),
        Operation::Append => (400, MINUTE_MS, "1m", config.append_limit, config.append_window_ms),
        Operation::Search => (60, MINUTE_MS, "1m", config.search_limit, config.search_window_ms),
        Operation::Subscribe => {
            (10, MINUTE_MS, "1m", config.subscribe_limit, config.subscribe_window_ms)
        }
        Operation::Bulk => (30, MINUTE_MS, "1m", config.bulk_limit, config.bulk_window_ms),
        Operation::WebhookCreate => (
            20,
            HOUR_MS,
            "1h",
            config.webhook_create_limit,
            config.webhook_create_window_ms,
        ),
        Operation::CapabilityCheck => (
            5,
            MINUTE_MS,
            "1m",
            config.capability_check_limit,
            config.capability_check_window_ms,
        ),
    };

    OperationLimits {
        limit: limit_override.filter(|v| *v > 0).unwrap_or(default_limit),
        window_ms: window_override.filter(|v| *v > 0).unwrap_or(default_window_ms),
        window_label,
    }
}

/// The widest configured window across all operations, used by the reaper
/// to decide when a counter row is safely stale.
pub fn max_window_ms(config: &RateLimitConfig) -> i64 {
    [
        Operation::Bootstrap,
        Operation::Read,
        Operation::Write,
        Operation::Append,
        Operation::Search,
        Operation::Subscribe,
        Operation::Bulk,
        Operation::WebhookCreate,
        Operation::CapabilityCheck,
    ]
    .into_iter()
    .map(|op| limits_for(op, config).window_ms)
    .max()
    .unwrap_or(HOUR_MS)
}

/// Response headers and error-body contents for one admission check.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: i32,
    pub remaining: i32,
    pub reset_at_sec: i64,
    pub retry_after_sec: i64,
}

/// Runs the fixed-window check for `(operation, identifier)` against the
/// shared store.
pub async fn check(
    conn: &mut PgConnection,
    identifier: &str,
    operation: Operation,
    config: &RateLimitConfig,
) -> PgResult<RateLimitResult> {
    let limits = limits_for(operation, config);
    let key = format!("{operation}:{identifier}");
    let now_ms = Timestamp::now().as_millisecond();

    let decision = conn
        .check_rate_limit(&key, now_ms, limits.window_ms, limits.limit)
        .await?;

    Ok(RateLimitResult {
        allowed: decision.allowed,
        limit: limits.limit,
        remaining: decision.remaining,
        reset_at_sec: decision.reset_at_ms / 1000,
        retry_after_sec: decision.retry_after_secs,
    })
}

/// Builds the standard `X-RateLimit-*` (and `Retry-After` when denied)
/// headers for a check result.
pub fn build_headers(result: &RateLimitResult) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        ("X-RateLimit-Limit", result.limit.to_string()),
        ("X-RateLimit-Remaining", result.remaining.to_string()),
        ("X-RateLimit-Reset", result.reset_at_sec.to_string()),
    ];
    if !result.allowed {
        headers.push(("Retry-After", result.retry_after_sec.to_string()));
    }
    headers
}

/// Builds the 429 error body for a denied check.
pub fn build_error(result: &RateLimitResult, operation: Operation, window_label: &str) -> Error {
    let reset_at = Timestamp::from_second(result.reset_at_sec)
        .map(|t| t.to_string())
        .unwrap_or_default();

    Error::rate_limited(serde_json::json!({
        "limit": result.limit,
        "window": window_label,
        "retryAfterSeconds": result.retry_after_sec,
        "resetAt": reset_at,
    }))
    .with_message(format!(
        "Rate limit exceeded. Please retry after {} seconds.",
        result.retry_after_sec
    ))
    .with_details(serde_json::json!({
        "limit": result.limit,
        "window": window_label,
        "retryAfterSeconds": result.retry_after_sec,
        "resetAt": reset_at,
        "operation": operation.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_match_spec_table() {
        let config = RateLimitConfig::default();
        let bootstrap = limits_for(Operation::Bootstrap, &config);
        assert_eq!(bootstrap.limit, 10);
        assert_eq!(bootstrap.window_label, "1h");

        let read = limits_for(Operation::Read, &config);
        assert_eq!(read.limit, 1000);
        assert_eq!(read.window_label, "1m");
    }

    #[test]
    fn invalid_override_falls_back_to_default() {
        let config = RateLimitConfig {
            read_limit: Some(-1),
            ..RateLimitConfig::default()
        };
        assert_eq!(limits_for(Operation::Read, &config).limit, 1000);
    }

    #[test]
    fn valid_override_is_applied() {
        let config = RateLimitConfig {
            read_limit: Some(42),
            ..RateLimitConfig::default()
        };
        assert_eq!(limits_for(Operation::Read, &config).limit, 42);
    }

    #[test]
    fn max_window_is_the_widest_among_all_operations() {
        let config = RateLimitConfig::default();
        assert_eq!(max_window_ms(&config), HOUR_MS);
    }
}
