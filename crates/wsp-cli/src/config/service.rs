//! Service configuration: database and outbound webhook HTTP client.

use clap::Args;
use serde::{Deserialize, Serialize};
use wsp_postgres::PgConfig;
use wsp_webhook::reqwest::ReqwestConfig;

/// CLI service configuration with command-line argument parsing.
///
/// Groups the configuration for every external dependency the server talks
/// to: Postgres and the outbound HTTP client used for webhook delivery.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Postgres connection configuration.
    #[clap(flatten)]
    pub postgres: PgConfig,

    /// Outbound HTTP client configuration used for webhook delivery.
    #[clap(flatten)]
    pub http: ReqwestConfig,

    /// Secret used to sign WebSocket subscription tokens.
    ///
    /// Treat this the same as any other HMAC signing key: keep it out of
    /// version control and rotate it if it leaks. Required outside of
    /// development (see [`super::Cli::validate`]); when unset in a
    /// development configuration an ephemeral secret is generated at
    /// process start instead, invalidating every outstanding token on restart.
    #[arg(long, env = "WS_TOKEN_SECRET")]
    pub ws_token_secret: Option<String>,

    /// Allows `http://` webhook target URLs past the SSRF gate.
    ///
    /// Only ever set for local development and integration tests; production
    /// deployments should leave this false so only `https://` targets are
    /// accepted.
    #[arg(long, env = "ALLOW_HTTP_WEBHOOKS", default_value_t = false)]
    pub allow_http_webhooks: bool,

    /// Relaxes the same SSRF checks as `allow_http_webhooks`, for test
    /// harnesses that flip one switch to mean "this run talks to
    /// loopback-hosted fixtures."
    #[arg(long, env = "INTEGRATION_TEST_MODE", default_value_t = false)]
    pub integration_test_mode: bool,

    /// Disables the background maintenance scheduler (claim expiry,
    /// rate-limit counter cleanup, webhook delivery retention).
    ///
    /// Useful for running multiple server replicas behind a load balancer
    /// with only one replica running the scheduler, or for tests.
    #[arg(long, env = "DISABLE_SCHEDULER", default_value_t = false)]
    pub disable_scheduler: bool,
}
