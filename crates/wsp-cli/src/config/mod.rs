//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown timeout
//! ├── middleware: MiddlewareConfig  # CORS, recovery/timeouts
//! ├── service: ServiceConfig        # Postgres, webhook HTTP client, WS secret
//! ├── ip_policy: IpResolverPolicy   # Trusted-proxy IP resolution
//! └── rate_limit: RateLimitConfig   # Per-operation rate-limit overrides
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Configure database and server
//! wsp-cli --postgres-url "postgresql://..." --port 8080
//!
//! # Or via environment variables
//! POSTGRES_URL="postgresql://..." PORT=8080 wsp-cli
//! ```

mod middleware;
mod server;
mod service;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::{ServerConfig, log_server_config};
pub use service::ServiceConfig;
use wsp_server::admission::IpResolverPolicy;
use wsp_server::admission::rate_limit::RateLimitConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
///
/// Combines all configuration groups for the workspace hub server:
/// - [`ServerConfig`]: network binding and shutdown timeout
/// - [`MiddlewareConfig`]: HTTP middleware (CORS, recovery)
/// - [`ServiceConfig`]: external service connections (Postgres, webhook HTTP client)
/// - [`IpResolverPolicy`]: trusted-proxy client-IP resolution
/// - [`RateLimitConfig`]: per-operation rate-limit overrides
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "wsp")]
#[command(about = "Workspace hub server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// External service configuration (database, outbound webhook HTTP client).
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Trusted-proxy client-IP resolution policy.
    #[clap(flatten)]
    pub ip_policy: IpResolverPolicy,

    /// Per-operation rate-limit overrides.
    #[clap(flatten)]
    pub rate_limit: RateLimitConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// This is the preferred way to initialize the CLI configuration as it ensures
    /// .env files are loaded before clap parses arguments, allowing environment
    /// variables from .env to be used as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    ///
    /// This should be called before parsing CLI arguments so that clap's `env`
    /// feature can pick up values from .env files.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    ///
    /// Outside of a development configuration, `WS_TOKEN_SECRET` must be set:
    /// an unset secret would otherwise mean every process restart silently
    /// invalidates every outstanding WS subscription token in a deployment
    /// where that matters.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;

        if self.service.ws_token_secret.is_none() && !self.server.is_development() {
            return Err(anyhow::anyhow!(
                "WS_TOKEN_SECRET must be set outside of a development configuration"
            ));
        }

        Ok(())
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        log_server_config(&self.server);

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            cors_origins = ?self.middleware.cors.allowed_origins,
            cors_credentials = self.middleware.cors.allow_credentials,
            request_timeout = self.middleware.recovery.request_timeout,
            "middleware configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            postgres_max_connections = self.service.postgres.postgres_max_connections,
            postgres_connection_timeout_secs = ?self.service.postgres.postgres_connection_timeout_secs,
            postgres_idle_timeout_secs = ?self.service.postgres.postgres_idle_timeout_secs,
            allow_http_webhooks = self.service.allow_http_webhooks,
            integration_test_mode = self.service.integration_test_mode,
            disable_scheduler = self.service.disable_scheduler,
            "service configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            trust_proxy_headers = self.ip_policy.trust_proxy_headers,
            trust_single_x_forwarded_for = self.ip_policy.trust_single_x_forwarded_for,
            "IP resolver configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "otel").then_some("otel"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
