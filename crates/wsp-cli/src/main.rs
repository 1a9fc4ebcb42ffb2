#![forbid(unsafe_code)]

mod config;
mod server;
mod telemetry;

use std::process;

use anyhow::Context;
use wsp_server::router;
use wsp_webhook::WebhookService;
use wsp_webhook::reqwest::ReqwestClient;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "wsp_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "wsp_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "wsp_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing();
    cli.validate().context("invalid configuration")?;
    cli.log();

    let db = cli
        .service
        .postgres
        .clone()
        .build()
        .context("failed to connect to postgres")?;

    let webhooks = WebhookService::new(ReqwestClient::new(cli.service.http.clone()));
    let allow_http_webhooks = cli.service.allow_http_webhooks || cli.service.integration_test_mode;

    let ws_token_secret = cli.service.ws_token_secret.clone().map_or_else(
        || {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_STARTUP,
                "WS_TOKEN_SECRET not set; generating an ephemeral secret for this process \
                 (every outstanding WS subscription token will be invalidated on restart)"
            );
            wsp_core::capability::generate_key(64).into_bytes()
        },
        String::into_bytes,
    );

    let state = wsp_server::AppState::new(
        db.clone(),
        webhooks.clone(),
        ws_token_secret,
        cli.ip_policy.clone(),
        cli.rate_limit.clone(),
        allow_http_webhooks,
    );

    let _webhook_trigger = wsp_server::webhook::spawn(db.clone(), webhooks, &state.bus, allow_http_webhooks);

    let scheduler = (!cli.service.disable_scheduler)
        .then(|| wsp_server::scheduler::Scheduler::spawn(db, state.bus.clone(), cli.rate_limit.clone()));

    let app = router::build(state, &cli.middleware.cors, &cli.middleware.recovery);

    server::serve_http(app, cli.server).await?;

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }

    Ok(())
}
