//! Router assembly: wires the middleware stack (recovery, observability,
//! security, metrics, admission) around the distribution-plane routes this
//! crate owns directly — `/health`, the subscription-token issuance routes,
//! and the `/ws` upgrade endpoint. Full capability-URL CRUD route bodies
//! (file read/write/append, search, bulk, bootstrap, webhook management) are
//! out of scope and assembled, if at all, by the binary crate that embeds
//! this router alongside its own handlers.

use axum::extract::State;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::middleware::{
    CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig, admit,
};
use crate::state::AppState;
use crate::ws;

/// Builds the base router: `/health`, the subscribe-token issuance routes,
/// `/ws`, and the full middleware stack. Callers merge their own
/// capability-URL CRUD routes on top before serving.
pub fn build(state: AppState, cors: &CorsConfig, recovery: &RecoveryConfig) -> Router {
    let admission_state = state.admission_state();

    Router::new()
        .route("/health", get(health))
        .route("/{tier}/{key}/ops/subscribe", get(ws::subscribe_workspace))
        .route(
            "/{tier}/{key}/ops/folders/subscribe",
            get(ws::subscribe_folder),
        )
        .route("/ws", get(ws::upgrade))
        .with_state(state)
        .layer(from_fn_with_state(admission_state, admit))
        .with_metrics()
        .with_security(cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(recovery)
}

#[derive(Serialize)]
struct HealthBody {
    ok: bool,
    status: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let status = match state.db.get_connection().await {
        Ok(_) => "healthy",
        Err(_) => "degraded",
    };
    Json(HealthBody { ok: status == "healthy", status })
}
