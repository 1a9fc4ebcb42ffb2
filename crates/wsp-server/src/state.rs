//! Process-wide application state, shared by handlers, middleware, and the
//! background scheduler.

use std::sync::Arc;

use wsp_postgres::PgClient;
use wsp_webhook::WebhookService;

use crate::admission::rate_limit::RateLimitConfig;
use crate::admission::IpResolverPolicy;
use crate::events::EventBus;
use crate::middleware::AdmissionState;
use crate::ws::token::NonceStore;

/// Everything a route handler or background task needs to do its job.
///
/// Cheap to clone: every field is itself a handle (`Arc`, connection pool, or
/// broadcast sender) rather than owned state.
#[derive(Clone)]
pub struct AppState {
    pub db: PgClient,
    pub webhooks: WebhookService,
    pub bus: EventBus,
    /// HMAC key backing WS-token signatures. See [`crate::ws::token`].
    pub ws_secret: Arc<Vec<u8>>,
    pub ws_nonces: Arc<NonceStore>,
    pub ip_policy: IpResolverPolicy,
    pub rate_limit_config: RateLimitConfig,
    /// Allows `http://` webhook targets past the SSRF gate; only ever set for
    /// local development and integration tests.
    pub allow_http_webhooks: bool,
}

impl AppState {
    /// Builds application state from its constituent services and policies.
    pub fn new(
        db: PgClient,
        webhooks: WebhookService,
        ws_secret: Vec<u8>,
        ip_policy: IpResolverPolicy,
        rate_limit_config: RateLimitConfig,
        allow_http_webhooks: bool,
    ) -> Self {
        Self {
            db,
            webhooks,
            bus: EventBus::default(),
            ws_secret: Arc::new(ws_secret),
            ws_nonces: Arc::new(NonceStore::new()),
            ip_policy,
            rate_limit_config,
            allow_http_webhooks,
        }
    }

    /// Projects the subset of state the admission middleware depends on.
    pub fn admission_state(&self) -> AdmissionState {
        AdmissionState {
            db: self.db.clone(),
            ip_policy: self.ip_policy.clone(),
            rate_limit_config: self.rate_limit_config.clone(),
        }
    }
}
