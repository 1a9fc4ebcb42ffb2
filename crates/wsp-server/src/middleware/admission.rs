//! Admission middleware: composes the IP resolver, operation classifier,
//! identifier selection, and rate limiter into a single pre-handler gate.
//!
//! This layer does not authenticate capability keys or API keys — it only
//! decides whether the request may proceed and attaches rate-limit headers.
//! Authorization (does this *specific* key permit this operation) remains
//! the route handler's job via [`crate::admission::capability::evaluate`].

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use wsp_postgres::PgClient;

use crate::admission::rate_limit::RateLimitConfig;
use crate::admission::{self, IpResolverPolicy};
use crate::error::Error;

/// State the admission middleware needs: a database handle for the rate
/// limiter and the configured IP-resolution and rate-limit policies.
#[derive(Clone)]
pub struct AdmissionState {
    pub db: PgClient,
    pub ip_policy: IpResolverPolicy,
    pub rate_limit_config: RateLimitConfig,
}

/// Runs the admission check for every non-exempt request, short-circuiting
/// with the appropriate status on rejection and otherwise attaching
/// `X-RateLimit-*` headers before the handler runs.
pub async fn admit(
    State(state): State<AdmissionState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if admission::is_admission_exempt(&path) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let headers = request.headers().clone();

    let ctx = admission::build_context(&method, &path, &headers, &state.ip_policy);

    if ctx.missing_trusted_ip {
        return Error::server_error(
            "Trusted client IP is required for this operation; configure TRUST_PROXY_HEADERS \
             or a trusted proxy shared secret.",
        )
        .into_response();
    }

    let mut conn = match state.db.get_connection().await {
        Ok(conn) => conn,
        Err(err) => return Error::from(err).into_response(),
    };

    let limits = admission::rate_limit::limits_for(ctx.operation, &state.rate_limit_config);
    let result = match admission::rate_limit::check(
        &mut conn,
        &ctx.identifier,
        ctx.operation,
        &state.rate_limit_config,
    )
    .await
    {
        Ok(result) => result,
        Err(err) => return Error::from(err).into_response(),
    };

    if !result.allowed {
        let mut response =
            admission::rate_limit::build_error(&result, ctx.operation, limits.window_label)
                .into_response();
        apply_headers(&mut response, &result);
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(&mut response, &result);
    response
}

fn apply_headers(response: &mut Response, result: &admission::RateLimitResult) {
    for (name, value) in admission::rate_limit::build_headers(result) {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            response.headers_mut().insert(name, header_value);
        }
    }
}
