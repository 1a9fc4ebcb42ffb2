//! HTTP error taxonomy for the admission and distribution plane.
//!
//! Every rejection a core component can produce maps to one of the kinds
//! below, each carrying a fixed HTTP status and a stable machine-readable
//! `code`. Handlers surface `{status, body}` unchanged; callers never branch
//! on an internal cause before mapping to a response, so two different
//! internal reasons for a 404 render byte-identical bodies.

use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Result type alias used throughout the admission plane.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Stable error kinds, one per distinguishable rejection in the admission
/// and distribution plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Capability URL does not exist, is expired, or fails tier/scope checks.
    /// Also used for API-key validation failures that must not be
    /// distinguishable from "no such key".
    NotFound,
    /// Capability key or API key was explicitly revoked.
    KeyRevoked,
    /// Rate-limit counter for this identifier/operation is exhausted.
    RateLimited,
    /// Webhook URL failed the SSRF gate at create/update time.
    InvalidWebhookUrl,
    /// Malformed request body or parameters.
    InvalidRequest,
    /// Capability-scope path is malformed.
    InvalidPath,
    /// Event subscription pattern is malformed.
    InvalidPattern,
    /// Requested delivery/connection timeout is out of range.
    InvalidTimeout,
    /// An authenticated API key lacks a required scope.
    PermissionDenied,
    /// WS-token signature, structure, or segment count is invalid.
    TokenInvalid,
    /// WS-token `exp` has passed.
    TokenExpired,
    /// WS-token nonce was already consumed by a prior `/ws` upgrade.
    TokenAlreadyUsed,
    /// Unexpected internal fault, or a precondition (e.g. trusted IP policy)
    /// the operator must fix.
    ServerError,
}

impl ErrorKind {
    /// The stable machine-readable code sent in the response body.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::KeyRevoked => "KEY_REVOKED",
            Self::RateLimited => "RATE_LIMITED",
            Self::InvalidWebhookUrl => "INVALID_WEBHOOK_URL",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidPath => "INVALID_PATH",
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::InvalidTimeout => "INVALID_TIMEOUT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenAlreadyUsed => "TOKEN_ALREADY_USED",
            Self::ServerError => "SERVER_ERROR",
        }
    }

    /// The HTTP status this kind maps to.
    pub const fn status(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::KeyRevoked => StatusCode::GONE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidWebhookUrl
            | Self::InvalidRequest
            | Self::InvalidPath
            | Self::InvalidPattern
            | Self::InvalidTimeout => StatusCode::BAD_REQUEST,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::TokenInvalid | Self::TokenExpired | Self::TokenAlreadyUsed => {
                StatusCode::UNAUTHORIZED
            }
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `true` for kinds that represent a server fault worth an `error!`-level
    /// log; routine client rejections (expired keys, rate limits) are logged
    /// at `warn!` or below to avoid flooding logs from normal traffic.
    pub const fn is_server_fault(self) -> bool {
        matches!(self, Self::ServerError)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// An admission-plane error with an optional human-readable message and
/// structured detail payload (used for rate-limit `details` and similar).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    details: Option<serde_json::Value>,
}

impl Error {
    /// Creates a new error of the given kind with its default message.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: Cow::Borrowed(default_message(kind)),
            details: None,
        }
    }

    /// Overrides the default message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches structured detail to the error body (e.g. rate-limit window).
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The uniform 404 used for every capability-URL rejection cause.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// A revoked-key rejection (410).
    pub fn key_revoked() -> Self {
        Self::new(ErrorKind::KeyRevoked)
    }

    /// A rate-limit rejection (429), carrying the caller-facing details.
    pub fn rate_limited(details: serde_json::Value) -> Self {
        Self::new(ErrorKind::RateLimited).with_details(details)
    }

    /// An operator-fixable internal fault (missing trusted-IP config, DB
    /// unavailable, ...).
    pub fn server_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServerError).with_message(message)
    }

    /// A malformed or unverifiable WS token (401).
    pub fn token_invalid() -> Self {
        Self::new(ErrorKind::TokenInvalid)
    }

    /// An expired WS token (401).
    pub fn token_expired() -> Self {
        Self::new(ErrorKind::TokenExpired)
    }

    /// A WS token whose nonce was already consumed (401).
    pub fn token_already_used() -> Self {
        Self::new(ErrorKind::TokenAlreadyUsed)
    }
}

fn default_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "Key not found",
        ErrorKind::KeyRevoked => "Key has been revoked",
        ErrorKind::RateLimited => "Rate limit exceeded",
        ErrorKind::InvalidWebhookUrl => "Webhook URL failed validation",
        ErrorKind::InvalidRequest => "Invalid request",
        ErrorKind::InvalidPath => "Invalid path",
        ErrorKind::InvalidPattern => "Invalid event pattern",
        ErrorKind::InvalidTimeout => "Invalid timeout",
        ErrorKind::PermissionDenied => "Permission denied",
        ErrorKind::TokenInvalid => "Token is invalid",
        ErrorKind::TokenExpired => "Token has expired",
        ErrorKind::TokenAlreadyUsed => "Token has already been used",
        ErrorKind::ServerError => "An internal error occurred",
    }
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: ErrorBodyInner,
}

#[derive(Serialize)]
struct ErrorBodyInner {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.kind.is_server_fault() {
            tracing::error!(code = self.kind.code(), message = %self.message, "server fault");
        } else {
            tracing::warn!(code = self.kind.code(), message = %self.message, "request rejected");
        }

        let body = ErrorBody {
            ok: false,
            error: ErrorBodyInner {
                code: self.kind.code(),
                message: self.message.into_owned(),
                details: self.details,
            },
        };

        (self.kind.status(), Json(body)).into_response()
    }
}

impl From<wsp_postgres::PgError> for Error {
    fn from(err: wsp_postgres::PgError) -> Self {
        Error::server_error(err.to_string())
    }
}

impl From<wsp_webhook::Error> for Error {
    fn from(err: wsp_webhook::Error) -> Self {
        Error::server_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_body_is_stable_across_causes() {
        let a = Error::not_found();
        let b = Error::new(ErrorKind::NotFound).with_message("Key not found");
        assert_eq!(a.kind().code(), b.kind().code());
        assert_eq!(a.kind().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn key_revoked_is_410() {
        assert_eq!(Error::key_revoked().kind().status(), StatusCode::GONE);
    }

    #[test]
    fn rate_limited_is_429() {
        let err = Error::rate_limited(serde_json::json!({"limit": 100}));
        assert_eq!(err.kind().status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn server_fault_classification() {
        assert!(ErrorKind::ServerError.is_server_fault());
        assert!(!ErrorKind::RateLimited.is_server_fault());
        assert!(!ErrorKind::NotFound.is_server_fault());
    }
}
