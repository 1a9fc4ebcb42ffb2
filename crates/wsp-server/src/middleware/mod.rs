//! Middleware for `axum::Router` and HTTP request processing.
//!
//! This module provides the cross-cutting middleware stack: request
//! admission, observability, security, and error recovery.
//!
//! # Middleware Ordering
//!
//! The order in which middleware is applied matters significantly. Axum
//! applies layers in reverse order, meaning the last layer added wraps the
//! outermost request handling. The recommended ordering from outermost to
//! innermost is:
//!
//! 1. **Recovery** - Catches panics and enforces timeouts at the outermost layer,
//!    ensuring all errors are properly handled regardless of where they occur.
//!
//! 2. **Observability** - Generates request IDs and adds tracing spans early,
//!    so all subsequent middleware and handlers are properly instrumented.
//!
//! 3. **Security** - Applies CORS, security headers, and body limits before
//!    any request processing occurs.
//!
//! 4. **Metrics** - Tracks request timing and categorization after security
//!    checks but before admission.
//!
//! 5. **Admission** - Resolves client identity, classifies the operation,
//!    and consults the rate limiter for the innermost route handlers.
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::Router;
//! use wsp_server::middleware::{
//!     RouterRecoveryExt, RouterObservabilityExt, RouterSecurityExt,
//! };
//!
//! fn create_router() -> Router {
//!     Router::new()
//!         .with_metrics()                      // 4. Metrics
//!         .with_default_security()             // 3. Security
//!         .with_observability()                // 2. Observability
//!         .with_default_recovery()             // 1. Recovery (outermost)
//! }
//! ```

pub mod admission;
mod observability;
mod recovery;
mod security;

pub use admission::{AdmissionState, admit};
pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
