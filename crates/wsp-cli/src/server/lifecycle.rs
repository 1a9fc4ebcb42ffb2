//! Server lifecycle management and utilities.
//!
//! This module provides server lifecycle management including startup,
//! shutdown, and structured logging around both. All functions are designed
//! for production use with proper error handling and observability.

use std::future::Future;
use std::io;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::server::{ServerError, ServerResult};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Serves with lifecycle management and service-specific context.
///
/// Validates the configuration, logs startup and shutdown with service
/// context, and converts the serve future's error into a [`ServerError`]
/// with recovery suggestions attached.
///
/// # Arguments
///
/// * `server_config` - Server configuration
/// * `service_name` - Name of the service for logging context
/// * `serve_fn` - Function that returns the server future
///
/// # Errors
///
/// Returns [`ServerError::InvalidConfig`] if `server_config` fails
/// validation, or [`ServerError::Runtime`] if `serve_fn`'s future resolves
/// to an I/O error.
#[allow(clippy::too_many_lines)]
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    service_name: &str,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    let start_time = Instant::now();

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        service = service_name,
        addr = %server_config.server_addr(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting server"
    );

    if let Err(validation_error) = server_config.validate() {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            service = service_name,
            error = validation_error.to_string(),
            "Server configuration validation failed"
        );

        return Err(ServerError::invalid_config(&validation_error));
    }

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            service = service_name,
            "Server is bound to all interfaces (0.0.0.0). Ensure proper firewall configuration."
        );
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        service = service_name,
        host = %server_config.host,
        port = server_config.port,
        "Server configured for production use"
    );

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        service = service_name,
        shutdown_timeout = server_config.shutdown_timeout,
        binds_to_all_interfaces = server_config.binds_to_all_interfaces(),
        "Server configuration active"
    );

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        service = service_name,
        addr = %server_config.server_addr(),
        "Server is ready and listening for connections"
    );

    let result = serve_fn().await.map_err(|err| {
        let uptime = start_time.elapsed();
        let server_error = ServerError::Runtime(err);

        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            service = service_name,
            error = %server_error,
            error_code = server_error.error_code(),
            uptime_seconds = uptime.as_secs(),
            recoverable = server_error.is_recoverable(),
            "Server encountered fatal error"
        );

        if let Some(suggestion) = server_error.suggestion() {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                service = service_name,
                suggestion = suggestion,
                "Recovery suggestion"
            );
        }

        server_error
    });

    let uptime = start_time.elapsed();

    match &result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                service = service_name,
                uptime_seconds = uptime.as_secs(),
                "Server shutdown completed successfully"
            );
        }
        Err(err) => {
            for (key, value) in err.context() {
                tracing::debug!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    service = service_name,
                    context_key = key,
                    context_value = value,
                    "Error context"
                );
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    #[tokio::test]
    async fn serve_with_shutdown_success() {
        let config = ServerConfig::default();
        let result = serve_with_shutdown(&config, "test-service", || async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn serve_with_shutdown_handles_error() {
        let config = ServerConfig::default();
        let result = serve_with_shutdown(&config, "test-service", || async {
            Err(io::Error::other("test error"))
        })
        .await;

        assert!(result.is_err());
        match result {
            Err(ServerError::Runtime(_)) => {
                // Expected error type
            }
            _ => panic!("Expected Runtime error"),
        }
    }

    #[tokio::test]
    async fn serve_with_shutdown_provides_context() {
        let config = ServerConfig::default();
        let result = serve_with_shutdown(&config, "test-service", || async {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "access denied",
            ))
        })
        .await;

        assert!(result.is_err());
        if let Err(error) = result {
            assert!(error.is_recoverable());
            assert!(error.suggestion().is_some());
            assert_eq!(error.error_code(), "E003");
        }
    }

    #[tokio::test]
    async fn serve_with_shutdown_validates_config() {
        let config = ServerConfig {
            port: 80, // Invalid port for non-root users
            ..Default::default()
        };

        let result = serve_with_shutdown(&config, "test-service", || async { Ok(()) }).await;

        assert!(result.is_err());
        if let Err(ServerError::InvalidConfig(_)) = result {
            // Expected - config validation should fail before server starts
        } else {
            panic!("Expected InvalidConfig error");
        }
    }

    #[test]
    fn server_error_context_includes_suggestions() {
        let error = ServerError::bind_error(
            "127.0.0.1:80",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );

        assert!(error.is_network_error());
        assert!(error.is_recoverable());
        assert!(error.suggestion().unwrap().contains("port above 1024"));

        let context = error.context();
        assert!(context.iter().any(|(key, _)| *key == "error_code"));
        assert!(context.iter().any(|(key, _)| *key == "suggestion"));
    }
}
