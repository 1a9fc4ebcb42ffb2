//! Tracing subscriber initialization.

mod tracing;

/// Initializes the tracing subscriber based on enabled features.
///
/// Initializes tracing with OpenTelemetry-oriented environment filtering
/// when the `otel` feature is enabled, or plain structured logging
/// otherwise.
pub fn init_tracing() {
    #[cfg(feature = "otel")]
    let result = tracing::init_tracing_with_otel();
    #[cfg(not(feature = "otel"))]
    let result = tracing::init_tracing();

    if let Err(err) = result {
        eprintln!("Warning: failed to initialize tracing subscriber: {err}");
    }
}
