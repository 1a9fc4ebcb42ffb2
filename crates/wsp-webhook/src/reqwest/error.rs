//! Error types for reqwest-based webhook delivery.

use thiserror::Error;

/// Result type alias for reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<Error> for crate::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) if e.is_timeout() => crate::Error::new(crate::ErrorKind::ServiceUnavailable)
                .with_message(format!("webhook request timed out: {e}")),
            Error::Reqwest(e) if e.is_connect() => crate::Error::new(crate::ErrorKind::ServiceUnavailable)
                .with_message(format!("webhook connection failed: {e}")),
            Error::Reqwest(e) => {
                crate::Error::new(crate::ErrorKind::ServiceUnavailable).with_message(e.to_string())
            }
            Error::Serde(e) => {
                crate::Error::new(crate::ErrorKind::BadRequest).with_message(e.to_string())
            }
        }
    }
}
