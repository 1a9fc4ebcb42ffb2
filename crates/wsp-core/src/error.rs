//! Shared error type used across the workspace-hub crates.
//!
//! [`Error`] is a small builder around an [`ErrorKind`] plus optional context,
//! carried all the way from the data layer up through the HTTP layer. `wsp-server`
//! owns the mapping from [`ErrorKind`] to an HTTP status and response body; this
//! crate only defines the taxonomy so every layer agrees on it.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Commonly used as a source error in structured error types, wrapping any error
/// that implements the standard `Error` trait while keeping Send and Sync bounds
/// for multi-threaded contexts.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result alias defaulting to the crate's [`Error`].
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// The class of failure behind an [`Error`].
///
/// Variants are named after the condition, not the transport-level status, since
/// the same kind can map to different statuses depending on caller-visible policy
/// (for example a revoked capability key is [`ErrorKind::Gone`], not `NotFound`,
/// while an unknown one is `NotFound` to avoid confirming existence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request was malformed independent of any specific field.
    BadRequest,
    /// A required path parameter was missing or malformed.
    MissingPathParam,
    /// The caller did not present a capability key or bearer token at all.
    MissingAuthToken,
    /// The caller's capability key or token did not parse.
    MalformedAuthToken,
    /// The caller's capability key or token is not valid for this resource.
    Unauthorized,
    /// The caller is known but lacks the permission tier the operation requires.
    Forbidden,
    /// No resource matches the given identifier, or the caller must not learn
    /// whether one exists.
    NotFound,
    /// The resource existed but has been permanently revoked or deleted.
    Gone,
    /// The request conflicts with the current state of the resource.
    Conflict,
    /// The request body exceeded the configured size limit.
    PayloadTooLarge,
    /// The caller exceeded the rate limit for this operation.
    TooManyRequests,
    /// An unexpected, non-recoverable failure.
    #[strum(serialize = "internal_server_error")]
    InternalServerError,
    /// The requested behavior is recognized but not implemented.
    NotImplemented,
    /// A downstream dependency is temporarily unavailable.
    ServiceUnavailable,
}

impl Default for ErrorKind {
    fn default() -> Self {
        Self::InternalServerError
    }
}

impl ErrorKind {
    /// Wraps this kind into an [`Error`] with no additional context.
    pub fn into_error<'a>(self) -> Error<'a> {
        Error::new(self)
    }

    /// Wraps this kind into an [`Error`] carrying the given context message.
    pub fn with_context(self, context: impl Into<Cow<'static, str>>) -> Error<'static> {
        Error::new(self).with_context(context)
    }
}

/// A structured, contextual error.
///
/// Construct one from an [`ErrorKind`] and optionally attach a developer-facing
/// `context`, a caller-facing `message`, and the `resource` name involved.
#[derive(Debug, Clone, Default)]
pub struct Error<'a> {
    kind: ErrorKind,
    context: Option<Cow<'a, str>>,
    message: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
}

impl<'a> Error<'a> {
    /// Creates a new error of the given kind with no context.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            message: None,
            resource: None,
        }
    }

    /// Attaches developer-facing context, logged but never returned to callers.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attaches a caller-facing message that overrides the kind's default.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches the name of the resource this error concerns.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Returns the error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the developer-facing context, if any.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the caller-facing message, if one was set.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the resource name, if one was set.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Clones the borrowed fields into owned storage, detaching the lifetime.
    pub fn into_static(self) -> Error<'static> {
        Error {
            kind: self.kind,
            context: self.context.map(|c| Cow::Owned(c.into_owned())),
            message: self.message.map(|m| Cow::Owned(m.into_owned())),
            resource: self.resource.map(|r| Cow::Owned(r.into_owned())),
        }
    }
}

impl From<ErrorKind> for Error<'static> {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(resource) = &self.resource {
            write!(f, " ({resource})")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl StdError for Error<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kind_is_internal_server_error() {
        assert_eq!(ErrorKind::default(), ErrorKind::InternalServerError);
    }

    #[test]
    fn builder_accumulates_fields() {
        let err = ErrorKind::NotFound
            .into_error()
            .with_resource("capability_key")
            .with_message("no such key");

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.resource(), Some("capability_key"));
        assert_eq!(err.message(), Some("no such key"));
        assert_eq!(err.context(), None);
    }

    #[test]
    fn into_static_detaches_lifetime() {
        let owned = String::from("borrowed context");
        let err = ErrorKind::Conflict.into_error().with_context(owned.as_str());
        let static_err: Error<'static> = err.into_static();
        assert_eq!(static_err.context(), Some("borrowed context"));
    }

    #[test]
    fn display_includes_resource_and_message() {
        let err = ErrorKind::Gone
            .into_error()
            .with_resource("webhook")
            .with_message("revoked");
        assert_eq!(err.to_string(), "gone (webhook): revoked");
    }
}
