//! Error types and HTTP status propagation
//!
//! Two kinds of errors live here:
//!
//! - [`Error`]: the crate-level error returned by setup code (configuration
//!   loading, tracing initialisation).
//! - [`HttpError`]: an error carrying an HTTP status code. Handlers, decoders
//!   and encoders return erased [`BoxError`]s; any of them may carry an
//!   `HttpError` somewhere in its cause chain, and [`error_status`] finds it.
//!
//! # Example
//!
//! ```rust
//! use typed_handler::{error_status, wrap_error, HttpError};
//! use http::StatusCode;
//!
//! let err = wrap_error(StatusCode::NOT_FOUND, "user not found");
//! assert_eq!(error_status(&*err, StatusCode::INTERNAL_SERVER_ERROR), StatusCode::NOT_FOUND);
//! assert_eq!(err.to_string(), "404: user not found");
//!
//! // The first code wins.
//! let err = wrap_error(StatusCode::BAD_REQUEST, err);
//! assert_eq!(error_status(&*err, StatusCode::OK), StatusCode::NOT_FOUND);
//! ```

use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// Erased error type used across handler, decoder and encoder boundaries
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for setup code
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

// ============================================================================
// HTTP-coded errors
// ============================================================================

/// An error with an HTTP status code attached
///
/// Displays as `"<code>: <cause>"`, e.g. `"400: name is required"`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    source: BoxError,
}

impl HttpError {
    /// Create a fresh coded error from a message
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            source: message.into().into(),
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Create a 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// The carried status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The wrapped cause
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.source
    }

    /// Unwrap into the cause, dropping the status code
    pub fn into_cause(self) -> BoxError {
        self.source
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.source)
    }
}

impl StdError for HttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source)
    }
}

/// Find the status code carried anywhere in the error's cause chain
fn carried_status(err: &(dyn StdError + 'static)) -> Option<StatusCode> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(http) = err.downcast_ref::<HttpError>() {
            return Some(http.status);
        }
        current = err.source();
    }
    None
}

/// Status code of `err`, or `default` when it carries none
pub fn error_status(err: &(dyn StdError + 'static), default: StatusCode) -> StatusCode {
    carried_status(err).unwrap_or(default)
}

/// Attach `status` to `err` unless it already carries a code
///
/// Wrapping is idempotent: an already-coded error is returned unchanged, so
/// the first code attached wins.
pub fn wrap_error(status: StatusCode, err: impl Into<BoxError>) -> BoxError {
    let err = err.into();
    if carried_status(&*err).is_some() {
        return err;
    }
    Box::new(HttpError {
        status,
        source: err,
    })
}

/// Replace the status code of `err`
///
/// A top-level [`HttpError`] is unwrapped to its cause first, so the result
/// is never double-wrapped.
pub fn override_error(status: StatusCode, err: impl Into<BoxError>) -> BoxError {
    let source = match err.into().downcast::<HttpError>() {
        Ok(http) => http.source,
        Err(err) => err,
    };
    Box::new(HttpError { status, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn cause() -> io::Error {
        io::Error::other("disk on fire")
    }

    #[test]
    fn test_display_includes_code() {
        let err = HttpError::not_found("user not found");
        assert_eq!(err.to_string(), "404: user not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_wrap_attaches_code_to_uncoded_error() {
        let err = wrap_error(StatusCode::BAD_REQUEST, cause());
        assert_eq!(
            error_status(&*err, StatusCode::INTERNAL_SERVER_ERROR),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(err.to_string(), "400: disk on fire");
    }

    #[test]
    fn test_wrap_is_idempotent_first_code_wins() {
        let err = wrap_error(
            StatusCode::BAD_REQUEST,
            wrap_error(StatusCode::INTERNAL_SERVER_ERROR, cause()),
        );
        assert_eq!(
            error_status(&*err, StatusCode::OK),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        // Not wrapped a second time.
        let http = err.downcast_ref::<HttpError>().unwrap();
        assert!(http.cause().downcast_ref::<HttpError>().is_none());
    }

    #[test]
    fn test_wrap_finds_code_deep_in_chain() {
        #[derive(Debug, Error)]
        #[error("outer")]
        struct Outer(#[source] HttpError);

        let err = wrap_error(
            StatusCode::BAD_REQUEST,
            Outer(HttpError::new(StatusCode::CONFLICT, "taken")),
        );
        assert_eq!(error_status(&*err, StatusCode::OK), StatusCode::CONFLICT);
        assert!(err.downcast_ref::<Outer>().is_some());
    }

    #[test]
    fn test_override_replaces_code_and_keeps_cause() {
        let err = override_error(
            StatusCode::NOT_FOUND,
            wrap_error(StatusCode::INTERNAL_SERVER_ERROR, cause()),
        );
        assert_eq!(error_status(&*err, StatusCode::OK), StatusCode::NOT_FOUND);

        let http = err.downcast_ref::<HttpError>().unwrap();
        assert!(http.cause().downcast_ref::<HttpError>().is_none());
        assert!(http.cause().downcast_ref::<io::Error>().is_some());
        assert_eq!(err.to_string(), "404: disk on fire");
    }

    #[test]
    fn test_override_uncoded_error() {
        let err = override_error(StatusCode::CONFLICT, "already exists");
        assert_eq!(error_status(&*err, StatusCode::OK), StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_status_default_for_uncoded() {
        let err: BoxError = cause().into();
        assert_eq!(
            error_status(&*err, StatusCode::INTERNAL_SERVER_ERROR),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_cause() {
        let err = HttpError::new(StatusCode::GONE, "expired");
        assert_eq!(err.into_cause().to_string(), "expired");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = figment::Error::from("bad value".to_string()).into();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
