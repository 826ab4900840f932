//! API error type and HTTP response formatting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pakcache_core::{AuthFailure, Error as CoreError};
use tracing::{error, warn};

/// API-level error that can be converted to an HTTP response.
///
/// Authentication failures carry a `WWW-Authenticate` challenge; the
/// internal distinction between a missing and an invalid credential is
/// logged but not exposed to the caller.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    challenge: bool,
}

impl ApiError {
    /// Create an error with an explicit status and message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), challenge: false }
    }

    /// The HTTP status of this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.challenge {
            (self.status, [("WWW-Authenticate", "Token")], self.message).into_response()
        } else {
            (self.status, self.message).into_response()
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = err.status_code();
        match err {
            CoreError::InvalidKey(key) => {
                Self::new(status, format!("\"{key}\" is not a valid artifact key"))
            }
            CoreError::NotFound(_) => Self::new(status, String::new()),
            CoreError::Unauthorized(failure) => {
                match &failure {
                    AuthFailure::Misconfigured => {
                        error!("rejecting request: {failure}");
                    }
                    AuthFailure::MissingCredential(_) | AuthFailure::InvalidToken => {
                        warn!("rejecting request: {failure}");
                    }
                }
                Self { status, message: String::new(), challenge: true }
            }
            CoreError::Io(e) => {
                error!(error = %e, "storage I/O failure");
                Self::new(status, String::new())
            }
            CoreError::Config(msg) => {
                error!(error = %msg, "configuration error surfaced at request time");
                Self::new(status, String::new())
            }
        }
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        CoreError::Unauthorized(failure).into()
    }
}
