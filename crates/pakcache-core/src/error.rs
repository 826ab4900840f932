// Copyright 2026 Pakcache Dev
// SPDX-License-Identifier: MIT

//! Error types for pakcache with HTTP status mapping.

use thiserror::Error;

/// A specialized `Result` type for pakcache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// How an authentication attempt failed.
///
/// The two request-level failures are distinguished internally (and in
/// logs) but both surface to the caller as an access denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No configured header carried a `Token <secret>` credential.
    /// Carries the first configured header name for diagnostics.
    MissingCredential(String),
    /// A credential was presented but the secret did not match.
    InvalidToken,
    /// The expected token is not configured; nothing can authenticate.
    Misconfigured,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential(header) => {
                write!(f, "no credential found, expected a token in \"{header}\"")
            }
            Self::InvalidToken => write!(f, "the provided token is invalid"),
            Self::Misconfigured => write!(f, "no authentication token is configured"),
        }
    }
}

/// Errors that can occur during pakcache operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The artifact key cannot be used as a file name.
    #[error("invalid artifact key: {0}")]
    InvalidKey(String),

    /// No artifact is stored under the given key.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// The request did not carry a valid credential.
    #[error("unauthorized: {0}")]
    Unauthorized(AuthFailure),

    /// Configuration error, detected once at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an invalid-key error.
    #[must_use]
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidKey(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Config(_) | Self::Io(_) => 500,
        }
    }

    /// Returns the HTTP status code as an `http::StatusCode`.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(Error::invalid_key("a/b").http_status(), 400);
        assert_eq!(Error::not_found("zlib").http_status(), 404);
        assert_eq!(Error::Unauthorized(AuthFailure::InvalidToken).http_status(), 401);
        assert_eq!(
            Error::Unauthorized(AuthFailure::MissingCredential("Authorization".into()))
                .http_status(),
            401
        );
        assert_eq!(Error::Config("bad".into()).http_status(), 500);
        assert_eq!(
            Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
                .http_status(),
            500
        );
    }

    #[test]
    fn auth_failure_display_names_header() {
        let failure = AuthFailure::MissingCredential("X-Cache-Token".into());
        assert!(failure.to_string().contains("X-Cache-Token"));
    }
}
