//! Shared-secret token authentication.
//!
//! Privileged requests must carry the literal two-token credential
//! `Token <secret>` in one of the configured headers. The check is
//! stateless and re-run independently per request.

use axum::http::HeaderMap;
use pakcache_core::config::AuthConfig;
use pakcache_core::AuthFailure;
use tracing::debug;

/// The scheme word a credential value must start with.
const SCHEME: &str = "Token";

/// Request-scoped identity attached after a successful check.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The validated token as presented by the caller.
    pub token: String,
}

/// Validates `Token <secret>` credentials against inbound headers.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    token: String,
    headers: Vec<String>,
}

impl TokenAuthenticator {
    /// Create an authenticator from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self { token: config.token.clone(), headers: config.headers.clone() }
    }

    /// Evaluate the configured headers of a request.
    ///
    /// Header names are inspected in configured order, every value of a
    /// multi-valued header is considered, and the first candidate whose
    /// secret matches wins. A candidate with the wrong secret does not
    /// abort the scan; a malformed value (wrong token count or wrong
    /// scheme word) is simply not a candidate.
    ///
    /// # Errors
    ///
    /// - `Misconfigured` if no secret is configured (checked before any
    ///   header is read),
    /// - `MissingCredential` if no header produced a candidate,
    /// - `InvalidToken` if candidates were seen but none matched.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthFailure> {
        if self.token.trim().is_empty() {
            return Err(AuthFailure::Misconfigured);
        }

        let mut saw_candidate = false;

        for name in &self.headers {
            for value in headers.get_all(name.as_str()) {
                let Ok(value) = value.to_str() else {
                    continue;
                };

                let mut parts = value.split_whitespace();
                let (Some(scheme), Some(secret), None) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    continue;
                };
                if scheme != SCHEME {
                    continue;
                }

                saw_candidate = true;
                if constant_time_eq(secret.as_bytes(), self.token.as_bytes()) {
                    return Ok(AuthContext { token: secret.to_string() });
                }
            }
        }

        if saw_candidate {
            debug!("credential presented but token did not match");
            Err(AuthFailure::InvalidToken)
        } else {
            let first = self.headers.first().cloned().unwrap_or_default();
            debug!(header = %first, "no credential presented");
            Err(AuthFailure::MissingCredential(first))
        }
    }
}

/// Compare two byte slices without short-circuiting on the first
/// mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
