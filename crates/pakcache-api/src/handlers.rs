//! Request handlers for the cache protocol.
//!
//! Every handler follows the same shape: validate the key, consult the
//! access policy (and the authenticator when the operation is
//! privileged), then perform the store operation and map its outcome
//! to a status. A malformed key short-circuits to 400 before the
//! credential is ever inspected.

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::TryStreamExt;
use pakcache_store::{validate_key, ArtifactStore};
use tracing::debug;

use crate::auth::{AuthContext, TokenAuthenticator};
use crate::error::ApiError;
use crate::policy::{AccessPolicy, Operation};

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The artifact store.
    pub store: ArtifactStore,
    /// The credential check for privileged operations.
    pub authenticator: TokenAuthenticator,
    /// The operation access policy.
    pub policy: AccessPolicy,
}

impl AppState {
    /// Run the credential check if `operation` is privileged.
    fn authorize(
        &self,
        operation: Operation,
        headers: &HeaderMap,
    ) -> Result<Option<AuthContext>, ApiError> {
        if !self.policy.is_privileged(operation) {
            return Ok(None);
        }
        let context = self.authenticator.authenticate(headers)?;
        Ok(Some(context))
    }
}

/// `GET /{key}` — retrieve artifact bytes.
pub async fn get_artifact(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    validate_key(&key)?;
    state.authorize(Operation::Retrieve, &headers)?;

    debug!(key, "artifact requested");
    let (len, body) = state.store.read(&key).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(body))
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// `HEAD /{key}` — check whether an artifact exists.
pub async fn head_artifact(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    validate_key(&key)?;
    state.authorize(Operation::Exists, &headers)?;

    debug!(key, "existence check");
    let status =
        if state.store.exists(&key).await? { StatusCode::OK } else { StatusCode::NOT_FOUND };
    Ok(status.into_response())
}

/// `PUT /{key}` — store or overwrite an artifact.
///
/// The request body is streamed straight into the store; it is never
/// buffered in memory as a whole.
pub async fn put_artifact(
    State(state): State<AppState>,
    Path(key): Path<String>,
    request: Request,
) -> Result<StatusCode, ApiError> {
    validate_key(&key)?;
    state.authorize(Operation::Store, request.headers())?;

    let body = request.into_body().into_data_stream().map_err(std::io::Error::other);
    state.store.write(&key, body).await?;

    debug!(key, "artifact stored");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /{key}` — remove an artifact.
pub async fn delete_artifact(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    validate_key(&key)?;
    state.authorize(Operation::Delete, &headers)?;

    state.store.delete(&key).await?;
    debug!(key, "artifact deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /` — enumerate the keys of all stored artifacts.
pub async fn list_artifacts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>, ApiError> {
    state.authorize(Operation::List, &headers)?;

    debug!("artifact list requested");
    let keys = state.store.list().await?;
    Ok(Json(keys))
}
