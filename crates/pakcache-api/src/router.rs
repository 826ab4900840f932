//! Cache API router configuration.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use pakcache_core::Config;
use pakcache_store::ArtifactStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::TokenAuthenticator;
use crate::handlers::{self, AppState};
use crate::policy::AccessPolicy;

/// Create the cache API router.
///
/// The cache surface is deliberately small: `GET /` lists keys, and
/// `/{key}` supports `GET`, `HEAD`, `PUT` and `DELETE`.
pub fn create_router(config: &Config) -> Router {
    let state = AppState {
        store: ArtifactStore::new(
            config.storage.root.clone(),
            config.storage.enforced_extension(),
        ),
        authenticator: TokenAuthenticator::new(&config.auth),
        policy: AccessPolicy { public_reads: config.auth.public_reads },
    };

    let router = Router::new()
        .route("/", get(handlers::list_artifacts))
        .route(
            "/{key}",
            get(handlers::get_artifact)
                .head(handlers::head_artifact)
                .put(handlers::put_artifact)
                .delete(handlers::delete_artifact),
        )
        .with_state(state);

    // Add HTTP request/response tracing if enabled
    let router = if config.logging.log_requests {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO));
        router.layer(trace_layer)
    } else {
        router
    };

    // Apply body limit (0 means unlimited)
    if config.server.max_body_size > 0 {
        router.layer(DefaultBodyLimit::max(config.server.max_body_size as usize))
    } else {
        router.layer(DefaultBodyLimit::disable())
    }
}
