//! HTTP API for the pakcache artifact cache.
//!
//! This crate provides:
//! - Token authentication against configurable headers
//! - Per-operation request handlers for the cache protocol
//! - Router construction with an explicit access-policy table

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod error;
pub mod handlers;
pub mod policy;
pub mod router;

pub use auth::{AuthContext, TokenAuthenticator};
pub use error::ApiError;
pub use handlers::AppState;
pub use policy::{AccessPolicy, Operation};
pub use router::create_router;
