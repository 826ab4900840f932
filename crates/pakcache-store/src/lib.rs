// Copyright 2026 Pakcache Dev
// SPDX-License-Identifier: MIT

//! Filesystem storage for the pakcache artifact cache.
//!
//! This crate provides:
//! - Artifact key validation and path resolution
//! - A local filesystem store with atomic, streaming writes

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod resolve;
pub mod store;

pub use resolve::{resolve_path, validate_key};
pub use store::ArtifactStore;
