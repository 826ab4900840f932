// Copyright 2026 Pakcache Dev
// SPDX-License-Identifier: MIT

//! Core types and utilities for the pakcache artifact cache.
//!
//! This crate provides the building blocks shared by all pakcache
//! components:
//! - Configuration management
//! - Error types with HTTP status mapping

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{AuthFailure, Error, Result};
