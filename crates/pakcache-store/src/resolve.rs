// Copyright 2026 Pakcache Dev
// SPDX-License-Identifier: MIT

//! Artifact key validation and physical path resolution.
//!
//! Keys are supplied by callers and must never be interpretable as
//! anything but a single file name under the store root. Validation
//! happens before any filesystem access; resolution itself performs no
//! I/O.

use std::path::{Component, Path, PathBuf};

use pakcache_core::{Error, Result};

/// Characters that are invalid in a file name on at least one host
/// platform. Path separators are included so a key can never escape
/// the store root.
const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '/', '\\'];

/// Prefix reserved for in-flight temporary files. Keys carrying it are
/// rejected so listings stay an exact inventory of stored artifacts.
pub(crate) const TMP_PREFIX: &str = ".pakcache-";

/// Validate an artifact key.
///
/// A key is accepted only if it would remain a single normal path
/// component when joined to the store root: no separators, no `.` or
/// `..`, no characters invalid in a host file name, no control
/// characters, not empty, and not the reserved temporary-file prefix.
///
/// # Errors
///
/// Returns `Error::InvalidKey` for any key that violates the above.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key == "." || key == ".." {
        return Err(Error::invalid_key(key));
    }

    if key.chars().any(|c| c.is_ascii_control() || INVALID_FILE_NAME_CHARS.contains(&c)) {
        return Err(Error::invalid_key(key));
    }

    if key.starts_with(TMP_PREFIX) {
        return Err(Error::invalid_key(key));
    }

    // Belt and braces: whatever survived the character check must still
    // parse as exactly one normal component.
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::invalid_key(key)),
    }
}

/// Resolve a validated artifact key to its physical path.
///
/// If `enforced_extension` is set (with its leading dot), any extension
/// on the key is replaced by it. Keys that differ only in extension
/// then alias to the same physical file; that normalization is
/// intentional and load-bearing for vcpkg-style clients that request
/// `foo.zip` for an artifact stored as `foo`.
///
/// # Errors
///
/// Returns `Error::InvalidKey` if the key fails [`validate_key`].
pub fn resolve_path(root: &Path, key: &str, enforced_extension: Option<&str>) -> Result<PathBuf> {
    validate_key(key)?;

    let mut path = root.join(key);
    if let Some(ext) = enforced_extension {
        path.set_extension(ext.trim_start_matches('.'));
    }

    Ok(path)
}
