// Copyright 2026 Pakcache Dev
// SPDX-License-Identifier: MIT

//! Local filesystem artifact store.
//!
//! All operations re-read the filesystem's current truth; nothing is
//! cached across requests. Writes go to a temporary file beside the
//! target and are renamed into place so a reader can never observe a
//! partially-written artifact.

use std::path::PathBuf;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use pakcache_core::{Error, Result};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::resolve::TMP_PREFIX;

/// Local filesystem storage for cached artifacts.
///
/// The store root is exclusively owned by this type; it is only ever
/// mutated through [`write`](Self::write) and [`delete`](Self::delete).
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    enforced_extension: Option<String>,
}

impl ArtifactStore {
    /// Create a store over an existing root directory.
    ///
    /// The root is expected to exist; configuration validation checks
    /// that before the server becomes ready.
    #[must_use]
    pub fn new(root: PathBuf, enforced_extension: Option<String>) -> Self {
        Self { root, enforced_extension }
    }

    /// The configured store root.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        crate::resolve::resolve_path(&self.root, key, self.enforced_extension.as_deref())
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(format!("{TMP_PREFIX}{}.tmp", Uuid::new_v4()))
    }

    /// Whether an artifact is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKey` for a malformed key or `Error::Io`
    /// on a filesystem fault.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Open the artifact stored under `key` for streaming.
    ///
    /// Returns the artifact size and a byte stream over its content.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no artifact exists, `Error::InvalidKey`
    /// for a malformed key, or `Error::Io` on a filesystem fault.
    pub async fn read(&self, key: &str) -> Result<(u64, ReaderStream<File>)> {
        let path = self.resolve(key)?;

        let file = File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(key)
            } else {
                Error::Io(e)
            }
        })?;
        let len = file.metadata().await?.len();

        debug!(key, len, "serving artifact from cache");
        Ok((len, ReaderStream::new(file)))
    }

    /// Store or overwrite the artifact under `key` from a byte stream.
    ///
    /// The stream is drained into a temporary file in the store root
    /// and renamed into place on completion, so concurrent readers see
    /// either the complete prior content or the complete new content.
    /// On any failure, including the final rename, the temporary file
    /// is discarded and any previously stored artifact stays intact.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKey` for a malformed key or `Error::Io`
    /// if the transfer or any filesystem operation fails.
    pub async fn write<S>(&self, key: &str, stream: S) -> Result<()>
    where
        S: Stream<Item = std::io::Result<Bytes>>,
    {
        let path = self.resolve(key)?;
        let tmp = self.temp_path();

        if let Err(e) = self.write_temp(&tmp, stream).await {
            discard_temp(&tmp).await;
            return Err(e);
        }

        // Same directory as the target, so this is atomic.
        if let Err(e) = fs::rename(&tmp, &path).await {
            discard_temp(&tmp).await;
            return Err(e.into());
        }

        debug!(key, "artifact stored");
        Ok(())
    }

    async fn write_temp<S>(&self, tmp: &std::path::Path, stream: S) -> Result<()>
    where
        S: Stream<Item = std::io::Result<Bytes>>,
    {
        let mut stream = std::pin::pin!(stream);
        let mut file = File::create(tmp).await?;

        while let Some(chunk) = stream.try_next().await? {
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Delete the artifact stored under `key`.
    ///
    /// Repeated deletes converge to "absent": the first succeeds, the
    /// second reports `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no artifact exists, `Error::InvalidKey`
    /// for a malformed key, or `Error::Io` on a filesystem fault.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;

        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(key)
            } else {
                Error::Io(e)
            }
        })?;

        debug!(key, "artifact deleted");
        Ok(())
    }

    /// Enumerate the logical keys of all stored artifacts.
    ///
    /// When an extension is enforced it is stripped to recover the
    /// logical key. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the store root cannot be read.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(TMP_PREFIX) {
                continue;
            }

            let key = match self.enforced_extension.as_deref() {
                Some(ext) => name.strip_suffix(ext).unwrap_or(&name).to_string(),
                None => name,
            };
            keys.push(key);
        }

        Ok(keys)
    }
}

/// Best-effort removal of an in-flight temporary file after a failed
/// write. The original error is what the caller reports; a cleanup
/// failure is only logged.
async fn discard_temp(tmp: &std::path::Path) {
    if let Err(e) = fs::remove_file(tmp).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(tmp = %tmp.display(), error = %e, "failed to remove temporary file");
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;
    use tempfile::TempDir;

    use super::*;

    fn chunks(data: &[&[u8]]) -> impl Stream<Item = std::io::Result<Bytes>> {
        let owned: Vec<std::io::Result<Bytes>> =
            data.iter().map(|c| Ok(Bytes::copy_from_slice(c))).collect();
        stream::iter(owned)
    }

    async fn read_all(store: &ArtifactStore, key: &str) -> Vec<u8> {
        let (len, body) = store.read(key).await.unwrap();
        let data: Vec<u8> =
            body.try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap();
        assert_eq!(data.len() as u64, len);
        data
    }

    fn test_store(ext: Option<&str>) -> (ArtifactStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().to_path_buf(), ext.map(String::from));
        (store, dir)
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (store, _dir) = test_store(None);

        store.write("zlib", chunks(&[b"hello, ", b"cache"])).await.unwrap();
        assert_eq!(read_all(&store, "zlib").await, b"hello, cache");
    }

    #[tokio::test]
    async fn empty_artifact_round_trips() {
        let (store, _dir) = test_store(None);

        store.write("empty", chunks(&[])).await.unwrap();
        assert!(store.exists("empty").await.unwrap());
        assert_eq!(read_all(&store, "empty").await, b"");
    }

    #[tokio::test]
    async fn overwrite_replaces_fully() {
        let (store, _dir) = test_store(None);

        store.write("pkg", chunks(&[b"first generation, quite long"])).await.unwrap();
        store.write("pkg", chunks(&[b"second"])).await.unwrap();
        assert_eq!(read_all(&store, "pkg").await, b"second");
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let (store, _dir) = test_store(None);

        assert!(matches!(store.read("absent").await, Err(Error::NotFound(_))));
        assert!(!store.exists("absent").await.unwrap());
    }

    #[tokio::test]
    async fn delete_is_idempotent_in_effect() {
        let (store, _dir) = test_store(None);

        store.write("pkg", chunks(&[b"bytes"])).await.unwrap();
        store.delete("pkg").await.unwrap();
        assert!(!store.exists("pkg").await.unwrap());
        assert!(matches!(store.delete("pkg").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_keys_touch_no_filesystem() {
        let (store, dir) = test_store(None);

        for key in ["../escape", "a/b", "a\\b", "", ".."] {
            assert!(matches!(store.write(key, chunks(&[b"x"])).await, Err(Error::InvalidKey(_))));
            assert!(matches!(store.read(key).await, Err(Error::InvalidKey(_))));
            assert!(matches!(store.delete(key).await, Err(Error::InvalidKey(_))));
            assert!(matches!(store.exists(key).await, Err(Error::InvalidKey(_))));
        }

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn enforced_extension_aliases_keys() {
        let (store, _dir) = test_store(Some(".bin"));

        store.write("foo", chunks(&[b"payload"])).await.unwrap();
        assert_eq!(read_all(&store, "foo.zip").await, b"payload");
        assert!(store.exists("foo.tar").await.unwrap());

        store.delete("foo.zip").await.unwrap();
        assert!(!store.exists("foo").await.unwrap());
    }

    #[tokio::test]
    async fn list_returns_logical_keys() {
        let (store, _dir) = test_store(Some(".bin"));

        store.write("alpha", chunks(&[b"a"])).await.unwrap();
        store.write("beta.zip", chunks(&[b"b"])).await.unwrap();

        let mut keys = store.list().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["alpha".to_string(), "beta".to_string()]);

        store.delete("beta").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["alpha".to_string()]);
    }

    #[tokio::test]
    async fn aborted_write_leaves_prior_artifact_intact() {
        let (store, dir) = test_store(None);

        store.write("pkg", chunks(&[b"previous generation"])).await.unwrap();

        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial ")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionAborted, "client went away")),
        ]);
        assert!(matches!(store.write("pkg", failing).await, Err(Error::Io(_))));

        assert_eq!(read_all(&store, "pkg").await, b"previous generation");

        // No temp file left behind.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(TMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn failed_rename_discards_temporary_file() {
        let (store, dir) = test_store(None);

        // A directory squatting on the target path makes the final
        // rename fail after the temp file is fully written.
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        assert!(matches!(store.write("pkg", chunks(&[b"payload"])).await, Err(Error::Io(_))));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(TMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty(), "temporary file left behind: {leftovers:?}");
    }

    #[tokio::test]
    async fn reserved_prefix_keys_are_rejected() {
        let (store, dir) = test_store(None);

        for key in [".pakcache-sneaky", ".pakcache-", ".pakcache-0000.tmp"] {
            assert!(matches!(store.write(key, chunks(&[b"x"])).await, Err(Error::InvalidKey(_))));
            assert!(matches!(store.exists(key).await, Err(Error::InvalidKey(_))));
        }

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_writes_yield_one_complete_generation() {
        let (store, _dir) = test_store(None);

        let payloads: Vec<Vec<u8>> =
            (0u8..8).map(|i| vec![i; 64 * 1024 + usize::from(i)]).collect();

        let mut handles = Vec::new();
        for payload in &payloads {
            let store = store.clone();
            let payload = payload.clone();
            handles.push(tokio::spawn(async move {
                let body = stream::once(async move { Ok(Bytes::from(payload)) });
                store.write("contended", body).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let observed = read_all(&store, "contended").await;
        assert!(
            payloads.iter().any(|p| p == &observed),
            "read must observe exactly one submitted generation"
        );
    }
}
