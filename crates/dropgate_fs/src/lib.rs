//! # dropgate FileSystem Store
//!
//! A local filesystem backend for dropgate.
//!
//! This crate implements the [`ObjectStore`] trait, mapping object keys to
//! paths under a root directory.
//!
//! ## Features
//!
//! * **Atomic Writes**: Uses temporary files and rename operations so the
//!   catalog document and asset objects are never read half-written.
//!
//! ## Usage
//!
//! ```no_run
//! use dropgate_fs::FileSystemStore;
//!
//! let store = FileSystemStore::new("./dropgate_data");
//! ```

use dropgate_core::prelude::*;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::fs;
use tokio_util::io::ReaderStream;

async fn atomic_write(path: &std::path::Path, data: Bytes) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(StorageError::Io)?;
    }

    let tmp_path = path.with_extension("tmp");

    fs::write(&tmp_path, data).await.map_err(StorageError::Io)?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(StorageError::Io)?;

    Ok(())
}

#[derive(Clone)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    fn get_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ObjectStore for FileSystemStore {
    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let path = self.get_path(key);
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn get_stream(&self, key: &str) -> Result<ObjectByteStream, StorageError> {
        let path = self.get_path(key);
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::pin(ReaderStream::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<(), StorageError> {
        // The filesystem has nowhere to record a content type; it is only
        // meaningful for remote stores.
        atomic_write(&self.get_path(key), data).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.get_path(key);
        if path.exists() {
            fs::remove_file(&path).await.map_err(StorageError::Io)?;
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let root = self.root.clone();
        let prefix = prefix.to_string();

        // walkdir is synchronous; run the scan off the async runtime.
        let entries = tokio::task::spawn_blocking(move || {
            let mut entries = Vec::new();
            if !root.exists() {
                // Nothing has been written yet.
                return Ok(entries);
            }
            for entry in walkdir::WalkDir::new(&root) {
                let entry = entry.map_err(|e| StorageError::Generic(e.to_string()))?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let key = entry
                    .path()
                    .strip_prefix(&root)
                    .map_err(|e| StorageError::Generic(e.to_string()))?
                    .to_string_lossy()
                    .replace('\\', "/");
                if !key.starts_with(&prefix) {
                    continue;
                }

                let meta = entry
                    .metadata()
                    .map_err(|e| StorageError::Generic(e.to_string()))?;
                let last_modified = meta
                    .modified()
                    .ok()
                    .map(|t| DateTime::<Utc>::from(t));

                entries.push(ObjectEntry {
                    key,
                    size: meta.len(),
                    last_modified,
                });
            }
            Ok::<_, StorageError>(entries)
        })
        .await
        .map_err(|e| StorageError::Generic(format!("list task failed: {e}")))??;

        Ok(entries)
    }
}
