use dropgate_core::prelude::*;

use bytes::Bytes;
use opendal::Operator;

#[derive(Clone)]
pub struct OpendalStore {
    op: Operator,
}

impl OpendalStore {
    /// Create a new store from an OpenDAL Operator.
    /// The Operator can be configured for any supported backend e.g., s3, fs, gcs, etc.
    pub fn new(op: Operator) -> Self {
        Self { op }
    }
}

impl ObjectStore for OpendalStore {
    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        match self.op.read(key).await {
            Ok(buffer) => Ok(buffer.to_bytes()),
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Generic(e.to_string())),
        }
    }

    async fn get_stream(&self, key: &str) -> Result<ObjectByteStream, StorageError> {
        let reader = match self.op.reader(key).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(StorageError::Generic(e.to_string())),
        };

        let stream = reader
            .into_bytes_stream(..)
            .await
            .map_err(|e| StorageError::Generic(format!("OpenDAL Stream Error: {e}")))?;
        Ok(Box::pin(stream))
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.op
            .write_with(key, data)
            .content_type(content_type)
            .await
            .map_err(|e| StorageError::Generic(format!("OpenDAL Write Error: {e}")))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.op
            .delete(key)
            .await
            .map_err(|e| StorageError::Generic(format!("OpenDAL Delete Error: {e}")))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let entries = self
            .op
            .list_with(prefix)
            .recursive(true)
            .await
            .map_err(|e| StorageError::Generic(format!("OpenDAL List Error: {e}")))?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.metadata().is_file())
            .map(|entry| {
                let meta = entry.metadata();
                ObjectEntry {
                    key: entry.path().to_string(),
                    size: meta.content_length(),
                    last_modified: meta.last_modified(),
                }
            })
            .collect())
    }
}
