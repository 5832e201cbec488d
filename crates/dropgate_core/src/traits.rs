use crate::error::*;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Byte chunks of a single object, as produced by [`ObjectStore::get_stream`].
pub type ObjectByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// One entry from a prefix listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Thin adapter over the external object store. Both services talk to the
/// same bucket through this trait; it is the only shared channel they have.
pub trait ObjectStore: Send + Sync + 'static + Clone {
    fn get(&self, key: &str) -> impl Future<Output = Result<Bytes, StorageError>> + Send;

    fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn list(&self, prefix: &str)
    -> impl Future<Output = Result<Vec<ObjectEntry>, StorageError>> + Send;

    /// Open the object as a byte stream. The default buffers the whole
    /// object; backends that can stream from the wire should override it.
    fn get_stream(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<ObjectByteStream, StorageError>> + Send {
        async move {
            let data = self.get(key).await?;
            let stream: ObjectByteStream = Box::pin(stream::once(async move { Ok(data) }));
            Ok(stream)
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: String,
}

/// Verifies an administrator session token on the admin surface. The login
/// mechanism behind it (static secret, OAuth, ...) is up to the provider.
pub trait AdminAuth: Send + Sync + 'static + Clone {
    fn verify(&self, token: &str) -> impl Future<Output = Result<AdminUser, AuthError>> + Send;
}
