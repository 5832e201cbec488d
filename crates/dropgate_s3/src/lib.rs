use dropgate_core::prelude::*;

use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, instrument};

/// S3 (or S3-compatible, e.g. COS) backend. Both services point at the same
/// bucket; an optional key prefix scopes everything, catalog included.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: String, prefix: Option<String>) -> Self {
        Self {
            client,
            bucket,
            prefix: prefix.unwrap_or_default(),
        }
    }

    fn key(&self, key: &str) -> String {
        self.prefix
            .is_empty()
            .then(|| key.to_string())
            .unwrap_or(format!("{}{key}", self.prefix))
    }
}

fn to_chrono(ts: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

impl ObjectStore for S3Store {
    #[instrument(skip(self), fields(bucket = %self.bucket, key))]
    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let full_key = self.key(key);
        tracing::Span::current().record("key", &full_key);

        debug!("Reading object from S3...");
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await;

        match res {
            Ok(output) => {
                let data = output.body.collect().await.map_err(|e| {
                    error!("Failed to stream body: {:?}", e);
                    StorageError::Generic(format!("Failed to stream S3 body: {e}"))
                })?;
                Ok(data.into_bytes())
            }
            Err(SdkError::ServiceError(err)) => {
                let inner = err.err();
                if inner.is_no_such_key() {
                    debug!("Object not found in S3");
                    Err(StorageError::NotFound(key.to_string()))
                } else {
                    error!("S3 Service Error during read: {:?}", err);
                    Err(StorageError::Generic(format!(
                        "S3 Service Error: {:?}",
                        inner
                    )))
                }
            }
            Err(e) => {
                error!("Unexpected S3 Error: {:?}", e);
                Err(StorageError::Generic(format!("S3 Error: {:?}", e)))
            }
        }
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, key))]
    async fn get_stream(&self, key: &str) -> Result<ObjectByteStream, StorageError> {
        let full_key = self.key(key);
        tracing::Span::current().record("key", &full_key);

        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await;

        match res {
            Ok(output) => Ok(Box::pin(ReaderStream::new(output.body.into_async_read()))),
            Err(SdkError::ServiceError(err)) if err.err().is_no_such_key() => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => {
                error!("S3 Error opening stream: {:?}", e);
                Err(StorageError::Generic(format!("S3 Error: {:?}", e)))
            }
        }
    }

    #[instrument(skip(self, data), fields(bucket = %self.bucket, key))]
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        let full_key = self.key(key);
        tracing::Span::current().record("key", &full_key);

        debug!("Uploading object to S3...");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload object: {e:?}");
                StorageError::Generic(format!("S3 Upload Error: {e:?}"))
            })?;

        debug!("Upload successful");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, key))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let full_key = self.key(key);
        tracing::Span::current().record("key", &full_key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to delete object: {e:?}");
                StorageError::Generic(format!("S3 Delete Error: {e:?}"))
            })?;

        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let full_prefix = self.key(prefix);
        let mut entries = Vec::new();

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&full_prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                error!("S3 List Error: {e:?}");
                StorageError::Generic(format!("S3 List Error: {e:?}"))
            })?;

            for object in page.contents() {
                let Some(full_key) = object.key() else {
                    continue;
                };
                let key = full_key
                    .strip_prefix(&self.prefix)
                    .unwrap_or(full_key)
                    .to_string();
                entries.push(ObjectEntry {
                    key,
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object.last_modified().and_then(to_chrono),
                });
            }
        }

        Ok(entries)
    }
}
