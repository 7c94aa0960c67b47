//! File storage collaborator for uploaded documents (S3 / MinIO).

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of '{key}' failed: {message}")]
    Upload { key: String, message: String },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;
}

/// Stores documents in a single S3 bucket.
pub struct S3DocumentStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3DocumentStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        info!("Uploaded document to s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Keeps uploads in memory so tests can inspect them.
    #[derive(Default)]
    pub struct MemoryDocumentStore {
        pub objects: Mutex<HashMap<String, (Bytes, String)>>,
    }

    #[async_trait]
    impl DocumentStore for MemoryDocumentStore {
        async fn put(
            &self,
            key: &str,
            data: Bytes,
            content_type: &str,
        ) -> Result<(), StorageError> {
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (data, content_type.to_string()));
            Ok(())
        }
    }
}
