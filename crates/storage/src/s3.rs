//! AWS S3 implementation of [`ObjectStore`].

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::{ObjectInfo, ObjectStore, StorageError, StoredObject};

/// Bucket and region configuration, from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name (`AWS_S3_BUCKET`).
    pub bucket: String,
    /// Region used for public URL construction (`AWS_REGION`,
    /// default `ap-northeast-2`).
    pub region: String,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let bucket = std::env::var("AWS_S3_BUCKET").expect("AWS_S3_BUCKET must be set");
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "ap-northeast-2".into());
        Self { bucket, region }
    }
}

/// S3-backed object store.
///
/// The client is constructed once at startup and injected; credentials come
/// from the standard AWS provider chain (env, profile, instance role).
pub struct S3Store {
    client: aws_sdk_s3::Client,
    config: StorageConfig,
}

impl S3Store {
    /// Build an `S3Store` from the ambient AWS configuration.
    pub async fn from_env(config: StorageConfig) -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            config,
        }
    }

    /// Build an `S3Store` around an existing SDK client (tests, custom
    /// endpoints).
    pub fn new(client: aws_sdk_s3::Client, config: StorageConfig) -> Self {
        Self { client, config }
    }

    /// Configured bucket name.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Public virtual-hosted URL for a key.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.config.bucket, self.config.region, key
        )
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        bytes: Bytes,
        key: &str,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        tracing::debug!(key, size, "Stored object in S3");

        Ok(StoredObject {
            url: self.public_url(key),
            key: key.to_string(),
            size,
        })
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Request(service_err.to_string())
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        Ok(data.into_bytes())
    }

    async fn presign_get(&self, key: &str, expiry: Duration) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expiry)
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        Ok(request.uri().to_string())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        let mut objects = Vec::new();
        let mut paginator = self
            .client
            .list_objects_v2()
            .bucket(&self.config.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = paginator.next().await {
            let page = page.map_err(|e| StorageError::Request(e.to_string()))?;
            for item in page.contents() {
                let Some(key) = item.key() else { continue };
                // Skip folder placeholder keys.
                if key.ends_with('/') {
                    continue;
                }
                objects.push(ObjectInfo {
                    key: key.to_string(),
                    size: item.size().unwrap_or(0),
                });
            }
        }

        Ok(objects)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        tracing::debug!(key, "Deleted object from S3");
        Ok(())
    }
}
