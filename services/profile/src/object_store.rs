//! Photo object storage backed by S3-compatible services (MinIO in dev)

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use tracing::info;
use uuid::Uuid;

/// Object storage configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Key prefix for uploaded photos
    pub public_prefix: String,
    /// Lifetime of signed access URLs
    pub url_expiry_seconds: u64,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            region: "us-east-1".to_string(),
            bucket: "photos".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            public_prefix: "pub".to_string(),
            url_expiry_seconds: 24 * 60 * 60,
        }
    }
}

impl fmt::Debug for ObjectStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStorageConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &"***")
            .field("secret_key", &"***")
            .field("public_prefix", &self.public_prefix)
            .field("url_expiry_seconds", &self.url_expiry_seconds)
            .finish()
    }
}

/// Storage for photo binaries
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store `body` under `key`
    async fn upload(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<()>;

    /// URL a client can follow to fetch the photo
    async fn access_url(&self, reference: &str) -> Result<String>;
}

/// Object key for an uploaded photo; the photo id is part of the key
pub fn photo_object_key(prefix: &str, photo_id: Uuid, extension: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{photo_id}.{extension}")
    } else {
        format!("{prefix}/{photo_id}.{extension}")
    }
}

fn is_absolute_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// S3 implementation of [`PhotoStorage`]
#[derive(Clone)]
pub struct S3PhotoStorage {
    client: Client,
    bucket: String,
    url_expiry: Duration,
}

impl S3PhotoStorage {
    /// Build a client from configuration and make sure the bucket exists
    pub async fn connect(config: &ObjectStorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "profile-service",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .load()
            .await;

        // MinIO serves buckets under the path, not as subdomains.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        let storage = Self::new(
            Client::from_conf(s3_config),
            config.bucket.clone(),
            Duration::from_secs(config.url_expiry_seconds),
        );
        storage.ensure_bucket().await?;

        Ok(storage)
    }

    pub fn new(client: Client, bucket: String, url_expiry: Duration) -> Self {
        Self {
            client,
            bucket,
            url_expiry,
        }
    }

    async fn ensure_bucket(&self) -> Result<()> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        info!("Creating bucket: {}", self.bucket);
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .with_context(|| format!("Failed to create bucket {}", self.bucket))?;

        Ok(())
    }
}

#[async_trait]
impl PhotoStorage for S3PhotoStorage {
    async fn upload(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<()> {
        info!("Uploading photo to storage: bucket={}, key={}, size={}", self.bucket, key, body.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("Failed to upload photo")?;

        Ok(())
    }

    async fn access_url(&self, reference: &str) -> Result<String> {
        if is_absolute_url(reference) {
            return Ok(reference.to_string());
        }

        let presigning_config = PresigningConfig::builder()
            .expires_in(self.url_expiry)
            .build()
            .context("Failed to build presigning config")?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(reference)
            .presigned(presigning_config)
            .await
            .context("Failed to generate presigned URL")?;

        Ok(presigned_request.uri().to_string())
    }
}
