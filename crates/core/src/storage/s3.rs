//! S3-backed storage gateway.

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::config::S3Config;
use super::error::StorageError;
use super::traits::StorageGateway;

/// Gateway that downloads from one bucket and uploads to another.
#[derive(Clone)]
pub struct S3Gateway {
    client: Client,
    source_bucket: String,
    destination_bucket: String,
}

impl S3Gateway {
    /// Builds a client from the default AWS credential chain.
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        if config.source_bucket.is_empty() || config.destination_bucket.is_empty() {
            return Err(StorageError::Config(
                "source_bucket and destination_bucket are required".to_string(),
            ));
        }

        let region_provider = RegionProviderChain::first_try(config.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new("us-east-1"));

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(ref endpoint) = config.endpoint_url {
            // S3-compatible providers need path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            "S3 gateway ready (source: {}, destination: {})",
            config.source_bucket, config.destination_bucket
        );

        Ok(Self::from_client(
            Client::from_conf(builder.build()),
            config.source_bucket.clone(),
            config.destination_bucket.clone(),
        ))
    }

    /// Wraps an existing client.
    pub fn from_client(client: Client, source_bucket: String, destination_bucket: String) -> Self {
        Self {
            client,
            source_bucket,
            destination_bucket,
        }
    }
}

#[async_trait]
impl StorageGateway for S3Gateway {
    fn name(&self) -> &str {
        "s3"
    }

    async fn download(&self, source_key: &str, dest: &Path) -> Result<(), StorageError> {
        let start = Instant::now();

        let output = self
            .client
            .get_object()
            .bucket(&self.source_bucket)
            .key(source_key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound {
                        key: source_key.to_string(),
                    }
                } else {
                    StorageError::download_failed(source_key, DisplayErrorContext(&e))
                }
            })?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(dest)
            .await?;

        let mut body = output.body;
        let mut bytes_written = 0u64;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| StorageError::download_failed(source_key, e))?
        {
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(
            "Downloaded s3://{}/{} ({} bytes) in {:?}",
            self.source_bucket,
            source_key,
            bytes_written,
            start.elapsed()
        );

        Ok(())
    }

    async fn upload(
        &self,
        local: &Path,
        destination_key: &str,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(local)
            .await
            .map_err(|e| StorageError::upload_failed(destination_key, e))?;

        self.client
            .put_object()
            .bucket(&self.destination_bucket)
            .key(destination_key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(destination_key, DisplayErrorContext(&e)))?;

        debug!(
            "Uploaded {:?} to s3://{}/{}",
            local, self.destination_bucket, destination_key
        );

        Ok(())
    }

    async fn exists(&self, destination_key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.destination_bucket)
            .key(destination_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(StorageError::lookup_failed(
                destination_key,
                DisplayErrorContext(&e),
            )),
        }
    }

    async fn delete(&self, destination_key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.destination_bucket)
            .key(destination_key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(destination_key, DisplayErrorContext(&e)))?;

        Ok(())
    }
}
