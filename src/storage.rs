//! Blob persistence on an S3-compatible object store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::{
    BehaviorVersion, Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::primitives::ByteStream;
use log::debug;

use crate::settings::Settings;

/// Narrow interface for blob persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Public link to a stored blob.
    fn public_url(&self, filename: &str) -> String;

    /// Stores a blob and returns its public link.
    async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<String>;

    /// Fetches a stored blob's content.
    async fn download(&self, filename: &str) -> Result<Vec<u8>>;

    /// Removes a stored blob.
    async fn delete(&self, filename: &str) -> Result<()>;
}

/// S3-backed blob store configured from [`Settings`].
pub struct ObjectStorage {
    client: aws_sdk_s3::Client,
    host: String,
    bucket: String,
}

impl ObjectStorage {
    /// Builds a client against the configured endpoint with static
    /// credentials. The endpoint serves buckets path-style, and only
    /// computes checksums when the operation requires them.
    pub fn new(settings: &Settings) -> Self {
        let credentials = Credentials::new(
            &settings.aws_access_key_id,
            &settings.aws_secret_access_key,
            None,
            None,
            "gmonitor-lib",
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&settings.aws_host)
            .region(Region::new("ru-1"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(config),
            host: settings.aws_host.clone(),
            bucket: settings.aws_bucket_name.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for ObjectStorage {
    fn public_url(&self, filename: &str) -> String {
        format!("{}/{}/{}", self.host, self.bucket, filename)
    }

    #[tracing::instrument(skip(self, data))]
    async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<String> {
        debug!("Uploading {} bytes to {}...", data.len(), filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(filename)
            .body(ByteStream::from(data))
            .send()
            .await
            .with_context(|| format!("Failed to upload object {}", filename))?;

        Ok(self.public_url(filename))
    }

    #[tracing::instrument(skip(self))]
    async fn download(&self, filename: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}...", filename);

        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(filename)
            .send()
            .await
            .with_context(|| format!("Failed to download object {}", filename))?;

        let body = object
            .body
            .collect()
            .await
            .with_context(|| format!("Failed to read object body of {}", filename))?;

        Ok(body.into_bytes().to_vec())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, filename: &str) -> Result<()> {
        debug!("Deleting {}...", filename);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(filename)
            .send()
            .await
            .with_context(|| format!("Failed to delete object {}", filename))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            aws_host: "https://storage.example.com".to_string(),
            aws_bucket_name: "media".to_string(),
            aws_access_key_id: "key-id".to_string(),
            aws_secret_access_key: "secret".to_string(),
        }
    }

    #[test]
    fn test_public_url_layout() {
        let storage = ObjectStorage::new(&test_settings());
        assert_eq!(
            storage.public_url("voice/42.ogg"),
            "https://storage.example.com/media/voice/42.ogg"
        );
    }

    #[tokio::test]
    async fn test_blob_store_is_mockable() {
        let mut store = MockBlobStore::new();
        store
            .expect_upload()
            .withf(|data, filename| data.as_slice() == b"payload".as_slice() && filename == "report.txt")
            .returning(|_, filename| {
                Ok(format!("https://storage.example.com/media/{}", filename))
            });

        let link = store.upload(b"payload".to_vec(), "report.txt").await.unwrap();
        assert_eq!(link, "https://storage.example.com/media/report.txt");
    }
}
