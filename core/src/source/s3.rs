use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use tracing::{debug, warn};

use crate::config::ObjectLocation;
use crate::errors::StoreError;
use crate::source::ObjectStore;

/// S3-backed object store. The client is built once and shared for the
/// lifetime of the process.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default AWS provider chain (region,
    /// credentials, `AWS_ENDPOINT_URL`).
    pub async fn from_env() -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(Client::new(&aws_config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_text(&self, location: &ObjectLocation) -> Result<String, StoreError> {
        debug!("Fetching {}", location.uri());

        let response = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return StoreError::NotFound {
                        bucket: location.bucket.clone(),
                        key: location.key.clone(),
                    };
                }
                warn!("GetObject failed for {}: {}", location.uri(), DisplayErrorContext(&e));
                StoreError::Download {
                    bucket: location.bucket.clone(),
                    key: location.key.clone(),
                    reason: DisplayErrorContext(&e).to_string(),
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Download {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                reason: e.to_string(),
            })?
            .into_bytes();

        String::from_utf8(body.to_vec()).map_err(|_| StoreError::InvalidText {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
        })
    }
}
