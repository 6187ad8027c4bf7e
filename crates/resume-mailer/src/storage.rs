//! Document retrieval from object storage
//!
//! [`fetch_document`] validates the configured coordinates, makes a single
//! attempt against a [`DocumentStore`] and downgrades retrieval failures to
//! "no document" so the caller can still send the email.

use async_trait::async_trait;
use aws_sdk_s3::{error::DisplayErrorContext, Client as S3Client};
use tracing::{info, instrument, warn};

use crate::config::DocumentLocation;
use crate::error::MailerError;
use crate::types::Document;

/// Source of raw object bytes
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, MailerError>;
}

/// S3-backed document store
pub struct S3DocumentStore {
    client: S3Client,
}

impl S3DocumentStore {
    /// Create from the shared AWS config
    pub async fn new() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::with_client(S3Client::new(&config))
    }

    pub fn with_client(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, MailerError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| MailerError::Retrieval(DisplayErrorContext(&e).to_string()))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| MailerError::Retrieval(e.to_string()))?;

        Ok(bytes.into_bytes().to_vec())
    }
}

/// Fetch the resume, returning `Ok(None)` when storage cannot supply it
///
/// Missing coordinates are a configuration error and are returned before the
/// store is contacted.
#[instrument(skip(store, location), fields(bucket = ?location.bucket, key = ?location.key))]
pub async fn fetch_document<S>(
    store: &S,
    location: &DocumentLocation,
) -> Result<Option<Document>, MailerError>
where
    S: DocumentStore + ?Sized,
{
    let (bucket, key) = match (location.bucket.as_deref(), location.key.as_deref()) {
        (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => (bucket, key),
        _ => {
            return Err(MailerError::Configuration(
                "missing BUCKET_NAME or OBJECT_KEY".to_string(),
            ))
        }
    };

    let result = match store.get_object(bucket, key).await {
        Ok(bytes) if bytes.is_empty() => Err(MailerError::Retrieval(format!(
            "object s3://{bucket}/{key} is empty"
        ))),
        other => other,
    };

    match result {
        Ok(bytes) => {
            info!(size = bytes.len(), "Document retrieved");
            Ok(Some(Document::new(bytes)))
        }
        Err(e) => {
            warn!(error = %e, "Document unavailable, continuing without it");
            Ok(None)
        }
    }
}
