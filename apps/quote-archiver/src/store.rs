//! Object Store Port
//!
//! Seam between the subscriber loop and object storage, plus bucket
//! provisioning. The production implementation is an S3 client pointed at a
//! MinIO endpoint (path-style addressing).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;

use crate::config::StoreSettings;

/// Content type tagged on every stored record.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Object store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The bucket existence probe failed for a reason other than absence.
    /// Distinct from "confirmed absent": a failed probe is not evidence the
    /// bucket is missing, so it propagates instead of triggering a create.
    #[error("bucket existence probe failed: {0}")]
    Probe(#[source] SdkError<HeadBucketError>),

    /// Bucket creation failed.
    #[error("bucket creation failed: {0}")]
    CreateBucket(#[source] SdkError<CreateBucketError>),

    /// Object write failed. Fatal after startup.
    #[error("object write failed: {0}")]
    Put(#[source] SdkError<PutObjectError>),
}

/// Destination for archived records.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write one object under `key` with the given content type.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError>;

    /// Human-readable destination of a key, for logging.
    fn destination(&self, key: &str) -> String;
}

/// Create the S3 client for the configured MinIO endpoint.
#[must_use]
pub fn create_client(settings: &StoreSettings) -> Client {
    let credentials = Credentials::new(
        settings.credentials.access_key(),
        settings.credentials.secret_key(),
        None,
        None,
        "quote-archiver",
    );
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .force_path_style(true)
        .endpoint_url(settings.endpoint.clone())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .build();
    Client::from_conf(config)
}

/// Idempotently ensure the destination bucket exists.
///
/// Existence is probed with `HeadBucket`. A confirmed-absent probe (404)
/// triggers creation; any other probe failure propagates as
/// [`StoreError::Probe`] and fails startup.
///
/// # Errors
///
/// Returns an error if the probe fails for a reason other than absence, or
/// if creation fails for a reason other than the bucket already existing.
pub async fn ensure_bucket(client: &Client, bucket: &str) -> Result<(), StoreError> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => {
            tracing::info!(bucket, "bucket already exists");
            Ok(())
        }
        Err(err) if probe_reported_missing(err.as_service_error()) => {
            create_bucket(client, bucket).await
        }
        Err(err) => Err(StoreError::Probe(err)),
    }
}

/// True only when the probe positively reported the bucket missing. A
/// transport failure or any other service error is not evidence of absence.
fn probe_reported_missing(err: Option<&HeadBucketError>) -> bool {
    err.is_some_and(HeadBucketError::is_not_found)
}

/// True when creation lost the race to another instance that made the
/// bucket first. Treated as success by [`create_bucket`].
fn creation_raced_existing_bucket(err: Option<&CreateBucketError>) -> bool {
    err.is_some_and(|e| e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists())
}

async fn create_bucket(client: &Client, bucket: &str) -> Result<(), StoreError> {
    match client.create_bucket().bucket(bucket).send().await {
        Ok(_) => {
            tracing::info!(bucket, "bucket created");
            Ok(())
        }
        Err(err) if creation_raced_existing_bucket(err.as_service_error()) => {
            tracing::info!(bucket, "bucket already exists");
            Ok(())
        }
        Err(err) => Err(StoreError::CreateBucket(err)),
    }
}

/// S3-backed object store scoped to one bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a store writing into `bucket`.
    #[must_use]
    pub const fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(StoreError::Put)?;
        Ok(())
    }

    fn destination(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}

/// In-memory store keyed by object key, used by tests. Later writes to the
/// same key overwrite earlier ones, matching object-store semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored object body for a key, if present.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(body, _)| body.clone())
    }

    /// All stored keys, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Content type stored alongside a key, if present.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    #[allow(clippy::unwrap_used)]
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    fn destination(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
