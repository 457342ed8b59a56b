mod bucket_api;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as StorePath;
use object_store::signer::Signer;

use crate::adapters::driver::StoreDriver;
use crate::config::{StorageConfig, keys};
use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{BackendKind, BucketDescriptor, ListEntry, ListOptions, RetrievedObject},
    value_objects::{BucketName, ObjectKey},
};
use crate::ports::ObjectStorage;

use bucket_api::S3BucketClient;

pub(crate) const DEFAULT_REGION: &str = "us-east-1";

/// S3-compatible backend. Also serves `ceph` and `swift` deployments
/// through their S3 gateways.
///
/// Construction never fails: incomplete credentials leave the vendor
/// client unset and every operation reports `BackendUnconfigured`.
pub struct S3Storage {
    bucket: Option<String>,
    driver: Option<StoreDriver>,
    signer: Option<Arc<AmazonS3>>,
    bucket_api: Option<S3BucketClient>,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> Self {
        let bucket = config.get(keys::BUCKET).map(str::to_string);
        let region = config.get(keys::REGION).unwrap_or(DEFAULT_REGION);
        let endpoint = config.get(keys::ENDPOINT);
        let access_key = config.get(keys::ACCESS_KEY);
        let secret_key = config.get(keys::SECRET_KEY);

        let client = match (bucket.as_deref(), access_key, secret_key) {
            (Some(bucket), Some(access_key), Some(secret_key)) => {
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(bucket)
                    .with_region(region)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key);
                if let Some(endpoint) = endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                builder.build().ok().map(Arc::new)
            }
            _ => None,
        };

        let bucket_api = match (endpoint, access_key, secret_key) {
            (Some(endpoint), Some(access_key), Some(secret_key)) => Some(S3BucketClient::new(
                BackendKind::S3,
                endpoint,
                access_key,
                secret_key,
                region,
            )),
            _ => None,
        };

        Self {
            bucket,
            driver: client
                .clone()
                .map(|client| StoreDriver::new(BackendKind::S3, client)),
            signer: client,
            bucket_api,
        }
    }

    fn driver(&self) -> StorageResult<&StoreDriver> {
        self.driver.as_ref().ok_or(StorageError::BackendUnconfigured {
            backend: BackendKind::S3,
            missing: "BUCKET/ACCESS_KEY/SECRET_KEY",
        })
    }

    fn bucket_api(&self) -> StorageResult<&S3BucketClient> {
        self.bucket_api
            .as_ref()
            .ok_or(StorageError::BackendUnconfigured {
                backend: BackendKind::S3,
                missing: "ENDPOINT/ACCESS_KEY/SECRET_KEY",
            })
    }

    fn target_bucket<'a>(&'a self, name: Option<&'a BucketName>) -> StorageResult<&'a str> {
        match name {
            Some(name) => Ok(name.as_str()),
            None => self
                .bucket
                .as_deref()
                .ok_or(StorageError::BackendUnconfigured {
                    backend: BackendKind::S3,
                    missing: "BUCKET",
                }),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    fn kind(&self) -> BackendKind {
        BackendKind::S3
    }

    async fn list_objects(&self, options: ListOptions) -> StorageResult<Vec<ListEntry>> {
        self.driver()?.list(&options).await
    }

    async fn exists_object(&self, key: &ObjectKey) -> StorageResult<bool> {
        self.driver()?.exists(key).await
    }

    async fn put_object(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        self.driver()?.put(key, data).await
    }

    async fn get_object(&self, key: &ObjectKey) -> StorageResult<RetrievedObject> {
        self.driver()?.get(key).await
    }

    async fn delete_object(&self, key: &ObjectKey) -> StorageResult<()> {
        self.driver()?.delete(key).await
    }

    async fn delete_objects(&self, keys: &[ObjectKey]) -> StorageResult<()> {
        // S3 supports batched deletion
        self.driver()?.delete_many(keys).await
    }

    async fn list_buckets(&self) -> StorageResult<Vec<BucketDescriptor>> {
        self.bucket_api()?.list_buckets().await
    }

    async fn create_bucket(&self, name: Option<&BucketName>) -> StorageResult<()> {
        let bucket = self.target_bucket(name)?;
        self.bucket_api()?.create_bucket(bucket).await
    }

    async fn delete_bucket(&self, name: Option<&BucketName>) -> StorageResult<()> {
        let bucket = self.target_bucket(name)?;
        self.bucket_api()?.delete_bucket(bucket).await
    }

    async fn get_bucket(&self, name: Option<&BucketName>) -> StorageResult<BucketDescriptor> {
        let bucket = self.target_bucket(name)?;
        self.bucket_api()?.get_bucket(bucket).await
    }

    async fn presigned_url(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let signer = self.signer.as_ref().ok_or(StorageError::BackendUnconfigured {
            backend: BackendKind::S3,
            missing: "BUCKET/ACCESS_KEY/SECRET_KEY",
        })?;

        let path = StorePath::from(key.as_str());
        let url = signer
            .signed_url(http::Method::GET, &path, expires_in)
            .await
            .map_err(|err| StorageError::VendorOperationFailed {
                backend: BackendKind::S3,
                operation: "presigned_url",
                message: err.to_string(),
            })?;
        Ok(url.to_string())
    }
}
