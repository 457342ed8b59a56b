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

/// Alibaba OSS backend, driven through the service's S3-compatible
/// surface with virtual-hosted addressing (`bucket.endpoint`).
pub struct OssStorage {
    bucket: Option<String>,
    driver: Option<StoreDriver>,
    signer: Option<Arc<AmazonS3>>,
}

impl OssStorage {
    pub fn new(config: &StorageConfig) -> Self {
        let bucket = config.get(keys::BUCKET).map(str::to_string);
        let region = config.get(keys::REGION).unwrap_or("cn-hangzhou");
        let endpoint = config.get(keys::ENDPOINT);
        let access_key = config.get(keys::ACCESS_KEY);
        let secret_key = config.get(keys::SECRET_KEY);

        let client = match (bucket.as_deref(), endpoint, access_key, secret_key) {
            (Some(bucket), Some(endpoint), Some(access_key), Some(secret_key)) => {
                AmazonS3Builder::new()
                    .with_bucket_name(bucket)
                    .with_region(region)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_endpoint(endpoint)
                    .with_allow_http(endpoint.starts_with("http://"))
                    .with_virtual_hosted_style_request(true)
                    .build()
                    .ok()
                    .map(Arc::new)
            }
            _ => None,
        };

        Self {
            bucket,
            driver: client
                .clone()
                .map(|client| StoreDriver::new(BackendKind::Oss, client)),
            signer: client,
        }
    }

    fn driver(&self) -> StorageResult<&StoreDriver> {
        self.driver.as_ref().ok_or(StorageError::BackendUnconfigured {
            backend: BackendKind::Oss,
            missing: "BUCKET/ENDPOINT/ACCESS_KEY/SECRET_KEY",
        })
    }
}

#[async_trait]
impl ObjectStorage for OssStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Oss
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
        // OSS supports batched deletion through the S3 surface
        self.driver()?.delete_many(keys).await
    }

    async fn list_buckets(&self) -> StorageResult<Vec<BucketDescriptor>> {
        // Bucket management needs the native OSS service API, which the
        // S3-compatible surface does not expose per-bucket endpoints for
        Err(StorageError::OperationNotSupported {
            backend: BackendKind::Oss,
            operation: "list_buckets",
        })
    }

    async fn create_bucket(&self, _name: Option<&BucketName>) -> StorageResult<()> {
        Err(StorageError::OperationNotSupported {
            backend: BackendKind::Oss,
            operation: "create_bucket",
        })
    }

    async fn delete_bucket(&self, _name: Option<&BucketName>) -> StorageResult<()> {
        Err(StorageError::OperationNotSupported {
            backend: BackendKind::Oss,
            operation: "delete_bucket",
        })
    }

    async fn get_bucket(&self, name: Option<&BucketName>) -> StorageResult<BucketDescriptor> {
        // Existence of the configured bucket is observable through the
        // object surface even without the native service API
        let bucket = match name {
            Some(name) => name.as_str().to_string(),
            None => self
                .bucket
                .clone()
                .ok_or(StorageError::BackendUnconfigured {
                    backend: BackendKind::Oss,
                    missing: "BUCKET",
                })?,
        };
        if name.is_some() && name.map(BucketName::as_str) != self.bucket.as_deref() {
            return Err(StorageError::OperationNotSupported {
                backend: BackendKind::Oss,
                operation: "get_bucket",
            });
        }

        self.driver()?
            .list(&ListOptions::new().with_max_keys(1))
            .await?;
        Ok(BucketDescriptor::named(bucket))
    }

    async fn presigned_url(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let signer = self.signer.as_ref().ok_or(StorageError::BackendUnconfigured {
            backend: BackendKind::Oss,
            missing: "BUCKET/ENDPOINT/ACCESS_KEY/SECRET_KEY",
        })?;

        let path = StorePath::from(key.as_str());
        let url = signer
            .signed_url(http::Method::GET, &path, expires_in)
            .await
            .map_err(|err| StorageError::VendorOperationFailed {
                backend: BackendKind::Oss,
                operation: "presigned_url",
                message: err.to_string(),
            })?;
        Ok(url.to_string())
    }
}
