use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{BackendKind, BucketDescriptor, ListEntry, ListOptions, RetrievedObject},
    value_objects::{BucketName, ObjectKey},
};

const HEALTH_CHECK_KEY: &str = "storagekit-health-check";

/// Port for object storage backends.
///
/// Every backend adapter (S3-compatible, OSS, Azure, in-memory) and the
/// multi-backend composite satisfy this contract. All operations return
/// `StorageResult`; vendor errors never cross this boundary untyped.
///
/// The composite operations (`delete_objects`, `create_folder`,
/// `delete_folder`, `upload_file`, `download_file`) have default
/// implementations built from the primitive ones, so each backend only
/// overrides them where its vendor offers something better (batch
/// delete, managed transfers).
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Backend family of this handle
    fn kind(&self) -> BackendKind;

    /// List objects, returning grouped prefixes and object metadata
    async fn list_objects(&self, options: ListOptions) -> StorageResult<Vec<ListEntry>>;

    /// Check if an object exists.
    ///
    /// A missing key is `Ok(false)`; only transport or credential
    /// trouble is an error.
    async fn exists_object(&self, key: &ObjectKey) -> StorageResult<bool>;

    /// Store a raw byte payload. An empty payload creates a zero-byte
    /// marker.
    async fn put_object(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()>;

    /// Retrieve an object with its metadata and full body
    async fn get_object(&self, key: &ObjectKey) -> StorageResult<RetrievedObject>;

    /// Delete an object. Deleting an absent key succeeds.
    async fn delete_object(&self, key: &ObjectKey) -> StorageResult<()>;

    /// Delete a batch of objects, attempting every key before
    /// reporting aggregated failures
    async fn delete_objects(&self, keys: &[ObjectKey]) -> StorageResult<()> {
        let mut failed = 0usize;
        let mut first_error = None;
        for key in keys {
            if let Err(err) = self.delete_object(key).await {
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            None => Ok(()),
            Some(err) => Err(StorageError::VendorOperationFailed {
                backend: self.kind(),
                operation: "delete_objects",
                message: format!(
                    "{} of {} deletions failed, first error: {}",
                    failed,
                    keys.len(),
                    err
                ),
            }),
        }
    }

    /// Create a folder marker: the trailing-slash form of `key` with an
    /// empty payload. Idempotent.
    async fn create_folder(&self, key: &ObjectKey) -> StorageResult<()> {
        self.put_object(&key.to_folder(), Bytes::new()).await
    }

    /// Delete every object under the trailing-slash prefix of `key`,
    /// then the marker itself.
    ///
    /// List-then-delete composite, not atomic: a crash mid-way leaves a
    /// partially deleted folder.
    async fn delete_folder(&self, key: &ObjectKey) -> StorageResult<()> {
        let folder = key.to_folder();
        let entries = self
            .list_objects(ListOptions::new().with_prefix(folder.as_str()))
            .await?;

        let mut keys = Vec::new();
        for entry in &entries {
            if let ListEntry::Object(descriptor) = entry {
                keys.push(ObjectKey::new(descriptor.key.clone())?);
            }
        }
        if !keys.is_empty() {
            self.delete_objects(&keys).await?;
        }
        self.delete_object(&folder).await
    }

    /// Check that this backend is reachable and writable by storing
    /// and removing a small object. Any failure, including missing
    /// configuration, reports `false`.
    async fn is_valid(&self) -> bool {
        let key = match ObjectKey::new(HEALTH_CHECK_KEY) {
            Ok(key) => key,
            Err(_) => return false,
        };
        if self.put_object(&key, Bytes::from_static(b"ok")).await.is_err() {
            return false;
        }
        self.delete_object(&key).await.is_ok()
    }

    /// Upload a local file to `key`
    async fn upload_file(&self, local: &Path, key: &ObjectKey) -> StorageResult<()> {
        let data = tokio::fs::read(local)
            .await
            .map_err(|source| StorageError::LocalIo {
                path: local.to_path_buf(),
                source,
            })?;
        self.put_object(key, Bytes::from(data)).await
    }

    /// Download `key` to a local path, creating missing parent
    /// directories first
    async fn download_file(&self, key: &ObjectKey, local: &Path) -> StorageResult<()> {
        let object = self.get_object(key).await?;

        if let Some(parent) = local.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StorageError::LocalIo {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        tokio::fs::write(local, &object.body)
            .await
            .map_err(|source| StorageError::LocalIo {
                path: local.to_path_buf(),
                source,
            })
    }

    /// List buckets visible to this backend's credentials
    async fn list_buckets(&self) -> StorageResult<Vec<BucketDescriptor>>;

    /// Create a bucket; `None` targets the configured bucket
    async fn create_bucket(&self, name: Option<&BucketName>) -> StorageResult<()>;

    /// Delete a bucket; `None` targets the configured bucket
    async fn delete_bucket(&self, name: Option<&BucketName>) -> StorageResult<()>;

    /// Describe a bucket; `None` targets the configured bucket
    async fn get_bucket(&self, name: Option<&BucketName>) -> StorageResult<BucketDescriptor>;

    /// Generate a presigned GET URL for `key`.
    ///
    /// Backends without vendor presigning report
    /// `OperationNotSupported` rather than returning an unusable URL.
    async fn presigned_url(&self, key: &ObjectKey, expires_in: Duration)
        -> StorageResult<String>;
}
