use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

use crate::config::StorageConfig;
use crate::domain::{
    errors::{BackendFailure, StorageError, StorageResult},
    models::{BackendKind, BucketDescriptor, ListEntry, ListOptions, RetrievedObject},
    value_objects::{BucketName, ObjectKey},
};
use crate::factory::get_object_storage;
use crate::ports::ObjectStorage;

/// One logical storage target over an ordered list of heterogeneous
/// backends.
///
/// Writes fan out to every member in list order and succeed only when
/// every member does; a partial failure is reported per member and
/// nothing is rolled back (writes are idempotent, so callers retry).
/// Reads resolve against the first member that answers, giving
/// primary/fallback semantics. Members may diverge; no cross-backend
/// consistency is promised.
///
/// Implements `ObjectStorage` itself, so a composite target drops in
/// wherever a single backend does.
pub struct MultiObjectStorage {
    backends: Vec<Arc<dyn ObjectStorage>>,
}

impl MultiObjectStorage {
    /// Resolve each config through the factory. The member list is
    /// fixed once constructed.
    pub fn new(configs: &[StorageConfig]) -> StorageResult<Self> {
        let backends = configs
            .iter()
            .map(get_object_storage)
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(Self { backends })
    }

    /// Compose already-built backends, preserving their order
    pub fn from_backends(backends: Vec<Arc<dyn ObjectStorage>>) -> Self {
        Self { backends }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    fn failure(&self, index: usize, error: &StorageError) -> BackendFailure {
        let backend = self.backends[index].kind();
        warn!(index, backend = %backend, %error, "member backend failed");
        BackendFailure {
            index,
            backend,
            error: error.to_string(),
        }
    }

    fn aggregate(failures: Vec<BackendFailure>) -> StorageResult<()> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(StorageError::MultiBackendFailure { failures })
        }
    }
}

#[async_trait]
impl ObjectStorage for MultiObjectStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Multi
    }

    // Reads: first success in member order, every failure reported when
    // no member answers.

    async fn list_objects(&self, options: ListOptions) -> StorageResult<Vec<ListEntry>> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            match backend.list_objects(options.clone()).await {
                Ok(entries) => return Ok(entries),
                Err(error) => failures.push(self.failure(index, &error)),
            }
        }
        Err(StorageError::MultiBackendFailure { failures })
    }

    async fn exists_object(&self, key: &ObjectKey) -> StorageResult<bool> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            match backend.exists_object(key).await {
                Ok(exists) => return Ok(exists),
                Err(error) => failures.push(self.failure(index, &error)),
            }
        }
        Err(StorageError::MultiBackendFailure { failures })
    }

    async fn get_object(&self, key: &ObjectKey) -> StorageResult<RetrievedObject> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            match backend.get_object(key).await {
                Ok(object) => return Ok(object),
                Err(error) => failures.push(self.failure(index, &error)),
            }
        }
        Err(StorageError::MultiBackendFailure { failures })
    }

    async fn list_buckets(&self) -> StorageResult<Vec<BucketDescriptor>> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            match backend.list_buckets().await {
                Ok(buckets) => return Ok(buckets),
                Err(error) => failures.push(self.failure(index, &error)),
            }
        }
        Err(StorageError::MultiBackendFailure { failures })
    }

    async fn get_bucket(&self, name: Option<&BucketName>) -> StorageResult<BucketDescriptor> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            match backend.get_bucket(name).await {
                Ok(bucket) => return Ok(bucket),
                Err(error) => failures.push(self.failure(index, &error)),
            }
        }
        Err(StorageError::MultiBackendFailure { failures })
    }

    async fn presigned_url(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            match backend.presigned_url(key, expires_in).await {
                Ok(url) => return Ok(url),
                Err(error) => failures.push(self.failure(index, &error)),
            }
        }
        Err(StorageError::MultiBackendFailure { failures })
    }

    // Writes: applied to every member before the aggregate verdict.

    async fn put_object(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            if let Err(error) = backend.put_object(key, data.clone()).await {
                failures.push(self.failure(index, &error));
            }
        }
        Self::aggregate(failures)
    }

    async fn delete_object(&self, key: &ObjectKey) -> StorageResult<()> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            if let Err(error) = backend.delete_object(key).await {
                failures.push(self.failure(index, &error));
            }
        }
        Self::aggregate(failures)
    }

    async fn delete_objects(&self, keys: &[ObjectKey]) -> StorageResult<()> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            if let Err(error) = backend.delete_objects(keys).await {
                failures.push(self.failure(index, &error));
            }
        }
        Self::aggregate(failures)
    }

    // Folder deletion fans out the whole composite so each member
    // removes what it actually holds; listing one member and replaying
    // its keys on the others would miss divergent objects.
    async fn delete_folder(&self, key: &ObjectKey) -> StorageResult<()> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            if let Err(error) = backend.delete_folder(key).await {
                failures.push(self.failure(index, &error));
            }
        }
        Self::aggregate(failures)
    }

    async fn create_bucket(&self, name: Option<&BucketName>) -> StorageResult<()> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            if let Err(error) = backend.create_bucket(name).await {
                failures.push(self.failure(index, &error));
            }
        }
        Self::aggregate(failures)
    }

    async fn delete_bucket(&self, name: Option<&BucketName>) -> StorageResult<()> {
        let mut failures = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            if let Err(error) = backend.delete_bucket(name).await {
                failures.push(self.failure(index, &error));
            }
        }
        Self::aggregate(failures)
    }
}
