use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use object_store::memory::InMemory;

use crate::adapters::driver::StoreDriver;
use crate::config::{StorageConfig, keys};
use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{BackendKind, BucketDescriptor, ListEntry, ListOptions, RetrievedObject},
    value_objects::{BucketName, ObjectKey},
};
use crate::ports::ObjectStorage;

const DEFAULT_BUCKET: &str = "storagekit";

/// In-process backend for tests and local development.
///
/// Objects live in an `object_store::memory::InMemory` store; buckets
/// are a plain name table seeded with the configured bucket.
pub struct MemoryStorage {
    bucket: String,
    driver: StoreDriver,
    buckets: Mutex<BTreeMap<String, BucketDescriptor>>,
}

impl MemoryStorage {
    pub fn new(config: &StorageConfig) -> Self {
        let bucket = config
            .get(keys::BUCKET)
            .unwrap_or(DEFAULT_BUCKET)
            .to_string();

        let mut buckets = BTreeMap::new();
        buckets.insert(
            bucket.clone(),
            BucketDescriptor {
                name: bucket.clone(),
                create_time: Some(Utc::now()),
                location: None,
            },
        );

        Self {
            bucket,
            driver: StoreDriver::new(BackendKind::Memory, Arc::new(InMemory::new())),
            buckets: Mutex::new(buckets),
        }
    }

    fn target_bucket(&self, name: Option<&BucketName>) -> String {
        name.map(|name| name.as_str().to_string())
            .unwrap_or_else(|| self.bucket.clone())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(&StorageConfig::new())
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn list_objects(&self, options: ListOptions) -> StorageResult<Vec<ListEntry>> {
        self.driver.list(&options).await
    }

    async fn exists_object(&self, key: &ObjectKey) -> StorageResult<bool> {
        self.driver.exists(key).await
    }

    async fn put_object(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        self.driver.put(key, data).await
    }

    async fn get_object(&self, key: &ObjectKey) -> StorageResult<RetrievedObject> {
        self.driver.get(key).await
    }

    async fn delete_object(&self, key: &ObjectKey) -> StorageResult<()> {
        self.driver.delete(key).await
    }

    async fn delete_objects(&self, keys: &[ObjectKey]) -> StorageResult<()> {
        self.driver.delete_many(keys).await
    }

    async fn list_buckets(&self) -> StorageResult<Vec<BucketDescriptor>> {
        let buckets = self.buckets.lock().expect("bucket table poisoned");
        Ok(buckets.values().cloned().collect())
    }

    async fn create_bucket(&self, name: Option<&BucketName>) -> StorageResult<()> {
        let bucket = self.target_bucket(name);
        let mut buckets = self.buckets.lock().expect("bucket table poisoned");
        buckets.entry(bucket.clone()).or_insert(BucketDescriptor {
            name: bucket,
            create_time: Some(Utc::now()),
            location: None,
        });
        Ok(())
    }

    async fn delete_bucket(&self, name: Option<&BucketName>) -> StorageResult<()> {
        let bucket = self.target_bucket(name);
        let mut buckets = self.buckets.lock().expect("bucket table poisoned");
        buckets.remove(&bucket);
        Ok(())
    }

    async fn get_bucket(&self, name: Option<&BucketName>) -> StorageResult<BucketDescriptor> {
        let bucket = self.target_bucket(name);
        let buckets = self.buckets.lock().expect("bucket table poisoned");
        buckets
            .get(&bucket)
            .cloned()
            .ok_or(StorageError::VendorOperationFailed {
                backend: BackendKind::Memory,
                operation: "get_bucket",
                message: format!("no such bucket: {}", bucket),
            })
    }

    async fn presigned_url(
        &self,
        _key: &ObjectKey,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::OperationNotSupported {
            backend: BackendKind::Memory,
            operation: "presigned_url",
        })
    }
}
