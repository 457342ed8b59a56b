use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use storagekit::config::keys;
use storagekit::prelude::*;
use storagekit::{MemoryStorage, RetrievedObject};

/// Backend stub that refuses every operation, standing in for an
/// unreachable replica.
struct FailingStorage;

impl FailingStorage {
    fn refuse(&self, operation: &'static str) -> StorageError {
        StorageError::VendorOperationFailed {
            backend: BackendKind::S3,
            operation,
            message: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for FailingStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::S3
    }

    async fn list_objects(
        &self,
        _options: ListOptions,
    ) -> StorageResult<Vec<storagekit::ListEntry>> {
        Err(self.refuse("list_objects"))
    }

    async fn exists_object(&self, _key: &ObjectKey) -> StorageResult<bool> {
        Err(self.refuse("exists_object"))
    }

    async fn put_object(&self, _key: &ObjectKey, _data: Bytes) -> StorageResult<()> {
        Err(self.refuse("put_object"))
    }

    async fn get_object(&self, _key: &ObjectKey) -> StorageResult<RetrievedObject> {
        Err(self.refuse("get_object"))
    }

    async fn delete_object(&self, _key: &ObjectKey) -> StorageResult<()> {
        Err(self.refuse("delete_object"))
    }

    async fn list_buckets(&self) -> StorageResult<Vec<storagekit::BucketDescriptor>> {
        Err(self.refuse("list_buckets"))
    }

    async fn create_bucket(&self, _name: Option<&BucketName>) -> StorageResult<()> {
        Err(self.refuse("create_bucket"))
    }

    async fn delete_bucket(&self, _name: Option<&BucketName>) -> StorageResult<()> {
        Err(self.refuse("delete_bucket"))
    }

    async fn get_bucket(
        &self,
        _name: Option<&BucketName>,
    ) -> StorageResult<storagekit::BucketDescriptor> {
        Err(self.refuse("get_bucket"))
    }

    async fn presigned_url(
        &self,
        _key: &ObjectKey,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(self.refuse("presigned_url"))
    }
}

fn member() -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::new(
        &StorageConfig::new().with(keys::BUCKET, "replays"),
    ))
}

#[tokio::test]
async fn write_fan_out_reaches_every_member() {
    let (a, b) = (member(), member());
    let multi = MultiObjectStorage::from_backends(vec![a.clone(), b.clone()]);
    let key = ObjectKey::new("fanout.txt").unwrap();

    multi.put_object(&key, Bytes::from("replica")).await.unwrap();

    assert_eq!(a.get_object(&key).await.unwrap().body, "replica");
    assert_eq!(b.get_object(&key).await.unwrap().body, "replica");
}

#[tokio::test]
async fn write_fan_out_reports_exactly_the_failing_member() {
    let (a, b) = (member(), member());
    let multi = MultiObjectStorage::from_backends(vec![
        a.clone(),
        Arc::new(FailingStorage),
        b.clone(),
    ]);
    let key = ObjectKey::new("partial.txt").unwrap();

    let err = multi
        .put_object(&key, Bytes::from("replica"))
        .await
        .unwrap_err();
    match err {
        StorageError::MultiBackendFailure { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 1);
            assert_eq!(failures[0].backend, BackendKind::S3);
            assert!(failures[0].error.contains("injected failure"));
        }
        other => panic!("expected MultiBackendFailure, got {:?}", other),
    }

    // The healthy members hold the write; nothing was rolled back
    assert!(a.exists_object(&key).await.unwrap());
    assert!(b.exists_object(&key).await.unwrap());

    // The write is idempotent, so a retry against recovered members succeeds
    multi.put_object(&key, Bytes::from("replica")).await.unwrap_err();
    assert_eq!(a.get_object(&key).await.unwrap().body, "replica");
}

#[tokio::test]
async fn read_resolves_against_first_healthy_member() {
    let healthy = member();
    let key = ObjectKey::new("fallback.txt").unwrap();
    healthy
        .put_object(&key, Bytes::from("from-b"))
        .await
        .unwrap();

    let multi = MultiObjectStorage::from_backends(vec![Arc::new(FailingStorage), healthy]);

    assert_eq!(multi.get_object(&key).await.unwrap().body, "from-b");
    assert!(multi.exists_object(&key).await.unwrap());

    // A miss on the fallback member is still a successful "false"
    let absent = ObjectKey::new("absent.txt").unwrap();
    assert!(!multi.exists_object(&absent).await.unwrap());
}

#[tokio::test]
async fn read_failure_carries_every_member_error() {
    let multi = MultiObjectStorage::from_backends(vec![
        Arc::new(FailingStorage),
        Arc::new(FailingStorage),
    ]);
    let key = ObjectKey::new("nowhere.txt").unwrap();

    match multi.get_object(&key).await.unwrap_err() {
        StorageError::MultiBackendFailure { failures } => {
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].index, 0);
            assert_eq!(failures[1].index, 1);
        }
        other => panic!("expected MultiBackendFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn composite_folder_operations_fan_out() {
    let (a, b) = (member(), member());
    let multi = MultiObjectStorage::from_backends(vec![a.clone(), b.clone()]);
    let folder = ObjectKey::new("shared").unwrap();

    multi.create_folder(&folder).await.unwrap();
    assert!(a.exists_object(&folder.to_folder()).await.unwrap());
    assert!(b.exists_object(&folder.to_folder()).await.unwrap());

    // Members diverge before the folder delete
    a.put_object(&ObjectKey::new("shared/only-a.txt").unwrap(), Bytes::from("a"))
        .await
        .unwrap();
    b.put_object(&ObjectKey::new("shared/only-b.txt").unwrap(), Bytes::from("b"))
        .await
        .unwrap();

    multi.delete_folder(&folder).await.unwrap();

    // Each member cleared what it actually held
    for storage in [a, b] {
        let entries = storage
            .list_objects(ListOptions::new().with_prefix("shared/"))
            .await
            .unwrap();
        assert!(entries.is_empty());
    }
}

#[tokio::test]
async fn delete_of_divergent_members_is_success() {
    let (a, b) = (member(), member());
    let key = ObjectKey::new("only-in-a.txt").unwrap();
    a.put_object(&key, Bytes::from("x")).await.unwrap();

    let multi = MultiObjectStorage::from_backends(vec![a.clone(), b]);
    // Member B never had the key; the fan-out still succeeds
    multi.delete_object(&key).await.unwrap();
    assert!(!a.exists_object(&key).await.unwrap());
}

#[tokio::test]
async fn bucket_operations_follow_the_same_pattern() {
    let (a, b) = (member(), member());
    let multi = MultiObjectStorage::from_backends(vec![a.clone(), b.clone()]);

    let name = BucketName::new("replays-dr").unwrap();
    multi.create_bucket(Some(&name)).await.unwrap();
    for storage in [&a, &b] {
        assert!(storage
            .list_buckets()
            .await
            .unwrap()
            .iter()
            .any(|bucket| bucket.name == "replays-dr"));
    }

    // Reads resolve against the first member
    assert_eq!(multi.get_bucket(None).await.unwrap().name, "replays");

    multi.delete_bucket(Some(&name)).await.unwrap();
    assert!(a.get_bucket(Some(&name)).await.is_err());
}

#[tokio::test]
async fn factory_builds_multi_storage_from_configs() {
    let configs = vec![
        StorageConfig::new().with(keys::TYPE, "memory"),
        StorageConfig::new().with(keys::TYPE, "memory"),
    ];
    let multi = get_multi_object_storage(&configs).unwrap();
    assert_eq!(multi.len(), 2);
    assert!(!multi.is_empty());
    assert_eq!(multi.kind(), BackendKind::Multi);

    // One bad member config fails the whole composite
    let broken = vec![
        StorageConfig::new().with(keys::TYPE, "memory"),
        StorageConfig::new().with(keys::TYPE, "tape"),
    ];
    assert!(matches!(
        get_multi_object_storage(&broken),
        Err(StorageError::UnsupportedBackendType { .. })
    ));
}

#[tokio::test]
async fn multi_storage_is_usable_behind_the_port() {
    // The composite drops in wherever a single backend does
    let multi: Arc<dyn ObjectStorage> =
        Arc::new(MultiObjectStorage::from_backends(vec![member(), member()]));
    let key = ObjectKey::new("trait-object.txt").unwrap();

    multi.put_object(&key, Bytes::from("x")).await.unwrap();
    assert!(multi.exists_object(&key).await.unwrap());
}
