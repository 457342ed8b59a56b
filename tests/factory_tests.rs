use bytes::Bytes;
use storagekit::config::keys;
use storagekit::prelude::*;

fn config(kind: &str) -> StorageConfig {
    StorageConfig::new().with(keys::TYPE, kind)
}

#[test]
fn backend_family_matches_discriminator() {
    // ceph and swift run through their S3 gateways
    for kind in ["s3", "ceph", "swift"] {
        let storage = get_object_storage(&config(kind)).unwrap();
        assert_eq!(storage.kind(), BackendKind::S3);
    }

    assert_eq!(
        get_object_storage(&config("oss")).unwrap().kind(),
        BackendKind::Oss
    );
    assert_eq!(
        get_object_storage(&config("azure")).unwrap().kind(),
        BackendKind::Azure
    );
    assert_eq!(
        get_object_storage(&config("memory")).unwrap().kind(),
        BackendKind::Memory
    );
}

#[test]
fn discriminator_is_case_insensitive() {
    let storage = get_object_storage(&config("S3")).unwrap();
    assert_eq!(storage.kind(), BackendKind::S3);
}

#[test]
fn unknown_type_is_rejected() {
    match get_object_storage(&config("tape")) {
        Err(StorageError::UnsupportedBackendType { kind }) => assert_eq!(kind, "tape"),
        other => panic!("expected UnsupportedBackendType, got {:?}", other.map(|_| ())),
    }

    // Missing TYPE is rejected the same way
    assert!(matches!(
        get_object_storage(&StorageConfig::new()),
        Err(StorageError::UnsupportedBackendType { .. })
    ));
}

#[test]
fn log_storage_dispatch() {
    assert!(get_log_storage(&config("es")).is_ok());
    assert!(get_log_storage(&config("elasticsearch")).is_ok());
    assert!(matches!(
        get_log_storage(&config("s3")),
        Err(StorageError::UnsupportedBackendType { .. })
    ));
}

#[tokio::test]
async fn credential_less_backend_fails_explicitly_not_loudly() {
    // Construction succeeds even with nothing but the TYPE...
    let s3 = get_object_storage(&config("s3")).unwrap();
    let key = ObjectKey::new("check.txt").unwrap();

    // ...but every operation reports the missing configuration
    assert!(matches!(
        s3.exists_object(&key).await,
        Err(StorageError::BackendUnconfigured { backend: BackendKind::S3, .. })
    ));
    assert!(matches!(
        s3.put_object(&key, Bytes::from("x")).await,
        Err(StorageError::BackendUnconfigured { .. })
    ));
    assert!(matches!(
        s3.list_buckets().await,
        Err(StorageError::BackendUnconfigured { .. })
    ));

    let azure = get_object_storage(&config("azure")).unwrap();
    assert!(matches!(
        azure.get_object(&key).await,
        Err(StorageError::BackendUnconfigured { backend: BackendKind::Azure, .. })
    ));

    let oss = get_object_storage(&config("oss")).unwrap();
    assert!(matches!(
        oss.presigned_url(&key, std::time::Duration::from_secs(60)).await,
        Err(StorageError::BackendUnconfigured { backend: BackendKind::Oss, .. })
    ));

    // The health verdict folds the same failures into a boolean
    assert!(!s3.is_valid().await);
    assert!(!azure.is_valid().await);
}

#[tokio::test]
async fn configured_s3_backend_constructs_a_client() {
    // Full credentials produce a configured handle; no network traffic
    // happens at construction time
    let config = StorageConfig::new()
        .with(keys::TYPE, "s3")
        .with(keys::ENDPOINT, "http://127.0.0.1:9000")
        .with(keys::BUCKET, "replays")
        .with(keys::ACCESS_KEY, "minioadmin")
        .with(keys::SECRET_KEY, "minioadmin")
        .with(keys::REGION, "us-east-1");

    let storage = get_object_storage(&config).unwrap();
    assert_eq!(storage.kind(), BackendKind::S3);

    // Presigning is local to the client and needs no round-trip
    let key = ObjectKey::new("recordings/day.cast").unwrap();
    let url = storage
        .presigned_url(&key, std::time::Duration::from_secs(3600))
        .await
        .unwrap();
    assert!(url.contains("recordings/day.cast"));
    assert!(url.contains("X-Amz-Signature"));
}
