use std::sync::Arc;

use tracing::debug;

use crate::adapters::{AzureStorage, EsLogStorage, MemoryStorage, OssStorage, S3Storage};
use crate::config::StorageConfig;
use crate::domain::errors::{StorageError, StorageResult};
use crate::multi::MultiObjectStorage;
use crate::ports::{LogStorage, ObjectStorage};

/// Select an object storage backend from the config's `TYPE`
/// discriminator.
///
/// Pure selection: the chosen backend may still be unconfigured if
/// credentials are incomplete, and will say so on first use.
pub fn get_object_storage(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStorage>> {
    let kind = config.kind().unwrap_or_default();
    debug!(%kind, "selecting object storage backend");
    match kind.as_str() {
        "s3" | "ceph" | "swift" => Ok(Arc::new(S3Storage::new(config))),
        "oss" => Ok(Arc::new(OssStorage::new(config))),
        "azure" => Ok(Arc::new(AzureStorage::new(config))),
        "memory" => Ok(Arc::new(MemoryStorage::new(config))),
        _ => Err(StorageError::UnsupportedBackendType { kind }),
    }
}

/// Select a log storage backend from the config's `TYPE` discriminator
pub fn get_log_storage(config: &StorageConfig) -> StorageResult<Arc<dyn LogStorage>> {
    let kind = config.kind().unwrap_or_default();
    debug!(%kind, "selecting log storage backend");
    match kind.as_str() {
        "es" | "elasticsearch" => Ok(Arc::new(EsLogStorage::new(config))),
        _ => Err(StorageError::UnsupportedBackendType { kind }),
    }
}

/// Compose one multi-backend storage target, one member per config
pub fn get_multi_object_storage(configs: &[StorageConfig]) -> StorageResult<MultiObjectStorage> {
    MultiObjectStorage::new(configs)
}
