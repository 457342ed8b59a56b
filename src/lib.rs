pub mod adapters;
pub mod config;
pub mod domain;
pub mod factory;
pub mod multi;
pub mod ports;

// Re-export key types for convenience

// Domain types - value objects, models, errors
pub use domain::{
    BackendFailure,
    BackendKind,
    BucketDescriptor,
    BucketName,
    BulkFailure,
    BulkOutcome,
    CommandFilter,
    CommandRecord,
    ListEntry,
    ListOptions,
    LogResult,
    LogStorageError,
    ObjectDescriptor,
    // Value objects
    ObjectKey,
    RetrievedObject,
    // Errors
    StorageError,
    StorageResult,
    ValidationError,
};

// Port traits - the contracts every backend satisfies
pub use ports::{LogStorage, ObjectStorage};

// Configuration and construction entry points
pub use config::StorageConfig;
pub use factory::{get_log_storage, get_multi_object_storage, get_object_storage};
pub use multi::MultiObjectStorage;

// Adapter types - vendor-backed implementations
pub use adapters::{AzureStorage, EsLogStorage, MemoryStorage, OssStorage, S3Storage};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        BackendKind, BucketName, ListOptions, LogStorage, MultiObjectStorage, ObjectKey,
        ObjectStorage, StorageConfig, StorageError, StorageResult, get_log_storage,
        get_multi_object_storage, get_object_storage,
    };
}
