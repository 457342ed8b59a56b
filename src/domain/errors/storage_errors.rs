use std::path::PathBuf;

use crate::domain::models::BackendKind;
use crate::domain::errors::ValidationError;

/// Failure of a single member backend inside a multi-backend operation.
///
/// The member error is kept as a rendered string so the aggregate error
/// stays cheap to pass around and log.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendFailure {
    /// Position of the failing backend in the member list
    pub index: usize,
    /// Backend family of the failing member
    pub backend: BackendKind,
    /// Rendered member error
    pub error: String,
}

impl std::fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.index, self.backend, self.error)
    }
}

/// Errors that can occur during storage operations
#[derive(Debug)]
pub enum StorageError {
    /// The `TYPE` discriminator names no known backend family
    UnsupportedBackendType { kind: String },

    /// Operation attempted on a backend constructed without the
    /// credentials it needs
    BackendUnconfigured {
        backend: BackendKind,
        missing: &'static str,
    },

    /// Vendor client failure, normalized at the adapter boundary
    VendorOperationFailed {
        backend: BackendKind,
        operation: &'static str,
        message: String,
    },

    /// Object not found
    ObjectNotFound { key: String },

    /// Operation the backend has no vendor support for
    OperationNotSupported {
        backend: BackendKind,
        operation: &'static str,
    },

    /// Invalid object key or bucket name
    Validation(ValidationError),

    /// Local filesystem failure during file transfer
    LocalIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Some or all members of a multi-backend operation failed.
    ///
    /// For writes this means the replicas have diverged: members not
    /// listed here hold the write, listed members do not. No rollback
    /// is attempted; writes are idempotent and may be retried.
    MultiBackendFailure { failures: Vec<BackendFailure> },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::UnsupportedBackendType { kind } => {
                write!(f, "Unsupported storage backend type: '{}'", kind)
            }
            StorageError::BackendUnconfigured { backend, missing } => {
                write!(
                    f,
                    "{} backend is not configured (missing {})",
                    backend, missing
                )
            }
            StorageError::VendorOperationFailed {
                backend,
                operation,
                message,
            } => {
                write!(f, "{} operation '{}' failed: {}", backend, operation, message)
            }
            StorageError::ObjectNotFound { key } => {
                write!(f, "Object not found: {}", key)
            }
            StorageError::OperationNotSupported { backend, operation } => {
                write!(
                    f,
                    "Operation '{}' is not supported by the {} backend",
                    operation, backend
                )
            }
            StorageError::Validation(err) => write!(f, "{}", err),
            StorageError::LocalIo { path, source } => {
                write!(f, "Local file operation on {} failed: {}", path.display(), source)
            }
            StorageError::MultiBackendFailure { failures } => {
                write!(f, "{} backend(s) failed:", failures.len())?;
                for failure in failures {
                    write!(f, " {};", failure)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::LocalIo { source, .. } => Some(source),
            StorageError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
