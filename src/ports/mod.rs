pub mod log_storage;
pub mod object_storage;

pub use log_storage::LogStorage;
pub use object_storage::ObjectStorage;
