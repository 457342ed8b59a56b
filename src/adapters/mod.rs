// Storage backend adapters. Each owns exactly one vendor client and
// converts vendor errors at its boundary.
pub mod azure;
pub mod es;
pub mod memory;
pub mod oss;
pub mod s3;

mod driver;

pub use azure::AzureStorage;
pub use es::EsLogStorage;
pub use memory::MemoryStorage;
pub use oss::OssStorage;
pub use s3::S3Storage;
