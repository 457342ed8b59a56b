pub mod bucket_name;
pub mod object_key;

pub use bucket_name::BucketName;
pub use object_key::ObjectKey;
