pub mod backend;
pub mod bucket;
pub mod command;
pub mod object;

pub use backend::BackendKind;
pub use bucket::BucketDescriptor;
pub use command::{BulkFailure, BulkOutcome, CommandFilter, CommandRecord};
pub use object::{ListEntry, ListOptions, ObjectDescriptor, RetrievedObject};
