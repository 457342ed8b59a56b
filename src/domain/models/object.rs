use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one stored object, as returned by listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    pub etag: Option<String>,
    pub storage_class: Option<String>,
}

/// One entry of a listing.
///
/// Delimited listings report grouped "folder" prefixes alongside real
/// objects; a prefix entry carries only its key (trailing-slash form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListEntry {
    CommonPrefix { key: String },
    Object(ObjectDescriptor),
}

impl ListEntry {
    pub fn key(&self) -> &str {
        match self {
            ListEntry::CommonPrefix { key } => key,
            ListEntry::Object(descriptor) => &descriptor.key,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectDescriptor> {
        match self {
            ListEntry::Object(descriptor) => Some(descriptor),
            ListEntry::CommonPrefix { .. } => None,
        }
    }
}

/// A retrieved object: metadata plus the full body
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    pub etag: Option<String>,
    pub body: Bytes,
}

/// Listing parameters, normalized across vendors.
///
/// `marker` resumes after the given key. `delimiter` groups keys into
/// common prefixes; the underlying stores only group on `/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub prefix: Option<String>,
    pub marker: Option<String>,
    pub delimiter: Option<String>,
    pub max_keys: Option<usize>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = Some(max_keys);
        self
    }
}
