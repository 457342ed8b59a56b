use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bucket (or container) as reported by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketDescriptor {
    pub name: String,
    pub create_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl BucketDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_time: None,
            location: None,
        }
    }
}
