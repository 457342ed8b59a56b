use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One command/audit-log record as stored in the search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub user: String,
    pub asset: String,
    pub system_user: String,
    pub input: String,
    #[serde(default)]
    pub output: String,
    pub session: String,
    #[serde(default)]
    pub risk_level: u8,
    #[serde(default)]
    pub org_id: String,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

/// Filter for querying command records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandFilter {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub user: Option<String>,
    pub asset: Option<String>,
    pub system_user: Option<String>,
    pub input: Option<String>,
    pub session: Option<String>,
}

/// Per-entry failure of a bulk save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkFailure {
    /// Position of the entry in the submitted batch
    pub position: usize,
    pub reason: String,
}

/// Aggregate outcome of a bulk save
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub saved: usize,
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl std::fmt::Display for BulkOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} entries failed",
            self.failures.len(),
            self.saved + self.failures.len()
        )
    }
}
