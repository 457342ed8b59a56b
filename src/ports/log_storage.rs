use async_trait::async_trait;

use crate::domain::{
    errors::LogResult,
    models::{BulkOutcome, CommandFilter, CommandRecord},
};

/// Port for append-only command/audit-log storage.
///
/// Parallel to `ObjectStorage` but independent: log records live in a
/// search index, not in a bucket.
#[async_trait]
pub trait LogStorage: Send + Sync + 'static {
    /// Index a single record
    async fn save(&self, record: &CommandRecord) -> LogResult<()>;

    /// Index a batch of records.
    ///
    /// With `raise_on_error` unset, a per-entry failure does not stop
    /// the remaining entries; the outcome reports how many were saved
    /// and which positions failed. With it set, any failure aborts
    /// with an error carrying the same outcome.
    async fn bulk_save(
        &self,
        records: &[CommandRecord],
        raise_on_error: bool,
    ) -> LogResult<BulkOutcome>;

    /// Query records matching the filter, oldest first
    async fn filter(&self, filter: &CommandFilter) -> LogResult<Vec<CommandRecord>>;

    /// Count records matching the filter
    async fn count(&self, filter: &CommandFilter) -> LogResult<u64>;
}
