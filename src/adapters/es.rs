use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{StorageConfig, keys};
use crate::domain::{
    errors::{LogResult, LogStorageError},
    models::{BulkFailure, BulkOutcome, CommandFilter, CommandRecord},
};
use crate::ports::LogStorage;

const DEFAULT_INDEX: &str = "command";
const DEFAULT_DOC_TYPE: &str = "_doc";
const SEARCH_PAGE_SIZE: usize = 10_000;

/// Elasticsearch-backed command-log storage.
///
/// Talks plain JSON over HTTP: one document per record, `_bulk` for
/// batches, `_search`/`_count` for queries.
pub struct EsLogStorage {
    http: reqwest::Client,
    hosts: Vec<String>,
    index: String,
    doc_type: String,
}

impl EsLogStorage {
    pub fn new(config: &StorageConfig) -> Self {
        let hosts = config
            .get(keys::HOSTS)
            .map(|raw| {
                raw.split(',')
                    .map(|host| host.trim().trim_end_matches('/').to_string())
                    .filter(|host| !host.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            http: reqwest::Client::new(),
            hosts,
            index: config.get(keys::INDEX).unwrap_or(DEFAULT_INDEX).to_string(),
            doc_type: config
                .get(keys::DOC_TYPE)
                .unwrap_or(DEFAULT_DOC_TYPE)
                .to_string(),
        }
    }

    fn host(&self) -> LogResult<&str> {
        self.hosts
            .first()
            .map(String::as_str)
            .ok_or(LogStorageError::Unconfigured("HOSTS"))
    }

    async fn post_json(&self, url: String, body: Value) -> LogResult<Value> {
        debug!(%url, "search index request");
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|err| LogStorageError::BadResponse(err.to_string()))?;
        if !status.is_success() {
            return Err(LogStorageError::RequestFailed(format!(
                "{} returned {}: {}",
                url, status, payload
            )));
        }
        Ok(payload)
    }

    /// Bulk request body in ndjson form: an action line followed by the
    /// record document, for every record, newline terminated.
    fn bulk_body(&self, records: &[CommandRecord]) -> LogResult<String> {
        let mut body = String::new();
        for record in records {
            let action = json!({ "index": { "_index": self.index } });
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(
                &serde_json::to_string(record)
                    .map_err(|err| LogStorageError::BadResponse(err.to_string()))?,
            );
            body.push('\n');
        }
        Ok(body)
    }
}

/// Translate a `CommandFilter` into an Elasticsearch query body.
///
/// Exact-ish fields use `match`, the free-text `input` uses
/// `match_phrase`, and the date bounds become a `range` on `timestamp`.
fn build_query(filter: &CommandFilter) -> Value {
    let mut must = Vec::new();

    if let Some(user) = &filter.user {
        must.push(json!({ "match": { "user": user } }));
    }
    if let Some(asset) = &filter.asset {
        must.push(json!({ "match": { "asset": asset } }));
    }
    if let Some(system_user) = &filter.system_user {
        must.push(json!({ "match": { "system_user": system_user } }));
    }
    if let Some(session) = &filter.session {
        must.push(json!({ "match": { "session": session } }));
    }
    if let Some(input) = &filter.input {
        must.push(json!({ "match_phrase": { "input": input } }));
    }

    let mut range = serde_json::Map::new();
    if let Some(date_from) = filter.date_from {
        range.insert("gte".to_string(), json!(date_from.timestamp()));
    }
    if let Some(date_to) = filter.date_to {
        range.insert("lte".to_string(), json!(date_to.timestamp()));
    }
    if !range.is_empty() {
        must.push(json!({ "range": { "timestamp": range } }));
    }

    if must.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "bool": { "must": must } })
    }
}

/// Fold a `_bulk` response into the aggregate outcome.
fn parse_bulk_response(payload: &Value) -> LogResult<BulkOutcome> {
    let items = payload
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| LogStorageError::BadResponse("bulk response without items".into()))?;

    let mut outcome = BulkOutcome::default();
    for (position, item) in items.iter().enumerate() {
        let action = item
            .get("index")
            .or_else(|| item.get("create"))
            .ok_or_else(|| LogStorageError::BadResponse("bulk item without action".into()))?;
        let status = action.get("status").and_then(Value::as_u64).unwrap_or(0);
        if (200..300).contains(&status) {
            outcome.saved += 1;
        } else {
            let reason = action
                .get("error")
                .and_then(|error| error.get("reason"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("status {}", status));
            outcome.failures.push(BulkFailure { position, reason });
        }
    }
    Ok(outcome)
}

#[async_trait]
impl LogStorage for EsLogStorage {
    async fn save(&self, record: &CommandRecord) -> LogResult<()> {
        let url = format!("{}/{}/{}", self.host()?, self.index, self.doc_type);
        let document = serde_json::to_value(record)
            .map_err(|err| LogStorageError::BadResponse(err.to_string()))?;
        self.post_json(url, document).await?;
        Ok(())
    }

    async fn bulk_save(
        &self,
        records: &[CommandRecord],
        raise_on_error: bool,
    ) -> LogResult<BulkOutcome> {
        if records.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let url = format!("{}/_bulk", self.host()?);
        let response = self
            .http
            .post(&url)
            .header("content-type", "application/x-ndjson")
            .body(self.bulk_body(records)?)
            .send()
            .await?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|err| LogStorageError::BadResponse(err.to_string()))?;
        if !status.is_success() {
            return Err(LogStorageError::RequestFailed(format!(
                "{} returned {}: {}",
                url, status, payload
            )));
        }

        let outcome = parse_bulk_response(&payload)?;
        if raise_on_error && !outcome.is_complete() {
            return Err(LogStorageError::BulkRejected(outcome));
        }
        Ok(outcome)
    }

    async fn filter(&self, filter: &CommandFilter) -> LogResult<Vec<CommandRecord>> {
        let url = format!("{}/{}/_search", self.host()?, self.index);
        let body = json!({
            "query": build_query(filter),
            "size": SEARCH_PAGE_SIZE,
            "sort": [{ "timestamp": { "order": "asc" } }],
        });
        let payload = self.post_json(url, body).await?;

        let hits = payload
            .get("hits")
            .and_then(|hits| hits.get("hits"))
            .and_then(Value::as_array)
            .ok_or_else(|| LogStorageError::BadResponse("search response without hits".into()))?;

        let mut records = Vec::with_capacity(hits.len());
        for hit in hits {
            let source = hit
                .get("_source")
                .cloned()
                .ok_or_else(|| LogStorageError::BadResponse("hit without _source".into()))?;
            records.push(
                serde_json::from_value(source)
                    .map_err(|err| LogStorageError::BadResponse(err.to_string()))?,
            );
        }
        Ok(records)
    }

    async fn count(&self, filter: &CommandFilter) -> LogResult<u64> {
        let url = format!("{}/{}/_count", self.host()?, self.index);
        let payload = self
            .post_json(url, json!({ "query": build_query(filter) }))
            .await?;
        payload
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| LogStorageError::BadResponse("count response without count".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(input: &str) -> CommandRecord {
        CommandRecord {
            user: "alice".into(),
            asset: "db-01".into(),
            system_user: "root".into(),
            input: input.into(),
            output: String::new(),
            session: "sess-1".into(),
            risk_level: 0,
            org_id: String::new(),
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert_eq!(build_query(&CommandFilter::default()), json!({ "match_all": {} }));
    }

    #[test]
    fn test_query_combines_terms_and_range() {
        let filter = CommandFilter {
            date_from: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
            date_to: Some(Utc.timestamp_opt(1_700_100_000, 0).unwrap()),
            user: Some("alice".into()),
            input: Some("rm -rf".into()),
            ..CommandFilter::default()
        };

        let query = build_query(&filter);
        let must = query["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 3);
        assert!(must.contains(&json!({ "match": { "user": "alice" } })));
        assert!(must.contains(&json!({ "match_phrase": { "input": "rm -rf" } })));
        assert!(must.contains(&json!({
            "range": { "timestamp": { "gte": 1_700_000_000, "lte": 1_700_100_000 } }
        })));
    }

    #[test]
    fn test_bulk_body_is_ndjson() {
        let storage = EsLogStorage::new(
            &StorageConfig::new()
                .with(keys::HOSTS, "http://127.0.0.1:9200/")
                .with(keys::INDEX, "audit"),
        );
        let body = storage.bulk_body(&[record("ls"), record("pwd")]).unwrap();

        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], r#"{"index":{"_index":"audit"}}"#);
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn test_bulk_response_partial_failure() {
        // Five submitted, the third rejected: four saved, one reported
        let payload = json!({
            "errors": true,
            "items": [
                { "index": { "status": 201 } },
                { "index": { "status": 201 } },
                { "index": { "status": 400, "error": { "type": "mapper_parsing_exception", "reason": "failed to parse field [timestamp]" } } },
                { "index": { "status": 201 } },
                { "index": { "status": 201 } },
            ],
        });

        let outcome = parse_bulk_response(&payload).unwrap();
        assert_eq!(outcome.saved, 4);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].position, 2);
        assert_eq!(
            outcome.failures[0].reason,
            "failed to parse field [timestamp]"
        );
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_hosts_parsing_and_defaults() {
        let storage = EsLogStorage::new(
            &StorageConfig::new().with(keys::HOSTS, "http://es1:9200/, http://es2:9200"),
        );
        assert_eq!(storage.hosts, vec!["http://es1:9200", "http://es2:9200"]);
        assert_eq!(storage.index, "command");
        assert_eq!(storage.doc_type, "_doc");

        let unconfigured = EsLogStorage::new(&StorageConfig::new());
        assert!(unconfigured.host().is_err());
    }
}
