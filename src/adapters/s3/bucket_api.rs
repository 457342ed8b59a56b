use std::time::Duration;

use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{BackendKind, BucketDescriptor},
};

/// Bucket-level S3 REST client.
///
/// Object traffic runs through `object_store`, which has no bucket
/// management surface, so these calls speak the S3 XML API directly
/// against the configured gateway endpoint.
pub(crate) struct S3BucketClient {
    backend: BackendKind,
    // Construction can fail (e.g. broken TLS backend); the error is
    // held and surfaced on first use instead of panicking
    http: Result<Client, String>,
    endpoint: String,
    access_key: String,
    secret_key: String,
    region: String,
}

impl S3BucketClient {
    pub(crate) fn new(
        backend: BackendKind,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        region: &str,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| err.to_string());

        Self {
            backend,
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            region: region.to_string(),
        }
    }

    fn vendor_err(&self, operation: &'static str, message: impl Into<String>) -> StorageError {
        StorageError::VendorOperationFailed {
            backend: self.backend,
            operation,
            message: message.into(),
        }
    }

    fn http(&self, operation: &'static str) -> StorageResult<&Client> {
        self.http
            .as_ref()
            .map_err(|err| self.vendor_err(operation, format!("HTTP client unavailable: {}", err)))
    }

    pub(crate) async fn list_buckets(&self) -> StorageResult<Vec<BucketDescriptor>> {
        let response = self
            .http("list_buckets")?
            .get(&self.endpoint)
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .send()
            .await
            .map_err(|err| self.vendor_err("list_buckets", err.to_string()))?;

        if !response.status().is_success() {
            return Err(self.vendor_err(
                "list_buckets",
                format!("service returned {}", response.status()),
            ));
        }

        let xml = response
            .text()
            .await
            .map_err(|err| self.vendor_err("list_buckets", err.to_string()))?;
        parse_list_buckets(&xml)
            .map_err(|message| self.vendor_err("list_buckets", message))
    }

    pub(crate) async fn create_bucket(&self, name: &str) -> StorageResult<()> {
        // Region outside the legacy default needs a location constraint body
        let body = if self.region == "us-east-1" || self.region.is_empty() {
            String::new()
        } else {
            format!(
                "<CreateBucketConfiguration><LocationConstraint>{}</LocationConstraint></CreateBucketConfiguration>",
                self.region
            )
        };

        let response = self
            .http("create_bucket")?
            .put(format!("{}/{}", self.endpoint, name))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .body(body)
            .send()
            .await
            .map_err(|err| self.vendor_err("create_bucket", err.to_string()))?;

        // 409 means the bucket is already there, which keeps retries idempotent
        if response.status().is_success() || response.status().as_u16() == 409 {
            Ok(())
        } else {
            Err(self.vendor_err(
                "create_bucket",
                format!("service returned {}", response.status()),
            ))
        }
    }

    pub(crate) async fn delete_bucket(&self, name: &str) -> StorageResult<()> {
        let response = self
            .http("delete_bucket")?
            .delete(format!("{}/{}", self.endpoint, name))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .send()
            .await
            .map_err(|err| self.vendor_err("delete_bucket", err.to_string()))?;

        if response.status().is_success() || response.status().as_u16() == 404 {
            Ok(())
        } else {
            Err(self.vendor_err(
                "delete_bucket",
                format!("service returned {}", response.status()),
            ))
        }
    }

    pub(crate) async fn get_bucket(&self, name: &str) -> StorageResult<BucketDescriptor> {
        let response = self
            .http("get_bucket")?
            .head(format!("{}/{}", self.endpoint, name))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .send()
            .await
            .map_err(|err| self.vendor_err("get_bucket", err.to_string()))?;

        if !response.status().is_success() {
            return Err(self.vendor_err(
                "get_bucket",
                format!("service returned {}", response.status()),
            ));
        }

        let location = self.bucket_location(name).await.ok().flatten();
        Ok(BucketDescriptor {
            name: name.to_string(),
            create_time: None,
            location,
        })
    }

    async fn bucket_location(&self, name: &str) -> StorageResult<Option<String>> {
        let response = self
            .http("get_bucket")?
            .get(format!("{}/{}?location", self.endpoint, name))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .send()
            .await
            .map_err(|err| self.vendor_err("get_bucket", err.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let xml = response
            .text()
            .await
            .map_err(|err| self.vendor_err("get_bucket", err.to_string()))?;
        Ok(parse_bucket_location(&xml))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListAllMyBucketsResult {
    buckets: BucketList,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BucketList {
    #[serde(default)]
    bucket: Vec<BucketEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BucketEntry {
    name: String,
    creation_date: Option<String>,
}

#[derive(Deserialize)]
struct LocationConstraint {
    #[serde(rename = "$text", default)]
    text: Option<String>,
}

fn parse_list_buckets(xml: &str) -> Result<Vec<BucketDescriptor>, String> {
    let result: ListAllMyBucketsResult =
        from_str(xml).map_err(|err| format!("bad ListAllMyBucketsResult payload: {}", err))?;

    Ok(result
        .buckets
        .bucket
        .into_iter()
        .map(|entry| BucketDescriptor {
            name: entry.name,
            create_time: entry
                .creation_date
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|parsed| parsed.with_timezone(&Utc)),
            location: None,
        })
        .collect())
}

fn parse_bucket_location(xml: &str) -> Option<String> {
    from_str::<LocationConstraint>(xml)
        .ok()
        .and_then(|constraint| constraint.text)
        .filter(|region| !region.is_empty())
}
