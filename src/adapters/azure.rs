use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use object_store::path::Path as StorePath;
use object_store::signer::Signer;

use crate::adapters::driver::StoreDriver;
use crate::config::{StorageConfig, keys};
use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{BackendKind, BucketDescriptor, ListEntry, ListOptions, RetrievedObject},
    value_objects::{BucketName, ObjectKey},
};
use crate::ports::ObjectStorage;

/// Azure Blob backend. The configured container plays the bucket role;
/// container management runs through the account-level Azure API that
/// the blob client does not cover, so those operations report
/// `OperationNotSupported`.
pub struct AzureStorage {
    driver: Option<StoreDriver>,
    signer: Option<Arc<MicrosoftAzure>>,
}

impl AzureStorage {
    pub fn new(config: &StorageConfig) -> Self {
        let account_name = config.get(keys::ACCOUNT_NAME);
        let account_key = config.get(keys::ACCOUNT_KEY);
        let container_name = config.get(keys::CONTAINER_NAME);
        let endpoint_suffix = config.get(keys::ENDPOINT_SUFFIX);

        let client = match (account_name, account_key, container_name) {
            (Some(account), Some(key), Some(container)) => {
                let mut builder = MicrosoftAzureBuilder::new()
                    .with_account(account)
                    .with_access_key(key)
                    .with_container_name(container);
                if let Some(suffix) = endpoint_suffix {
                    builder = builder.with_endpoint(format!("https://{}.blob.{}", account, suffix));
                }
                builder.build().ok().map(Arc::new)
            }
            _ => None,
        };

        Self {
            driver: client
                .clone()
                .map(|client| StoreDriver::new(BackendKind::Azure, client)),
            signer: client,
        }
    }

    fn driver(&self) -> StorageResult<&StoreDriver> {
        self.driver.as_ref().ok_or(StorageError::BackendUnconfigured {
            backend: BackendKind::Azure,
            missing: "ACCOUNT_NAME/ACCOUNT_KEY/CONTAINER_NAME",
        })
    }

    fn not_supported(operation: &'static str) -> StorageError {
        StorageError::OperationNotSupported {
            backend: BackendKind::Azure,
            operation,
        }
    }
}

#[async_trait]
impl ObjectStorage for AzureStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Azure
    }

    async fn list_objects(&self, options: ListOptions) -> StorageResult<Vec<ListEntry>> {
        self.driver()?.list(&options).await
    }

    async fn exists_object(&self, key: &ObjectKey) -> StorageResult<bool> {
        self.driver()?.exists(key).await
    }

    async fn put_object(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        self.driver()?.put(key, data).await
    }

    async fn get_object(&self, key: &ObjectKey) -> StorageResult<RetrievedObject> {
        self.driver()?.get(key).await
    }

    async fn delete_object(&self, key: &ObjectKey) -> StorageResult<()> {
        self.driver()?.delete(key).await
    }

    async fn delete_objects(&self, keys: &[ObjectKey]) -> StorageResult<()> {
        self.driver()?.delete_many(keys).await
    }

    async fn list_buckets(&self) -> StorageResult<Vec<BucketDescriptor>> {
        Err(Self::not_supported("list_buckets"))
    }

    async fn create_bucket(&self, _name: Option<&BucketName>) -> StorageResult<()> {
        Err(Self::not_supported("create_bucket"))
    }

    async fn delete_bucket(&self, _name: Option<&BucketName>) -> StorageResult<()> {
        Err(Self::not_supported("delete_bucket"))
    }

    async fn get_bucket(&self, _name: Option<&BucketName>) -> StorageResult<BucketDescriptor> {
        Err(Self::not_supported("get_bucket"))
    }

    async fn presigned_url(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let signer = self.signer.as_ref().ok_or(StorageError::BackendUnconfigured {
            backend: BackendKind::Azure,
            missing: "ACCOUNT_NAME/ACCOUNT_KEY/CONTAINER_NAME",
        })?;

        let path = StorePath::from(key.as_str());
        let url = signer
            .signed_url(http::Method::GET, &path, expires_in)
            .await
            .map_err(|err| StorageError::VendorOperationFailed {
                backend: BackendKind::Azure,
                operation: "presigned_url",
                message: err.to_string(),
            })?;
        Ok(url.to_string())
    }
}
