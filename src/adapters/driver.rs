use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use object_store::{ObjectMeta, ObjectStore as VendorStore, PutPayload, path::Path as StorePath};

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{BackendKind, ListEntry, ListOptions, ObjectDescriptor, RetrievedObject},
    value_objects::ObjectKey,
};

/// Stored leaf name for folder markers. `object_store` canonicalizes
/// `a/b/` to `a/b`, which would alias a marker with a plain object of
/// the same name, so the marker for `a/b/` is stored at `a/b/.folder`
/// and mapped back at every boundary. The leaf name is reserved: a
/// plain object named `*/.folder` surfaces as its folder form.
const FOLDER_MARKER: &str = ".folder";

fn stored_key(key: &str) -> String {
    if key.ends_with('/') {
        format!("{}{}", key, FOLDER_MARKER)
    } else {
        key.to_string()
    }
}

fn surface_key(location: &str) -> String {
    match location.strip_suffix(FOLDER_MARKER) {
        Some(prefix) if prefix.ends_with('/') => prefix.to_string(),
        _ => location.to_string(),
    }
}

/// Shared object-level driver over an `object_store` vendor client.
///
/// The S3, OSS, Azure and in-memory adapters all speak `object_store`
/// for object traffic; this is the one place their calls are made,
/// their errors normalized, and folder-marker keys translated to and
/// from their stored form.
pub(crate) struct StoreDriver {
    kind: BackendKind,
    inner: Arc<dyn VendorStore>,
}

impl StoreDriver {
    pub(crate) fn new(kind: BackendKind, inner: Arc<dyn VendorStore>) -> Self {
        Self { kind, inner }
    }

    fn vendor_err(&self, operation: &'static str, err: object_store::Error) -> StorageError {
        StorageError::VendorOperationFailed {
            backend: self.kind,
            operation,
            message: err.to_string(),
        }
    }

    pub(crate) async fn put(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        let path = StorePath::from(stored_key(key.as_str()));
        self.inner
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|err| self.vendor_err("put_object", err))?;
        Ok(())
    }

    pub(crate) async fn get(&self, key: &ObjectKey) -> StorageResult<RetrievedObject> {
        let path = StorePath::from(stored_key(key.as_str()));
        let result = self.inner.get(&path).await.map_err(|err| match err {
            object_store::Error::NotFound { .. } => StorageError::ObjectNotFound {
                key: key.as_str().to_string(),
            },
            other => self.vendor_err("get_object", other),
        })?;

        let meta = result.meta.clone();
        let body = result
            .bytes()
            .await
            .map_err(|err| self.vendor_err("get_object", err))?;

        Ok(RetrievedObject {
            key: key.as_str().to_string(),
            last_modified: meta.last_modified,
            size: meta.size,
            etag: meta.e_tag,
            body,
        })
    }

    pub(crate) async fn exists(&self, key: &ObjectKey) -> StorageResult<bool> {
        let path = StorePath::from(stored_key(key.as_str()));
        match self.inner.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(err) => Err(self.vendor_err("exists_object", err)),
        }
    }

    pub(crate) async fn delete(&self, key: &ObjectKey) -> StorageResult<()> {
        let path = StorePath::from(stored_key(key.as_str()));
        match self.inner.delete(&path).await {
            // Deleting an absent key is a success, keeping deletes idempotent
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(self.vendor_err("delete_object", err)),
        }
    }

    pub(crate) async fn delete_many(&self, keys: &[ObjectKey]) -> StorageResult<()> {
        let locations = futures::stream::iter(
            keys.iter()
                .map(|key| Ok::<_, object_store::Error>(StorePath::from(stored_key(key.as_str()))))
                .collect::<Vec<_>>(),
        )
        .boxed();

        let results: Vec<_> = self.inner.delete_stream(locations).collect().await;

        let mut failed = 0usize;
        let mut first_error = None;
        for result in results {
            if let Err(err) = result {
                if matches!(err, object_store::Error::NotFound { .. }) {
                    continue;
                }
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(err) => Err(StorageError::VendorOperationFailed {
                backend: self.kind,
                operation: "delete_objects",
                message: format!(
                    "{} of {} deletions failed, first error: {}",
                    failed,
                    keys.len(),
                    err
                ),
            }),
        }
    }

    pub(crate) async fn list(&self, options: &ListOptions) -> StorageResult<Vec<ListEntry>> {
        let prefix = options.prefix.as_deref().map(StorePath::from);

        if options.delimiter.is_some() {
            let result = self
                .inner
                .list_with_delimiter(prefix.as_ref())
                .await
                .map_err(|err| self.vendor_err("list_objects", err))?;

            let mut entries: Vec<ListEntry> = result
                .common_prefixes
                .iter()
                .map(|prefix| ListEntry::CommonPrefix {
                    key: format!("{}/", prefix),
                })
                .collect();
            entries.extend(
                result
                    .objects
                    .into_iter()
                    .map(|meta| ListEntry::Object(describe(meta))),
            );
            // Grouped listings come back whole, so the marker is
            // applied here rather than pushed down to the vendor
            if let Some(marker) = &options.marker {
                entries.retain(|entry| entry.key() > marker.as_str());
            }
            if let Some(max_keys) = options.max_keys {
                entries.truncate(max_keys);
            }
            return Ok(entries);
        }

        let mut stream = match &options.marker {
            Some(marker) => self
                .inner
                .list_with_offset(prefix.as_ref(), &StorePath::from(stored_key(marker))),
            None => self.inner.list(prefix.as_ref()),
        };

        let mut entries = Vec::new();
        while let Some(item) = stream.next().await {
            if let Some(max_keys) = options.max_keys {
                if entries.len() >= max_keys {
                    break;
                }
            }
            let meta = item.map_err(|err| self.vendor_err("list_objects", err))?;
            entries.push(ListEntry::Object(describe(meta)));
        }
        Ok(entries)
    }
}

fn describe(meta: ObjectMeta) -> ObjectDescriptor {
    ObjectDescriptor {
        key: surface_key(meta.location.as_ref()),
        last_modified: meta.last_modified,
        size: meta.size,
        etag: meta.e_tag,
        // object_store does not surface the storage class
        storage_class: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_keys_store_under_reserved_leaf() {
        assert_eq!(stored_key("report/"), "report/.folder");
        assert_eq!(stored_key("report"), "report");
        assert_eq!(surface_key("report/.folder"), "report/");
        assert_eq!(surface_key("report"), "report");
    }

    #[test]
    fn test_surface_key_ignores_lookalike_names() {
        // Only a full reserved leaf translates back
        assert_eq!(surface_key("my.folder"), "my.folder");
        assert_eq!(surface_key(".folder"), ".folder");
        assert_eq!(surface_key("a/b.folder"), "a/b.folder");
    }
}
