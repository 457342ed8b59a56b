use std::collections::HashMap;

use serde::Deserialize;

/// Recognized configuration keys. Backends read the subset they need
/// and ignore everything else.
pub mod keys {
    pub const TYPE: &str = "TYPE";
    pub const ENDPOINT: &str = "ENDPOINT";
    pub const BUCKET: &str = "BUCKET";
    pub const ACCESS_KEY: &str = "ACCESS_KEY";
    pub const SECRET_KEY: &str = "SECRET_KEY";
    pub const REGION: &str = "REGION";
    pub const ACCOUNT_NAME: &str = "ACCOUNT_NAME";
    pub const ACCOUNT_KEY: &str = "ACCOUNT_KEY";
    pub const CONTAINER_NAME: &str = "CONTAINER_NAME";
    pub const ENDPOINT_SUFFIX: &str = "ENDPOINT_SUFFIX";
    pub const HOSTS: &str = "HOSTS";
    pub const INDEX: &str = "INDEX";
    pub const DOC_TYPE: &str = "DOC_TYPE";
}

/// Flat key/value configuration for one storage backend.
///
/// Immutable once a backend has been constructed from it; the `TYPE`
/// key selects the backend family in the factory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StorageConfig(HashMap<String, String>);

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, mostly for tests and inline setup
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `TYPE` discriminator, lowercased
    pub fn kind(&self) -> Option<String> {
        self.get(keys::TYPE).map(str::to_ascii_lowercase)
    }

    /// Load configuration from process environment variables carrying
    /// the given prefix (e.g. `STORAGE_` turns `STORAGE_TYPE=s3` into
    /// `TYPE=s3`). Reads a `.env` file first when one is present.
    pub fn from_env(prefix: &str) -> Self {
        dotenvy::dotenv().ok();
        std::env::vars()
            .filter_map(|(name, value)| {
                name.strip_prefix(prefix)
                    .map(|key| (key.to_string(), value))
            })
            .collect()
    }
}

impl From<HashMap<String, String>> for StorageConfig {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for StorageConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_lowercased() {
        let config = StorageConfig::new().with(keys::TYPE, "S3");
        assert_eq!(config.kind().as_deref(), Some("s3"));
        assert_eq!(StorageConfig::new().kind(), None);
    }

    #[test]
    fn test_unknown_keys_are_kept_but_harmless() {
        let config = StorageConfig::new()
            .with(keys::BUCKET, "replays")
            .with("X_CUSTOM", "whatever");
        assert_eq!(config.get(keys::BUCKET), Some("replays"));
        assert_eq!(config.get("X_CUSTOM"), Some("whatever"));
        assert_eq!(config.get(keys::ENDPOINT), None);
    }

    #[test]
    fn test_from_map() {
        let mut map = HashMap::new();
        map.insert("TYPE".to_string(), "oss".to_string());
        let config = StorageConfig::from(map);
        assert_eq!(config.kind().as_deref(), Some("oss"));
    }
}
