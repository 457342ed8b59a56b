use crate::domain::errors::ValidationError;

/// A validated object key (path) within a bucket or container.
///
/// Folders are not a first-class type on any supported vendor; a key
/// ending in `/` denotes a zero-byte folder marker object. That
/// encoding rule lives here, in `to_folder`/`is_folder`, so backends
/// never re-implement it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > 1024 {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: 1024,
            });
        }

        if value.contains('\0') {
            return Err(ValidationError::InvalidObjectKeyCharacter('\0'));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectKeyStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ObjectKeyContainsDoubleSlash);
        }

        Ok(Self(value))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key uses the trailing-slash folder convention
    pub fn is_folder(&self) -> bool {
        self.0.ends_with('/')
    }

    /// The trailing-slash form of this key, unchanged if it already
    /// has one
    pub fn to_folder(&self) -> ObjectKey {
        if self.is_folder() {
            self.clone()
        } else {
            Self(format!("{}/", self.0))
        }
    }

    /// Get the directory part of the key (everything before the last '/')
    pub fn parent(&self) -> Option<String> {
        let trimmed = self.0.trim_end_matches('/');
        trimmed.rfind('/').map(|idx| trimmed[..idx].to_string())
    }

    /// Get the file name part of the key (everything after the last '/')
    pub fn file_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        trimmed.rfind('/').map_or(trimmed, |idx| &trimmed[idx + 1..])
    }

    /// Check if this key has the given prefix
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ObjectKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectKey::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_key() {
        assert!(ObjectKey::new("file.txt").is_ok());
        assert!(ObjectKey::new("folder/file.txt").is_ok());
        assert!(ObjectKey::new("deep/folder/structure/file.txt").is_ok());
        assert!(ObjectKey::new("marker/").is_ok());
    }

    #[test]
    fn test_invalid_object_key() {
        assert!(ObjectKey::new("").is_err());
        assert!(ObjectKey::new("/leading-slash").is_err());
        assert!(ObjectKey::new("double//slash").is_err());
        assert!(ObjectKey::new("null\0byte").is_err());
        assert!(ObjectKey::new("x".repeat(1025)).is_err());
    }

    #[test]
    fn test_folder_convention() {
        let key = ObjectKey::new("replays/2024").unwrap();
        assert!(!key.is_folder());
        assert_eq!(key.to_folder().as_str(), "replays/2024/");

        let folder = ObjectKey::new("replays/2024/").unwrap();
        assert!(folder.is_folder());
        assert_eq!(folder.to_folder(), folder);
    }

    #[test]
    fn test_object_key_parts() {
        let key = ObjectKey::new("folder/subfolder/file.txt").unwrap();
        assert_eq!(key.parent(), Some("folder/subfolder".to_string()));
        assert_eq!(key.file_name(), "file.txt");

        let root_key = ObjectKey::new("file.txt").unwrap();
        assert_eq!(root_key.parent(), None);
        assert_eq!(root_key.file_name(), "file.txt");

        let folder = ObjectKey::new("folder/subfolder/").unwrap();
        assert_eq!(folder.parent(), Some("folder".to_string()));
        assert_eq!(folder.file_name(), "subfolder");
    }
}
