/// Backend family reported by a storage handle.
///
/// The factory guarantees the reported family matches the `TYPE`
/// discriminator the handle was built from; `ceph` and `swift`
/// deployments run through their S3 gateways and report `S3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    S3,
    Oss,
    Azure,
    Memory,
    Multi,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::S3 => "s3",
            BackendKind::Oss => "oss",
            BackendKind::Azure => "azure",
            BackendKind::Memory => "memory",
            BackendKind::Multi => "multi",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
