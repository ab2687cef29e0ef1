use serde::Deserialize;
use serde::Serialize;

/// A file reference the composer knows about: the short name rendered inside
/// an inline tag and the absolute path it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub display_name: String,
    pub path: String,
}

impl FileReference {
    /// Derive the display name from the last path segment. Falls back to the
    /// whole input when the path has no separator.
    pub fn from_path(path: &str) -> Self {
        let display_name = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path)
            .to_string();
        Self {
            display_name,
            path: path.to_string(),
        }
    }
}
