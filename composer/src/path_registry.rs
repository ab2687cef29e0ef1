//! The composer's display-name → absolute-path table.
//!
//! Populated when file references are inserted, consulted to decide whether
//! an `@name` token in outgoing text refers to a known file. Lives for the
//! lifetime of one composer instance; entries are never individually
//! removed (a stale entry is harmless, it just stops resolving).

use std::collections::HashMap;

use codemoss_protocol::file_references::FileReference;

/// Reject paths that could climb out of the workspace. Host-bridge input is
/// semi-trusted: a failing path is dropped, never fatal.
pub fn is_traversal_safe(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    !path
        .split(['/', '\\'])
        .any(|component| component == "..")
}

#[derive(Debug, Default)]
pub struct PathRegistry {
    by_name: HashMap<String, String>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference after traversal validation. Returns `false` (and
    /// logs) when the path is rejected.
    pub fn record(&mut self, reference: &FileReference) -> bool {
        if !is_traversal_safe(&reference.path) {
            tracing::warn!(path = %reference.path, "dropping traversal-unsafe file path");
            return false;
        }
        self.by_name
            .insert(reference.display_name.clone(), reference.path.clone());
        true
    }

    pub fn resolve(&self, display_name: &str) -> Option<&str> {
        self.by_name.get(display_name).map(String::as_str)
    }

    /// Whether an `@name` token refers to a recorded file.
    pub fn is_known_tag_token(&self, token: &str) -> bool {
        token
            .strip_prefix('@')
            .is_some_and(|name| self.by_name.contains_key(name))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_and_resolves_display_names() {
        let mut registry = PathRegistry::new();
        assert!(registry.record(&FileReference::from_path("/repo/src/main.rs")));
        assert_eq!(registry.resolve("main.rs"), Some("/repo/src/main.rs"));
        assert!(registry.is_known_tag_token("@main.rs"));
        assert!(!registry.is_known_tag_token("@other.rs"));
        assert!(!registry.is_known_tag_token("main.rs"));
    }

    #[test]
    fn traversal_paths_are_rejected() {
        let mut registry = PathRegistry::new();
        assert!(!registry.record(&FileReference::from_path("../../etc/passwd")));
        assert!(!registry.record(&FileReference::from_path("src/../../etc/passwd")));
        assert!(!registry.record(&FileReference::from_path("  ")));
        assert!(registry.is_empty());

        // Dotfiles and interior dots are fine; only ".." components climb.
        assert!(is_traversal_safe("/repo/.config/settings.json"));
        assert!(is_traversal_safe("/repo/a..b/file.rs"));
        assert!(!is_traversal_safe("..\\windows\\style"));
    }

    #[test]
    fn later_insertions_overwrite_the_name() {
        let mut registry = PathRegistry::new();
        registry.record(&FileReference::from_path("/a/lib.rs"));
        registry.record(&FileReference::from_path("/b/lib.rs"));
        assert_eq!(registry.resolve("lib.rs"), Some("/b/lib.rs"));
        assert_eq!(registry.len(), 1);
    }
}
