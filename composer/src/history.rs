//! Shell-style history recall for the composer.
//!
//! Up/Down recall past submissions when the composer is empty, or when the
//! text still exactly matches the last recalled entry and the cursor sits at
//! a text boundary. The boundary gate keeps normal multiline cursor movement
//! usable from interior positions.

#[derive(Debug, Default)]
pub struct ComposerHistory {
    /// Messages submitted during this session, newest at the end.
    entries: Vec<String>,
    /// Current index while browsing; `None` when not browsing.
    cursor: Option<usize>,
    /// The text last inserted by history navigation.
    last_recalled: Option<String>,
}

impl ComposerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted message. Empty submissions and exact consecutive
    /// duplicates are skipped; recording resets any in-progress browsing.
    pub fn record_submission(&mut self, text: &str) {
        self.cursor = None;
        self.last_recalled = None;
        if text.is_empty() {
            return;
        }
        if self.entries.last().is_some_and(|previous| previous == text) {
            return;
        }
        self.entries.push(text.to_string());
    }

    pub fn reset_navigation(&mut self) {
        self.cursor = None;
        self.last_recalled = None;
    }

    /// Whether Up/Down should recall history for the current composer state.
    /// `cursor_offset` is the caret's offset into `text`.
    pub fn should_handle_navigation(&self, text: &str, cursor_offset: usize) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        if text.is_empty() {
            return true;
        }
        if cursor_offset != 0 && cursor_offset != text.len() {
            return false;
        }
        matches!(&self.last_recalled, Some(previous) if previous == text)
    }

    /// Recall the previous entry, or `None` at the oldest.
    pub fn navigate_up(&mut self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.cursor {
            None => self.entries.len() - 1,
            Some(0) => return None,
            Some(index) => index - 1,
        };
        self.cursor = Some(next);
        let text = self.entries[next].clone();
        self.last_recalled = Some(text.clone());
        Some(text)
    }

    /// Newest entry that strictly extends `prefix`, for the inline
    /// (ghost-text) completion. Empty drafts suggest nothing.
    pub fn latest_with_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.as_str() != prefix && entry.starts_with(prefix))
            .map(String::as_str)
    }

    /// Move toward newer entries. Past the newest, browsing ends and the
    /// composer is cleared back to an empty draft.
    pub fn navigate_down(&mut self) -> Option<String> {
        let index = self.cursor?;
        if index + 1 >= self.entries.len() {
            self.cursor = None;
            self.last_recalled = None;
            return Some(String::new());
        }
        self.cursor = Some(index + 1);
        let text = self.entries[index + 1].clone();
        self.last_recalled = Some(text.clone());
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicates_and_empties_are_not_recorded() {
        let mut history = ComposerHistory::new();
        history.record_submission("");
        history.record_submission("hello");
        history.record_submission("hello");
        history.record_submission("world");
        assert_eq!(history.navigate_up(), Some("world".to_string()));
        assert_eq!(history.navigate_up(), Some("hello".to_string()));
        assert_eq!(history.navigate_up(), None);
    }

    #[test]
    fn down_past_newest_clears_the_draft() {
        let mut history = ComposerHistory::new();
        history.record_submission("one");
        history.record_submission("two");
        assert_eq!(history.navigate_up(), Some("two".to_string()));
        assert_eq!(history.navigate_up(), Some("one".to_string()));
        assert_eq!(history.navigate_down(), Some("two".to_string()));
        assert_eq!(history.navigate_down(), Some(String::new()));
        // Browsing ended; Down without browsing does nothing.
        assert_eq!(history.navigate_down(), None);
    }

    #[test]
    fn navigation_gate_requires_boundary_and_matching_text() {
        let mut history = ComposerHistory::new();
        history.record_submission("hello");

        assert!(history.should_handle_navigation("", 0));
        assert!(!history.should_handle_navigation("draft", 0));

        history.navigate_up();
        assert!(history.should_handle_navigation("hello", 0));
        assert!(history.should_handle_navigation("hello", "hello".len()));
        assert!(!history.should_handle_navigation("hello", 2));
        assert!(!history.should_handle_navigation("hellp", 0));
    }

    #[test]
    fn inline_suggestion_prefers_the_newest_strict_extension() {
        let mut history = ComposerHistory::new();
        history.record_submission("git status");
        history.record_submission("git stash");
        assert_eq!(history.latest_with_prefix("git st"), Some("git stash"));
        assert_eq!(history.latest_with_prefix("git sta"), Some("git stash"));
        assert_eq!(history.latest_with_prefix("git stash"), None);
        assert_eq!(history.latest_with_prefix(""), None);
        assert_eq!(history.latest_with_prefix("svn"), None);
    }

    #[test]
    fn recording_resets_browsing() {
        let mut history = ComposerHistory::new();
        history.record_submission("a");
        history.navigate_up();
        history.record_submission("b");
        assert_eq!(history.navigate_up(), Some("b".to_string()));
    }
}
