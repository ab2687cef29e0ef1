//! The bridge the embedding host talks through.
//!
//! The host historically reached the editor through window-global callbacks;
//! this is the same capability set behind an explicit register/unregister
//! lifecycle, so a torn-down composer can never be invoked through a stale
//! closure. Raw host input is parsed here into typed [`HostCommand`]s; the
//! registered handler (the shell's hop into the composer) does the rest.

/// What the host may ask the composer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Insert one or more file references at the cursor.
    InsertReferences(Vec<String>),
    /// Insert an arbitrary text block at the cursor and focus the editor.
    InsertSnippet(String),
}

/// Parse the host's file-path payload: a JSON array of paths when it parses
/// as one, otherwise the whole string is a single path.
pub fn parse_file_path_input(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| vec![raw.to_string()])
}

pub struct HostBridge {
    handler: Option<Box<dyn FnMut(HostCommand)>>,
}

impl Default for HostBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBridge")
            .field("registered", &self.handler.is_some())
            .finish()
    }
}

impl HostBridge {
    pub fn new() -> Self {
        Self { handler: None }
    }

    /// Install the handler. Tied to the owning composer's mount.
    pub fn register(&mut self, handler: Box<dyn FnMut(HostCommand)>) {
        self.handler = Some(handler);
    }

    /// Remove the handler on teardown. Calls arriving afterwards are
    /// dropped.
    pub fn unregister(&mut self) {
        self.handler = None;
    }

    pub fn is_registered(&self) -> bool {
        self.handler.is_some()
    }

    /// Host entry point: `handleFilePathFromJava`. Returns whether a handler
    /// received the command.
    pub fn handle_file_path_input(&mut self, raw: &str) -> bool {
        let paths = parse_file_path_input(raw);
        self.dispatch(HostCommand::InsertReferences(paths))
    }

    /// Host entry point: `insertCodeSnippetAtCursor`.
    pub fn insert_code_snippet(&mut self, text: &str) -> bool {
        self.dispatch(HostCommand::InsertSnippet(text.to_string()))
    }

    fn dispatch(&mut self, command: HostCommand) -> bool {
        match self.handler.as_mut() {
            Some(handler) => {
                handler(command);
                true
            }
            None => {
                tracing::debug!(?command, "host command dropped: bridge not registered");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_bridge() -> (HostBridge, Rc<RefCell<Vec<HostCommand>>>) {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let mut bridge = HostBridge::new();
        bridge.register(Box::new(move |command| sink.borrow_mut().push(command)));
        (bridge, received)
    }

    #[test]
    fn json_array_input_becomes_one_command_with_all_paths() {
        let (mut bridge, received) = recording_bridge();
        assert!(bridge.handle_file_path_input(r#"["/a/one.rs", "/b/two.rs"]"#));
        assert_eq!(
            received.borrow().as_slice(),
            &[HostCommand::InsertReferences(vec![
                "/a/one.rs".to_string(),
                "/b/two.rs".to_string(),
            ])]
        );
    }

    #[test]
    fn non_json_input_falls_back_to_a_single_path() {
        let (mut bridge, received) = recording_bridge();
        assert!(bridge.handle_file_path_input("/plain/path.rs"));
        assert_eq!(
            received.borrow().as_slice(),
            &[HostCommand::InsertReferences(vec![
                "/plain/path.rs".to_string()
            ])]
        );
    }

    #[test]
    fn snippets_pass_through_verbatim() {
        let (mut bridge, received) = recording_bridge();
        assert!(bridge.insert_code_snippet("fn main() {}\n"));
        assert_eq!(
            received.borrow().as_slice(),
            &[HostCommand::InsertSnippet("fn main() {}\n".to_string())]
        );
    }

    #[test]
    fn unregistered_bridge_drops_calls() {
        let (mut bridge, received) = recording_bridge();
        bridge.unregister();
        assert!(!bridge.handle_file_path_input("/late.rs"));
        assert!(!bridge.insert_code_snippet("late"));
        assert!(received.borrow().is_empty());
    }
}
