use codemoss_protocol::file_references::FileReference;

use crate::node::InlineNode;
use crate::node::SurfacePosition;

/// Inserts at or above this many bytes skip the platform's native
/// text-insertion command and go straight to direct node manipulation. The
/// native command path is kept for typical inserts because it preserves the
/// host's undo/redo stack.
pub const LARGE_INSERT_THRESHOLD: usize = 10_000;

/// Seam to the platform's native editing command.
///
/// `exec_insert_text` asks the host to perform the insert through its own
/// text-insertion command. Returning `true` means the host applied the edit
/// and already dispatched its own change notification; the surface then
/// mirrors the mutation without firing a second one.
pub trait NativeEditHost {
    fn exec_insert_text(&mut self, text: &str) -> bool {
        let _ = text;
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: SurfacePosition,
    pub focus: SurfacePosition,
}

impl Selection {
    pub fn caret(position: SurfacePosition) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Anchor/focus in document order.
    pub fn ordered(&self) -> (SurfacePosition, SurfacePosition) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }
}

/// The editable surface: exclusive owner of the composer's inline content
/// tree and of the selection within it.
///
/// Every mutating primitive is non-throwing; routine failures (no active
/// selection, empty range) return `false`. Each successful mutation fires
/// exactly one change notification, observable through
/// [`EditableSurface::change_notifications`].
pub struct EditableSurface {
    nodes: Vec<InlineNode>,
    selection: Option<Selection>,
    focused: bool,
    change_notifications: u64,
    native_host: Option<Box<dyn NativeEditHost>>,
}

impl Default for EditableSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditableSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditableSurface")
            .field("nodes", &self.nodes)
            .field("selection", &self.selection)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl EditableSurface {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            selection: None,
            focused: false,
            change_notifications: 0,
            native_host: None,
        }
    }

    pub fn from_nodes(nodes: Vec<InlineNode>) -> Self {
        let mut surface = Self::new();
        surface.nodes = nodes;
        surface
    }

    pub fn set_native_host(&mut self, host: Box<dyn NativeEditHost>) {
        self.native_host = Some(host);
    }

    pub fn nodes(&self) -> &[InlineNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Number of change notifications fired so far. State-sync listeners key
    /// off this firing exactly once per successful mutation.
    pub fn change_notifications(&self) -> u64 {
        self.change_notifications
    }

    fn notify_change(&mut self) {
        self.change_notifications += 1;
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// The selection focus (the caret), if any.
    pub fn cursor(&self) -> Option<SurfacePosition> {
        self.selection.map(|s| s.focus)
    }

    pub fn set_cursor(&mut self, position: SurfacePosition) {
        let position = self.canonicalize(position);
        self.selection = Some(Selection::caret(position));
    }

    pub fn set_selection(&mut self, anchor: SurfacePosition, focus: SurfacePosition) {
        self.selection = Some(Selection {
            anchor: self.canonicalize(anchor),
            focus: self.canonicalize(focus),
        });
    }

    /// Move the focus endpoint only, extending the selection from the current
    /// anchor. Starts a selection from the caret when none is expanded.
    pub fn extend_selection_to(&mut self, focus: SurfacePosition) {
        let focus = self.canonicalize(focus);
        match self.selection {
            Some(selection) => {
                self.selection = Some(Selection {
                    anchor: selection.anchor,
                    focus,
                });
            }
            None => self.selection = Some(Selection::caret(focus)),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn end_position(&self) -> SurfacePosition {
        SurfacePosition::new(self.nodes.len(), 0)
    }

    /// Clamp a position into the tree and normalize it: byte offsets inside a
    /// text node snap back to a char boundary, trailing offsets roll over to
    /// the start of the next node, and an offset can never land inside an
    /// atomic node.
    pub fn canonicalize(&self, position: SurfacePosition) -> SurfacePosition {
        let mut node = position.node.min(self.nodes.len());
        let mut offset = if node == self.nodes.len() {
            0
        } else {
            position.offset
        };
        loop {
            if node == self.nodes.len() {
                return SurfacePosition::new(node, 0);
            }
            let width = self.nodes[node].position_width();
            if offset >= width {
                node += 1;
                offset = 0;
                continue;
            }
            if let InlineNode::Text(text) = &self.nodes[node] {
                offset = clamp_to_char_boundary(text, offset);
            } else if offset != 0 {
                // Atomic node: the only interior offset is 0 (before it).
                offset = 0;
            }
            return SurfacePosition::new(node, offset);
        }
    }

    // ####### Text derivations #######

    /// The rendered (visible) text: what the user sees, with tags contributing
    /// their display name.
    pub fn rendered_text(&self) -> String {
        self.nodes.iter().map(InlineNode::rendered_text).collect()
    }

    /// The canonical virtual text: tags collapse to `@path`, breaks to `\n`.
    /// Deterministic, stateless function of the node tree.
    pub fn virtual_text(&self) -> String {
        self.nodes.iter().map(InlineNode::virtual_text).collect()
    }

    pub fn virtual_len(&self) -> usize {
        self.nodes.iter().map(InlineNode::virtual_len).sum()
    }

    /// Byte ranges of the virtual text occupied by tag nodes, in order.
    pub fn tag_spans(&self) -> Vec<std::ops::Range<usize>> {
        let mut spans = Vec::new();
        let mut offset = 0;
        for node in &self.nodes {
            let len = node.virtual_len();
            if node.is_tag() {
                spans.push(offset..offset + len);
            }
            offset += len;
        }
        spans
    }

    // ####### Selection/Range primitives #######

    /// Insert `text` at the current selection, replacing it when expanded.
    ///
    /// Multi-line input always materializes explicit `Break` nodes; a text
    /// node never embeds a literal `\n`, because the host engine's vertical
    /// caret navigation cannot cross embedded newlines.
    ///
    /// Returns `false` (and does nothing) when there is no active selection.
    /// Fires exactly one change notification unless the platform's native
    /// insert command handled the edit and dispatched its own.
    pub fn insert_text_at_cursor(&mut self, text: &str) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        if !selection.is_collapsed() {
            let (start, end) = selection.ordered();
            self.delete_range(start, end);
        }
        let native_handled = text.len() < LARGE_INSERT_THRESHOLD
            && self
                .native_host
                .as_mut()
                .is_some_and(|host| host.exec_insert_text(text));
        self.apply_insert(text);
        if !native_handled {
            self.notify_change();
        }
        true
    }

    /// Delete the current non-collapsed selection. Collapses the caret to the
    /// deletion point and fires one change notification. `false` when nothing
    /// is selected.
    pub fn delete_selection(&mut self) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        if selection.is_collapsed() {
            return false;
        }
        let (start, end) = selection.ordered();
        self.delete_range(start, end);
        self.notify_change();
        true
    }

    /// Delete the range between `target` and the current caret (used for
    /// delete-to-line-start). No-op returning `false` when the range is
    /// empty or there is no selection.
    pub fn delete_to_position(&mut self, target: SurfacePosition) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        let cursor = selection.focus;
        let target = self.canonicalize(target);
        if target == cursor {
            return false;
        }
        let (start, end) = if target <= cursor {
            (target, cursor)
        } else {
            (cursor, target)
        };
        self.delete_range(start, end);
        self.notify_change();
        true
    }

    /// Replace the current selection with an atomic tag node and place the
    /// caret after it. Fires one change notification.
    pub fn insert_tag_at_cursor(&mut self, reference: FileReference) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        if !selection.is_collapsed() {
            let (start, end) = selection.ordered();
            self.delete_range(start, end);
        }
        let cursor = self.canonicalize(self.cursor().unwrap_or(SurfacePosition::START));
        let index = self.split_for_insert(cursor);
        self.nodes.insert(index, InlineNode::Tag(reference));
        self.set_cursor(SurfacePosition::new(index + 1, 0));
        self.notify_change();
        true
    }

    /// Plain rendered-text character offset of the caret from the start of
    /// the surface, ignoring tag/virtual semantics. `-1` when the caret is
    /// not in the surface. This is the simple offset pair used by
    /// restore-after-update flows.
    pub fn cursor_offset(&self) -> isize {
        let Some(selection) = self.selection else {
            return -1;
        };
        let focus = self.canonicalize(selection.focus);
        let mut chars = 0isize;
        for node in &self.nodes[..focus.node.min(self.nodes.len())] {
            chars += node.rendered_text().chars().count() as isize;
        }
        if focus.node < self.nodes.len()
            && let InlineNode::Text(text) = &self.nodes[focus.node]
        {
            chars += text[..focus.offset].chars().count() as isize;
        }
        chars
    }

    /// Inverse of [`EditableSurface::cursor_offset`]. Clamps past-the-end
    /// offsets to the end of content; an offset inside a tag's rendered span
    /// resolves to just after the tag (tags are atomic).
    pub fn set_cursor_offset(&mut self, offset: usize) -> bool {
        let mut remaining = offset;
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                InlineNode::Text(text) => {
                    let count = text.chars().count();
                    if remaining <= count {
                        let byte = text
                            .char_indices()
                            .map(|(i, _)| i)
                            .nth(remaining)
                            .unwrap_or(text.len());
                        self.set_cursor(SurfacePosition::new(index, byte));
                        return true;
                    }
                    remaining -= count;
                }
                InlineNode::Break | InlineNode::Tag(_) => {
                    let count = node.rendered_text().chars().count();
                    if remaining == 0 {
                        self.set_cursor(SurfacePosition::new(index, 0));
                        return true;
                    }
                    if remaining < count {
                        // Inside an atomic node: land just after it.
                        self.set_cursor(SurfacePosition::new(index + 1, 0));
                        return true;
                    }
                    remaining -= count;
                }
            }
        }
        let end = self.end_position();
        self.set_cursor(end);
        true
    }

    /// Replace the whole content from a plain string (controlled-value sync).
    /// Drops the selection; does not fire a change notification because the
    /// value came from the state side, not from an edit.
    pub fn set_text(&mut self, text: &str) {
        self.nodes.clear();
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                self.nodes.push(InlineNode::Break);
            }
            if !line.is_empty() {
                self.nodes.push(InlineNode::Text(line.to_string()));
            }
        }
        self.selection = None;
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.selection = None;
    }

    // ####### Internals #######

    /// Split the text node containing `position` (canonical) so the position
    /// becomes a node boundary; returns the boundary index.
    fn split_for_insert(&mut self, position: SurfacePosition) -> usize {
        if position.offset == 0 {
            return position.node;
        }
        // Canonical positions with a non-zero offset are mid-text.
        if let InlineNode::Text(text) = &mut self.nodes[position.node] {
            let suffix = text.split_off(position.offset);
            self.nodes
                .insert(position.node + 1, InlineNode::Text(suffix));
        }
        position.node + 1
    }

    /// Splice `text` in at the caret, materializing `Break` nodes for every
    /// `\n`, and move the caret after the inserted content.
    fn apply_insert(&mut self, text: &str) {
        let cursor = self.canonicalize(self.cursor().unwrap_or(SurfacePosition::START));
        let index = self.split_for_insert(cursor);
        let mut inserted = Vec::new();
        for (segment_index, segment) in text.split('\n').enumerate() {
            if segment_index > 0 {
                inserted.push(InlineNode::Break);
            }
            if !segment.is_empty() {
                inserted.push(InlineNode::Text(segment.to_string()));
            }
        }
        let count = inserted.len();
        self.nodes.splice(index..index, inserted);
        self.set_cursor(SurfacePosition::new(index + count, 0));
    }

    /// Remove the content between two canonical positions (`start < end`).
    /// Tags overlapped by the range are removed whole. Collapses the caret
    /// to the deletion point. Does not notify; callers own that.
    fn delete_range(&mut self, start: SurfacePosition, end: SurfacePosition) {
        let start = self.canonicalize(start);
        let end = self.canonicalize(end);
        if start >= end {
            self.set_cursor(start);
            return;
        }

        if start.node == end.node {
            // Range within a single text node.
            if let InlineNode::Text(text) = &mut self.nodes[start.node] {
                text.replace_range(start.offset..end.offset, "");
                if text.is_empty() {
                    self.nodes.remove(start.node);
                }
            }
            self.set_cursor(SurfacePosition::new(start.node, start.offset));
            return;
        }

        let mut remove_from = start.node;
        if start.offset > 0 {
            if let InlineNode::Text(text) = &mut self.nodes[start.node] {
                text.truncate(start.offset);
            }
            remove_from = start.node + 1;
        }
        let mut remove_to = end.node;
        if end.node < self.nodes.len() && end.offset > 0 {
            if let InlineNode::Text(text) = &mut self.nodes[end.node] {
                text.replace_range(..end.offset, "");
                if text.is_empty() {
                    remove_to = end.node + 1;
                }
            }
        }
        self.nodes.drain(remove_from..remove_to.min(self.nodes.len()));
        self.set_cursor(SurfacePosition::new(start.node, start.offset));
    }
}

pub(crate) fn clamp_to_char_boundary(text: &str, position: usize) -> usize {
    let mut position = position.min(text.len());
    while position > 0 && !text.is_char_boundary(position) {
        position -= 1;
    }
    position
}
