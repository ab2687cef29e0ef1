//! Key handling: the submit-vs-newline decision and Mac-style navigation.
//!
//! The embedding host does not implement the platform's word/line bindings
//! itself, so the composer provides them, working purely against the
//! surface's selection primitives and the virtual text.

use std::time::Instant;

use codemoss_editor::EditableSurface;
use codemoss_editor::SurfacePosition;
use codemoss_editor::virtual_cursor::position_at_virtual_offset;
use codemoss_editor::virtual_cursor::virtual_cursor_position;

use crate::composition::CompositionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
    pub cmd_or_ctrl: bool,
    pub alt: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            cmd_or_ctrl: false,
            alt: false,
        }
    }

    pub fn shift(key: Key) -> Self {
        Self {
            shift: true,
            ..Self::plain(key)
        }
    }

    pub fn cmd(key: Key) -> Self {
        Self {
            cmd_or_ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn alt(key: Key) -> Self {
        Self {
            alt: true,
            ..Self::plain(key)
        }
    }
}

/// Which shortcut submits the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    /// Plain Enter submits; Shift+Enter inserts a line break.
    #[default]
    Enter,
    /// Only Cmd/Ctrl+Enter submits; plain Enter inserts a line break.
    CmdEnter,
}

/// What an Enter keypress should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterDisposition {
    Submit,
    InsertBreak,
    /// Swallow the event: it is a composition confirm (or its duplicate
    /// keydown inside the grace window) and must neither submit nor edit.
    Ignore,
    /// A completion dropdown is open; Enter belongs to its list.
    Ceded,
}

/// Decide what Enter does, given the configured shortcut mode, the IME
/// state, and whether a completion surface currently owns the keyboard.
pub fn enter_disposition(
    mode: SubmitMode,
    event: KeyEvent,
    composition: &CompositionState,
    now: Instant,
    completion_open: bool,
) -> EnterDisposition {
    if completion_open {
        return EnterDisposition::Ceded;
    }
    if composition.suppresses_submit(now) {
        return EnterDisposition::Ignore;
    }
    match mode {
        SubmitMode::Enter => {
            if event.shift {
                EnterDisposition::InsertBreak
            } else {
                EnterDisposition::Submit
            }
        }
        SubmitMode::CmdEnter => {
            if event.cmd_or_ctrl {
                EnterDisposition::Submit
            } else {
                EnterDisposition::InsertBreak
            }
        }
    }
}

/// Capture-phase hook for the host's paragraph-insertion `beforeinput`
/// event. Composition confirms and default paragraph insertion can race the
/// synthetic keydown handler, so the same decision runs here first.
pub fn paragraph_insertion_disposition(
    mode: SubmitMode,
    composition: &CompositionState,
    now: Instant,
    completion_open: bool,
) -> EnterDisposition {
    enter_disposition(
        mode,
        KeyEvent::plain(Key::Enter),
        composition,
        now,
        completion_open,
    )
}

/// Mac-style caret motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMotion {
    /// Alt+Left.
    WordLeft,
    /// Alt+Right.
    WordRight,
    /// Cmd+Left.
    LineStart,
    /// Cmd+Right.
    LineEnd,
    /// Cmd+Up. Vertical moves across nodes fall back to content start.
    ContentStart,
    /// Cmd+Down.
    ContentEnd,
}

/// Apply a navigation motion to the surface caret. With `extend` the anchor
/// stays put and only the focus moves (Shift variants). Returns `false`
/// when there is no caret to move.
pub fn move_cursor(surface: &mut EditableSurface, motion: NavMotion, extend: bool) -> bool {
    if surface.cursor().is_none() {
        return false;
    }
    let text = surface.virtual_text();
    let cursor = virtual_cursor_position(surface);
    let target = match motion {
        NavMotion::WordLeft => word_left_offset(&text, cursor),
        NavMotion::WordRight => word_right_offset(&text, cursor),
        NavMotion::LineStart => line_start_offset(&text, cursor),
        NavMotion::LineEnd => line_end_offset(&text, cursor),
        NavMotion::ContentStart => 0,
        NavMotion::ContentEnd => text.len(),
    };
    let target = snap_out_of_tags(surface, target, motion);
    let position =
        position_at_virtual_offset(surface, target).unwrap_or(SurfacePosition::START);
    if extend {
        surface.extend_selection_to(position);
    } else {
        surface.set_cursor(position);
    }
    true
}

/// Cmd+Backspace: delete from the caret back to the start of its line.
pub fn delete_to_line_start(surface: &mut EditableSurface) -> bool {
    if surface.cursor().is_none() {
        return false;
    }
    let text = surface.virtual_text();
    let cursor = virtual_cursor_position(surface);
    let target = line_start_offset(&text, cursor);
    let Some(position) = position_at_virtual_offset(surface, target) else {
        return false;
    };
    surface.delete_to_position(position)
}

fn word_left_offset(text: &str, cursor: usize) -> usize {
    if let Some(last_non_ws) = text[..cursor].rfind(|c: char| !c.is_whitespace()) {
        text[..last_non_ws]
            .rfind(|c: char| c.is_whitespace())
            .map(|i| i + 1)
            .unwrap_or(0)
    } else {
        0
    }
}

fn word_right_offset(text: &str, cursor: usize) -> usize {
    let Some(first_non_ws) = text[cursor..].find(|c: char| !c.is_whitespace()) else {
        return text.len();
    };
    let word_start = cursor + first_non_ws;
    match text[word_start..].find(|c: char| c.is_whitespace()) {
        Some(relative) => word_start + relative,
        None => text.len(),
    }
}

fn line_start_offset(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end_offset(text: &str, cursor: usize) -> usize {
    text[cursor..].find('\n').map(|i| i + cursor).unwrap_or(text.len())
}

/// Word scans run over the virtual text, whose tag spans may contain
/// whitespace (paths do). A target inside a span snaps to the side the
/// motion came from, keeping tags atomic under navigation.
fn snap_out_of_tags(surface: &EditableSurface, target: usize, motion: NavMotion) -> usize {
    let leftward = matches!(
        motion,
        NavMotion::WordLeft | NavMotion::LineStart | NavMotion::ContentStart
    );
    for span in surface.tag_spans() {
        if span.start < target && target < span.end {
            return if leftward { span.start } else { span.end };
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemoss_editor::InlineNode;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn surface_from(text: &str) -> EditableSurface {
        let mut surface = EditableSurface::new();
        surface.set_text(text);
        surface
    }

    #[test]
    fn plain_enter_submits_in_enter_mode_shift_inserts_break() {
        let composition = CompositionState::new();
        let now = Instant::now();
        assert_eq!(
            enter_disposition(
                SubmitMode::Enter,
                KeyEvent::plain(Key::Enter),
                &composition,
                now,
                false,
            ),
            EnterDisposition::Submit
        );
        assert_eq!(
            enter_disposition(
                SubmitMode::Enter,
                KeyEvent::shift(Key::Enter),
                &composition,
                now,
                false,
            ),
            EnterDisposition::InsertBreak
        );
    }

    #[test]
    fn cmd_enter_mode_requires_the_modifier() {
        let composition = CompositionState::new();
        let now = Instant::now();
        assert_eq!(
            enter_disposition(
                SubmitMode::CmdEnter,
                KeyEvent::plain(Key::Enter),
                &composition,
                now,
                false,
            ),
            EnterDisposition::InsertBreak
        );
        assert_eq!(
            enter_disposition(
                SubmitMode::CmdEnter,
                KeyEvent::cmd(Key::Enter),
                &composition,
                now,
                false,
            ),
            EnterDisposition::Submit
        );
    }

    #[test]
    fn composition_and_its_grace_window_swallow_enter() {
        let mut composition = CompositionState::new();
        let t0 = Instant::now();
        composition.begin();
        assert_eq!(
            enter_disposition(
                SubmitMode::Enter,
                KeyEvent::plain(Key::Enter),
                &composition,
                t0,
                false,
            ),
            EnterDisposition::Ignore
        );
        composition.end(t0);
        assert_eq!(
            paragraph_insertion_disposition(
                SubmitMode::Enter,
                &composition,
                t0 + Duration::from_millis(50),
                false,
            ),
            EnterDisposition::Ignore
        );
        assert_eq!(
            paragraph_insertion_disposition(
                SubmitMode::Enter,
                &composition,
                t0 + Duration::from_millis(150),
                false,
            ),
            EnterDisposition::Submit
        );
    }

    #[test]
    fn open_completion_surface_owns_enter() {
        let composition = CompositionState::new();
        assert_eq!(
            enter_disposition(
                SubmitMode::Enter,
                KeyEvent::plain(Key::Enter),
                &composition,
                Instant::now(),
                true,
            ),
            EnterDisposition::Ceded
        );
    }

    #[test]
    fn word_and_line_motions_move_the_virtual_cursor() {
        let mut surface = surface_from("alpha beta\ngamma");
        let end = surface.virtual_len();
        assert!(codemoss_editor::virtual_cursor::set_virtual_cursor_position(
            &mut surface,
            end
        ));

        assert!(move_cursor(&mut surface, NavMotion::WordLeft, false));
        assert_eq!(virtual_cursor_position(&surface), 11); // start of "gamma"

        assert!(move_cursor(&mut surface, NavMotion::LineStart, false));
        assert_eq!(virtual_cursor_position(&surface), 11);

        assert!(move_cursor(&mut surface, NavMotion::WordLeft, false));
        assert_eq!(virtual_cursor_position(&surface), 6); // start of "beta"

        assert!(move_cursor(&mut surface, NavMotion::LineEnd, false));
        assert_eq!(virtual_cursor_position(&surface), 10); // end of first line

        assert!(move_cursor(&mut surface, NavMotion::WordRight, false));
        assert_eq!(virtual_cursor_position(&surface), 16); // end of "gamma"

        assert!(move_cursor(&mut surface, NavMotion::ContentStart, false));
        assert_eq!(virtual_cursor_position(&surface), 0);
    }

    #[test]
    fn shift_variants_extend_the_selection() {
        let mut surface = surface_from("one two");
        assert!(codemoss_editor::virtual_cursor::set_virtual_cursor_position(
            &mut surface,
            7
        ));
        assert!(move_cursor(&mut surface, NavMotion::WordLeft, true));
        let selection = surface.selection().expect("selection");
        assert!(!selection.is_collapsed());
        assert!(surface.delete_selection());
        assert_eq!(surface.virtual_text(), "one ");
    }

    #[test]
    fn word_left_over_a_tag_lands_before_it() {
        let mut surface = EditableSurface::from_nodes(vec![
            InlineNode::text("see "),
            InlineNode::tag("/my dir/a.rs"),
        ]);
        let end = surface.virtual_len();
        assert!(codemoss_editor::virtual_cursor::set_virtual_cursor_position(
            &mut surface,
            end
        ));
        // The tag's path contains a space; the word scan must not stop inside
        // the atomic span.
        assert!(move_cursor(&mut surface, NavMotion::WordLeft, false));
        assert_eq!(virtual_cursor_position(&surface), 4);
    }

    #[test]
    fn delete_to_line_start_removes_the_current_line_prefix() {
        let mut surface = surface_from("first\nsecond line");
        let offset = "first\nsecond ".len();
        assert!(codemoss_editor::virtual_cursor::set_virtual_cursor_position(
            &mut surface,
            offset
        ));
        assert!(delete_to_line_start(&mut surface));
        assert_eq!(surface.virtual_text(), "first\nline");
        assert!(!delete_to_line_start(&mut surface) || surface.virtual_text() == "first\nline");
    }

    #[test]
    fn motions_without_a_cursor_are_rejected() {
        let mut surface = surface_from("text");
        surface.clear_selection();
        assert!(!move_cursor(&mut surface, NavMotion::WordLeft, false));
        assert!(!delete_to_line_start(&mut surface));
    }
}
