//! The composer façade: one object owning the editable surface and the
//! coordination state, dispatching host key events and bridge commands.

use std::time::Instant;

use codemoss_editor::EditableSurface;
use codemoss_editor::LayoutMetrics;
use codemoss_editor::SurfacePosition;
use codemoss_editor::trigger::find_trigger_token;
use codemoss_editor::virtual_cursor::position_at_virtual_offset;
use codemoss_editor::virtual_cursor::set_virtual_cursor_position;
use codemoss_editor::virtual_cursor::virtual_cursor_position;
use codemoss_protocol::custom_prompts::CustomPrompt;
use codemoss_protocol::file_references::FileReference;

use crate::completion::CompletionConfig;
use crate::completion::CompletionCoordinator;
use crate::composition::CompositionState;
use crate::controlled::apply_controlled_value;
use crate::debounce::Debouncer;
use crate::history::ComposerHistory;
use crate::host_bridge::parse_file_path_input;
use crate::keyboard::EnterDisposition;
use crate::keyboard::Key;
use crate::keyboard::KeyEvent;
use crate::keyboard::NavMotion;
use crate::keyboard::SubmitMode;
use crate::keyboard::delete_to_line_start;
use crate::keyboard::enter_disposition;
use crate::keyboard::move_cursor;
use crate::keyboard::paragraph_insertion_disposition;
use crate::path_registry::PathRegistry;
use crate::prompt_args::expand_custom_prompt_text;

#[derive(Debug, Clone, Copy, Default)]
pub struct ComposerConfig {
    pub submit_mode: SubmitMode,
    pub completion: CompletionConfig,
}

/// Result of one input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// The message to send, with any `/prompts:` command already expanded.
    Submitted(String),
    /// User-facing message: the input needs fixing (e.g. missing prompt
    /// args). The draft is left in place.
    Error(String),
    None,
}

pub struct Composer {
    config: ComposerConfig,
    surface: EditableSurface,
    composition: CompositionState,
    completion: CompletionCoordinator,
    history: ComposerHistory,
    path_registry: PathRegistry,
    prompts: Vec<CustomPrompt>,
    suggestion_debounce: Debouncer<()>,
    inline_suggestion: Option<String>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

impl Composer {
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            config,
            surface: EditableSurface::new(),
            composition: CompositionState::new(),
            completion: CompletionCoordinator::new(config.completion),
            history: ComposerHistory::new(),
            path_registry: PathRegistry::new(),
            prompts: Vec::new(),
            suggestion_debounce: Debouncer::new(config.completion.debounce_wait),
            inline_suggestion: None,
        }
    }

    pub fn surface(&self) -> &EditableSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut EditableSurface {
        &mut self.surface
    }

    pub fn completion(&self) -> &CompletionCoordinator {
        &self.completion
    }

    pub fn path_registry(&self) -> &PathRegistry {
        &self.path_registry
    }

    pub fn set_custom_prompts(&mut self, prompts: Vec<CustomPrompt>) {
        self.prompts = prompts;
    }

    pub fn current_text(&self) -> String {
        self.surface.virtual_text()
    }

    // ####### Focus / composition signals #######

    pub fn on_focus(&mut self) {
        self.surface.set_focused(true);
    }

    /// Blur tears transient state down: an in-flight composition is
    /// cancelled (it can never stick) and open dropdowns close.
    pub fn on_blur(&mut self) {
        self.surface.set_focused(false);
        self.composition.cancel();
        self.completion.close_all();
        self.completion.cancel_pending();
    }

    pub fn on_composition_start(&mut self) {
        self.composition.begin();
    }

    pub fn on_composition_end(&mut self, now: Instant) {
        self.composition.end(now);
        // The committed composition changed the text.
        self.note_text_changed(now);
    }

    // ####### Change plumbing #######

    pub fn note_text_changed(&mut self, now: Instant) {
        self.completion.note_text_changed(now);
        self.suggestion_debounce.schedule((), now);
    }

    /// The current inline (ghost-text) history completion, if any.
    pub fn inline_suggestion(&self) -> Option<&str> {
        self.inline_suggestion.as_deref()
    }

    /// Host tick: run any due debounced work. Returns whether anything ran.
    pub fn poll(&mut self, metrics: &dyn LayoutMetrics, now: Instant) -> bool {
        let completion_ran = self
            .completion
            .poll(&self.surface, metrics, &self.composition, now);
        let suggestion_ran = self.suggestion_debounce.poll(now).is_some();
        if suggestion_ran {
            let text = self.surface.virtual_text();
            self.inline_suggestion = self
                .history
                .latest_with_prefix(&text)
                .map(str::to_string);
        }
        completion_ran || suggestion_ran
    }

    // ####### Key handling #######

    pub fn handle_key_event(&mut self, event: KeyEvent, now: Instant) -> InputResult {
        if self.completion.any_open() {
            match event.key {
                // The completion list owns these entirely.
                Key::Enter | Key::ArrowUp | Key::ArrowDown | Key::Tab => {
                    return InputResult::None;
                }
                Key::Escape => {
                    self.completion.close_all();
                    return InputResult::None;
                }
                _ => {}
            }
        }
        match event.key {
            Key::Enter => {
                let disposition = enter_disposition(
                    self.config.submit_mode,
                    event,
                    &self.composition,
                    now,
                    self.completion.any_open(),
                );
                self.apply_enter_disposition(disposition, now)
            }
            Key::Backspace if event.cmd_or_ctrl => {
                if delete_to_line_start(&mut self.surface) {
                    self.note_text_changed(now);
                }
                InputResult::None
            }
            Key::Backspace => {
                self.handle_backspace(now);
                InputResult::None
            }
            Key::ArrowLeft if event.cmd_or_ctrl => self.navigate(NavMotion::LineStart, event),
            Key::ArrowRight if event.cmd_or_ctrl => self.navigate(NavMotion::LineEnd, event),
            Key::ArrowUp if event.cmd_or_ctrl => self.navigate(NavMotion::ContentStart, event),
            Key::ArrowDown if event.cmd_or_ctrl => self.navigate(NavMotion::ContentEnd, event),
            Key::ArrowLeft if event.alt => self.navigate(NavMotion::WordLeft, event),
            Key::ArrowRight if event.alt => self.navigate(NavMotion::WordRight, event),
            Key::ArrowUp => {
                self.handle_history_navigation(true, now);
                InputResult::None
            }
            Key::ArrowDown => {
                self.handle_history_navigation(false, now);
                InputResult::None
            }
            Key::Tab => {
                self.accept_inline_suggestion(now);
                InputResult::None
            }
            _ => InputResult::None,
        }
    }

    fn accept_inline_suggestion(&mut self, now: Instant) -> bool {
        let Some(suggestion) = self.inline_suggestion.take() else {
            return false;
        };
        self.surface.set_text(&suggestion);
        let end = self.surface.virtual_len();
        set_virtual_cursor_position(&mut self.surface, end);
        self.note_text_changed(now);
        true
    }

    /// Capture-phase hook for the host's paragraph-insertion `beforeinput`.
    /// Returns the submission (or error) when the paragraph insert should
    /// submit instead; `InputResult::None` means the caller lets the break
    /// insert.
    pub fn on_insert_paragraph(&mut self, now: Instant) -> InputResult {
        let disposition = paragraph_insertion_disposition(
            self.config.submit_mode,
            &self.composition,
            now,
            self.completion.any_open(),
        );
        self.apply_enter_disposition(disposition, now)
    }

    fn apply_enter_disposition(
        &mut self,
        disposition: EnterDisposition,
        now: Instant,
    ) -> InputResult {
        match disposition {
            EnterDisposition::Submit => self.submit(),
            EnterDisposition::InsertBreak => {
                self.ensure_cursor();
                if self.surface.insert_text_at_cursor("\n") {
                    self.note_text_changed(now);
                }
                InputResult::None
            }
            EnterDisposition::Ignore | EnterDisposition::Ceded => InputResult::None,
        }
    }

    fn navigate(&mut self, motion: NavMotion, event: KeyEvent) -> InputResult {
        move_cursor(&mut self.surface, motion, event.shift);
        InputResult::None
    }

    fn submit(&mut self) -> InputResult {
        let text = self.surface.virtual_text();
        if text.trim().is_empty() {
            return InputResult::None;
        }
        match expand_custom_prompt_text(&text, &self.prompts) {
            Err(error) => InputResult::Error(error.to_string()),
            Ok(expanded) => {
                let outgoing = expanded.unwrap_or_else(|| text.clone());
                self.history.record_submission(&text);
                self.surface.clear();
                self.completion.close_all();
                self.completion.cancel_pending();
                self.suggestion_debounce.cancel();
                self.inline_suggestion = None;
                InputResult::Submitted(outgoing)
            }
        }
    }

    /// Backspace keeps tags atomic: a caret sitting right after a tag
    /// removes the whole tag. Everything else falls through to the host's
    /// native character deletion.
    fn handle_backspace(&mut self, now: Instant) {
        if self.surface.delete_selection() {
            self.note_text_changed(now);
            return;
        }
        let Some(cursor) = self.surface.cursor() else {
            return;
        };
        if cursor.offset == 0
            && cursor.node > 0
            && self.surface.nodes()[cursor.node - 1].is_tag()
            && self
                .surface
                .delete_to_position(SurfacePosition::new(cursor.node - 1, 0))
        {
            self.note_text_changed(now);
        }
    }

    fn handle_history_navigation(&mut self, up: bool, now: Instant) -> bool {
        if self.completion.any_open() {
            return false;
        }
        let text = self.surface.virtual_text();
        let offset = virtual_cursor_position(&self.surface);
        if !self.history.should_handle_navigation(&text, offset) {
            return false;
        }
        let replacement = if up {
            self.history.navigate_up()
        } else {
            self.history.navigate_down()
        };
        let Some(entry) = replacement else {
            return false;
        };
        self.surface.set_text(&entry);
        let end = self.surface.virtual_len();
        set_virtual_cursor_position(&mut self.surface, end);
        self.note_text_changed(now);
        true
    }

    // ####### Completion acceptance #######

    /// Replace the active `@` token with a tag for `path` (the file dropdown
    /// accepted a match). Suppresses the completion pass the insertion would
    /// otherwise re-trigger.
    pub fn accept_file_completion(&mut self, path: &str, now: Instant) -> bool {
        let text = self.surface.virtual_text();
        let cursor = virtual_cursor_position(&self.surface);
        let Some(token) = find_trigger_token(&text, cursor, &self.surface.tag_spans()) else {
            return false;
        };
        let reference = FileReference::from_path(path);
        if !self.path_registry.record(&reference) {
            return false;
        }
        let (Some(start), Some(end)) = (
            position_at_virtual_offset(&self.surface, token.start),
            position_at_virtual_offset(&self.surface, token.end),
        ) else {
            return false;
        };
        self.surface.set_selection(start, end);
        self.surface.insert_tag_at_cursor(reference);
        self.surface.insert_text_at_cursor(" ");
        self.completion.close_all();
        self.completion.suppress_next_pass();
        self.note_text_changed(now);
        true
    }

    // ####### Host bridge entry points #######

    /// `handleFilePathFromJava`: raw string input, attempted as a JSON array
    /// first. Returns how many references were inserted.
    pub fn handle_file_path_input(&mut self, raw: &str, now: Instant) -> usize {
        let paths = parse_file_path_input(raw);
        self.insert_references(&paths, now)
    }

    /// Insert file-reference tags at the cursor. Paths failing traversal
    /// validation are dropped silently (the registry warn-logs them).
    pub fn insert_references(&mut self, paths: &[String], now: Instant) -> usize {
        let mut inserted = 0;
        for path in paths {
            let reference = FileReference::from_path(path);
            if !self.path_registry.record(&reference) {
                continue;
            }
            self.ensure_cursor();
            if self.surface.insert_tag_at_cursor(reference) {
                self.surface.insert_text_at_cursor(" ");
                inserted += 1;
            }
        }
        if inserted > 0 {
            self.completion.suppress_next_pass();
            self.note_text_changed(now);
        }
        inserted
    }

    /// `insertCodeSnippetAtCursor`: insert a text block (materialized as
    /// text + break nodes) and focus the editor.
    pub fn insert_snippet(&mut self, text: &str, now: Instant) -> bool {
        self.ensure_cursor();
        if !self.surface.insert_text_at_cursor(text) {
            return false;
        }
        self.surface.set_focused(true);
        self.note_text_changed(now);
        true
    }

    // ####### Controlled value #######

    /// Apply the shell's desired content if the surface is neither focused
    /// nor composing.
    pub fn set_controlled_value(&mut self, value: &str) -> bool {
        apply_controlled_value(&mut self.surface, &self.composition, value)
    }

    fn ensure_cursor(&mut self) {
        if self.surface.cursor().is_none() {
            let end = self.surface.end_position();
            self.surface.set_cursor(end);
        }
    }
}
