//! Coordination of the four completion dropdowns.
//!
//! One dropdown exists per trigger character (`@` files, `/` commands,
//! `#` agents, `!` prompts). They are mutually exclusive by construction:
//! the sync pass opens at most one and closes the rest. Candidate
//! text-change events are debounced so a fast typist costs one detection
//! pass, not one per keystroke.

use std::time::Duration;
use std::time::Instant;

use codemoss_editor::AnchorRect;
use codemoss_editor::EditableSurface;
use codemoss_editor::LayoutMetrics;
use codemoss_editor::TriggerChar;
use codemoss_editor::trigger::find_trigger_token;
use codemoss_editor::virtual_cursor::virtual_cursor_position;
use strum::IntoEnumIterator;

use crate::composition::CompositionState;
use crate::debounce::Debouncer;

pub const DEFAULT_DEBOUNCE_WAIT: Duration = Duration::from_millis(100);

/// Texts longer than this skip trigger detection entirely; scanning huge
/// pastes on every change is not worth a dropdown.
pub const LARGE_TEXT_THRESHOLD: usize = 50_000;

#[derive(Debug, Clone, Copy)]
pub struct CompletionConfig {
    pub debounce_wait: Duration,
    pub large_text_threshold: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            debounce_wait: DEFAULT_DEBOUNCE_WAIT,
            large_text_threshold: LARGE_TEXT_THRESHOLD,
        }
    }
}

/// State of one dropdown.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DropdownState {
    pub open: bool,
    /// Captured when the dropdown opens; deliberately not recomputed on
    /// query updates so the dropdown does not jitter while typing.
    pub anchor: Option<AnchorRect>,
    pub query: String,
}

#[derive(Debug)]
pub struct CompletionCoordinator {
    config: CompletionConfig,
    dropdowns: [DropdownState; 4],
    debouncer: Debouncer<()>,
    suppress_next_pass: bool,
}

fn slot(trigger: TriggerChar) -> usize {
    match trigger {
        TriggerChar::File => 0,
        TriggerChar::Command => 1,
        TriggerChar::Agent => 2,
        TriggerChar::Prompt => 3,
    }
}

impl Default for CompletionCoordinator {
    fn default() -> Self {
        Self::new(CompletionConfig::default())
    }
}

impl CompletionCoordinator {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            dropdowns: std::array::from_fn(|_| DropdownState::default()),
            debouncer: Debouncer::new(config.debounce_wait),
            suppress_next_pass: false,
        }
    }

    pub fn dropdown(&self, trigger: TriggerChar) -> &DropdownState {
        &self.dropdowns[slot(trigger)]
    }

    /// The open dropdown, if any. At most one is open at a time.
    pub fn open_dropdown(&self) -> Option<(TriggerChar, &DropdownState)> {
        TriggerChar::iter()
            .map(|trigger| (trigger, self.dropdown(trigger)))
            .find(|(_, state)| state.open)
    }

    pub fn any_open(&self) -> bool {
        self.open_dropdown().is_some()
    }

    pub fn close_all(&mut self) {
        for dropdown in &mut self.dropdowns {
            *dropdown = DropdownState::default();
        }
    }

    /// Suppress exactly the next sync pass. Set after programmatic tag
    /// insertion so the freshly rendered tag does not immediately reopen a
    /// dropdown; consumed once, then cleared.
    pub fn suppress_next_pass(&mut self) {
        self.suppress_next_pass = true;
    }

    /// Note a candidate text-change event. The actual detection pass runs
    /// from [`CompletionCoordinator::poll`] once the debounce window closes.
    pub fn note_text_changed(&mut self, now: Instant) {
        self.debouncer.schedule((), now);
    }

    /// Run the detection pass if a debounced change is due. Returns `true`
    /// when a pass ran.
    pub fn poll(
        &mut self,
        surface: &EditableSurface,
        metrics: &dyn LayoutMetrics,
        composition: &CompositionState,
        now: Instant,
    ) -> bool {
        if self.debouncer.poll(now).is_none() {
            return false;
        }
        self.sync(surface, metrics, composition);
        true
    }

    /// Run the pending detection pass immediately, if one is scheduled.
    pub fn flush(
        &mut self,
        surface: &EditableSurface,
        metrics: &dyn LayoutMetrics,
        composition: &CompositionState,
    ) -> bool {
        if self.debouncer.flush().is_none() {
            return false;
        }
        self.sync(surface, metrics, composition);
        true
    }

    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel();
    }

    /// One detection pass over the current surface state.
    fn sync(
        &mut self,
        surface: &EditableSurface,
        metrics: &dyn LayoutMetrics,
        composition: &CompositionState,
    ) {
        if composition.is_composing() {
            return;
        }
        if self.suppress_next_pass {
            self.suppress_next_pass = false;
            return;
        }

        let text = surface.virtual_text();
        if text.len() > self.config.large_text_threshold {
            self.close_all();
            return;
        }
        if !text
            .chars()
            .any(|ch| TriggerChar::from_char(ch).is_some())
        {
            self.close_all();
            return;
        }

        let cursor = virtual_cursor_position(surface);
        let Some(token) = find_trigger_token(&text, cursor, &surface.tag_spans()) else {
            self.close_all();
            return;
        };

        for trigger in TriggerChar::iter() {
            let dropdown = &mut self.dropdowns[slot(trigger)];
            if trigger != token.trigger {
                *dropdown = DropdownState::default();
                continue;
            }
            if dropdown.open {
                // Already open: refresh the query only, keep the anchor.
                dropdown.query = token.query.clone();
            } else {
                *dropdown = DropdownState {
                    open: true,
                    anchor: metrics.rect_at_virtual_offset(surface, token.start),
                    query: token.query.clone(),
                };
            }
        }
    }
}
