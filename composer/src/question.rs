//! State for the ask-user-question dialog.
//!
//! The host pushes a [`UserInputRequest`]; the user picks one option per
//! question (questions are single-select; the host's type system has no
//! per-question multi-select) and submits, cancels, or lets the countdown
//! run out. Timeout and Escape route through the same cancel handler, which
//! is idempotent: once the active request is gone, further calls are no-ops.

use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use codemoss_protocol::user_input::UserInputAnswer;
use codemoss_protocol::user_input::UserInputRequest;
use codemoss_protocol::user_input::UserInputResponse;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A finished dialog: the request it answers and the response to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogResult {
    pub request_id: String,
    pub response: UserInputResponse,
}

#[derive(Debug)]
struct ActiveRequest {
    request: UserInputRequest,
    /// question id -> selected option label.
    selected: HashMap<String, String>,
    remaining_seconds: Option<u32>,
    next_tick_at: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct QuestionDialogState {
    active: Option<ActiveRequest>,
}

impl QuestionDialogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a request. Replaces any request currently on screen: selections
    /// and the countdown reset atomically, with the new timer seeded before
    /// its first tick can fire.
    pub fn show(&mut self, request: UserInputRequest, now: Instant) {
        let remaining_seconds = request.timeout_seconds;
        self.active = Some(ActiveRequest {
            request,
            selected: HashMap::new(),
            remaining_seconds,
            next_tick_at: remaining_seconds.map(|_| now + TICK_INTERVAL),
        });
    }

    pub fn active_request(&self) -> Option<&UserInputRequest> {
        self.active.as_ref().map(|active| &active.request)
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.active.as_ref().and_then(|active| active.remaining_seconds)
    }

    pub fn selected_label(&self, question_id: &str) -> Option<&str> {
        self.active
            .as_ref()
            .and_then(|active| active.selected.get(question_id))
            .map(String::as_str)
    }

    /// Select an option for a question. Single-select: a second selection
    /// replaces the first. Returns `false` when the question or label is
    /// unknown.
    pub fn select_option(&mut self, question_id: &str, label: &str) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let valid = active.request.questions.iter().any(|question| {
            question.id == question_id
                && question
                    .options
                    .as_ref()
                    .is_some_and(|options| options.iter().any(|option| option.label == label))
        });
        if !valid {
            return false;
        }
        active
            .selected
            .insert(question_id.to_string(), label.to_string());
        true
    }

    /// Submit the current selections. Clears the dialog; `None` when nothing
    /// is active.
    pub fn submit(&mut self) -> Option<DialogResult> {
        let active = self.active.take()?;
        let answers = active
            .selected
            .into_iter()
            .map(|(question_id, label)| {
                (
                    question_id,
                    UserInputAnswer {
                        answers: vec![label],
                    },
                )
            })
            .collect();
        Some(DialogResult {
            request_id: active.request.request_id,
            response: UserInputResponse { answers },
        })
    }

    /// Cancel the dialog (Escape, or countdown expiry). Responds with an
    /// empty answer map. Idempotent: `None` once nothing is active.
    pub fn cancel(&mut self) -> Option<DialogResult> {
        let active = self.active.take()?;
        Some(DialogResult {
            request_id: active.request.request_id,
            response: UserInputResponse::cancelled(),
        })
    }

    /// Advance the one-second countdown. When it reaches zero the dialog
    /// auto-cancels through the same handler as Escape, exactly once.
    pub fn tick(&mut self, now: Instant) -> Option<DialogResult> {
        let active = self.active.as_mut()?;
        let (Some(remaining), Some(next_tick)) =
            (active.remaining_seconds, active.next_tick_at)
        else {
            return None;
        };
        if now < next_tick {
            return None;
        }
        let elapsed_ticks = 1 + (now.duration_since(next_tick).as_secs() as u32);
        let remaining = remaining.saturating_sub(elapsed_ticks);
        active.remaining_seconds = Some(remaining);
        active.next_tick_at = Some(next_tick + TICK_INTERVAL * elapsed_ticks);
        if remaining == 0 {
            return self.cancel();
        }
        None
    }
}
