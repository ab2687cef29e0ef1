//! IME composition tracking.
//!
//! Composition state is an explicit three-phase machine rather than a
//! boolean: a composition-confirming Enter can arrive as a normal keydown
//! immediately after `compositionend`, so submit stays suppressed for a
//! short grace window after a composition finishes. The host's input methods
//! report ambiguous key codes during composition for *all* keys, so phase
//! transitions are driven only by dedicated composition start/end signals,
//! never inferred from key codes.

use std::time::Duration;
use std::time::Instant;

pub const COMPOSITION_END_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Composing,
    RecentlyEnded(Instant),
}

#[derive(Debug, Clone, Copy)]
pub struct CompositionState {
    phase: Phase,
    grace: Duration,
}

impl Default for CompositionState {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositionState {
    pub fn new() -> Self {
        Self::with_grace(COMPOSITION_END_GRACE)
    }

    pub fn with_grace(grace: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            grace,
        }
    }

    /// Composition started (`compositionstart`).
    pub fn begin(&mut self) {
        self.phase = Phase::Composing;
    }

    /// Composition finished normally (`compositionend`). The grace window
    /// starts here.
    pub fn end(&mut self, now: Instant) {
        if self.phase == Phase::Composing {
            self.phase = Phase::RecentlyEnded(now);
        }
    }

    /// Abnormal termination: blur while composing. Clears straight to idle
    /// so the composing flag can never stick and deadlock input handling.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn is_composing(&self) -> bool {
        self.phase == Phase::Composing
    }

    /// Whether Enter must not submit right now: composition is in progress,
    /// or one ended within the grace window.
    pub fn suppresses_submit(&self, now: Instant) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Composing => true,
            Phase::RecentlyEnded(ended_at) => now.duration_since(ended_at) < self.grace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_is_suppressed_while_composing_and_through_the_grace_window() {
        let mut composition = CompositionState::new();
        let t0 = Instant::now();
        composition.begin();
        assert!(composition.suppresses_submit(t0));

        composition.end(t0);
        assert!(!composition.is_composing());
        assert!(composition.suppresses_submit(t0 + Duration::from_millis(99)));
        assert!(!composition.suppresses_submit(t0 + COMPOSITION_END_GRACE));
    }

    #[test]
    fn blur_during_composition_clears_to_idle() {
        let mut composition = CompositionState::new();
        composition.begin();
        composition.cancel();
        assert!(!composition.is_composing());
        assert!(!composition.suppresses_submit(Instant::now()));
    }

    #[test]
    fn restarting_composition_from_the_grace_window_re_enters_composing() {
        let mut composition = CompositionState::new();
        let t0 = Instant::now();
        composition.begin();
        composition.end(t0);
        composition.begin();
        assert!(composition.is_composing());
        // Suppression no longer depends on the stale grace timestamp.
        assert!(composition.suppresses_submit(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn end_without_begin_stays_idle() {
        let mut composition = CompositionState::new();
        composition.end(Instant::now());
        assert!(!composition.suppresses_submit(Instant::now()));
    }
}
