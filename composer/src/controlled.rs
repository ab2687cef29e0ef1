//! Controlled-value synchronization.
//!
//! The shell holds a desired-content string for the composer. While the
//! surface is focused (or an IME composition is in flight) the surface is
//! authoritative: applying a debounced external echo mid-keystroke would
//! clobber what the user is typing. The value lands once focus is lost.

use codemoss_editor::EditableSurface;

use crate::composition::CompositionState;

/// Apply the external value to the surface if it is allowed to land now.
/// Returns whether the surface was updated.
pub fn apply_controlled_value(
    surface: &mut EditableSurface,
    composition: &CompositionState,
    value: &str,
) -> bool {
    if surface.focused() || composition.is_composing() {
        return false;
    }
    if surface.rendered_text() == value {
        return false;
    }
    surface.set_text(value);
    true
}
