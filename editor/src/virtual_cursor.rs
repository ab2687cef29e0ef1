//! Bidirectional mapping between surface positions and virtual-text offsets.
//!
//! The virtual text is the canonical plain-text view of the surface: text
//! nodes contribute their literal text, breaks contribute `"\n"`, and each
//! tag collapses to `"@" + path`. Offsets into that string are what trigger
//! detection and the completion surfaces operate on.
//!
//! Tags are atomic, which gives the mapping its one deliberate asymmetry:
//! an offset that falls strictly inside a tag's virtual span resolves to the
//! position just after the tag. Round-tripping such an offset therefore
//! returns the tag's end offset, not the original. Defined behavior, not
//! drift.

use crate::node::InlineNode;
use crate::node::SurfacePosition;
use crate::surface::EditableSurface;
use crate::surface::clamp_to_char_boundary;

/// Virtual-text offset of a surface position.
pub fn virtual_offset_of(surface: &EditableSurface, position: SurfacePosition) -> usize {
    let position = surface.canonicalize(position);
    let mut offset = 0;
    for node in &surface.nodes()[..position.node.min(surface.nodes().len())] {
        offset += node.virtual_len();
    }
    if position.node < surface.nodes().len()
        && let InlineNode::Text(_) = &surface.nodes()[position.node]
    {
        offset += position.offset;
    }
    offset
}

/// Surface position for a virtual-text offset. Offsets inside a tag's span
/// land just after the tag; offsets past the end land at the absolute end of
/// content. `None` only when the surface has no content to place a cursor in.
pub fn position_at_virtual_offset(
    surface: &EditableSurface,
    offset: usize,
) -> Option<SurfacePosition> {
    if surface.is_empty() {
        return None;
    }
    let mut accumulated = 0;
    for (index, node) in surface.nodes().iter().enumerate() {
        let width = node.virtual_len();
        if offset < accumulated + width {
            let relative = offset - accumulated;
            return Some(match node {
                InlineNode::Text(text) => SurfacePosition::new(
                    index,
                    clamp_to_char_boundary(text, relative),
                ),
                InlineNode::Break => SurfacePosition::new(index, 0),
                InlineNode::Tag(_) => {
                    if relative == 0 {
                        SurfacePosition::new(index, 0)
                    } else {
                        // Atomic rounding: inside the tag resolves to after it.
                        surface.canonicalize(SurfacePosition::new(index, 1))
                    }
                }
            });
        }
        accumulated += width;
    }
    Some(surface.end_position())
}

/// Virtual-text offset of the current caret; `0` when there is no active
/// selection.
pub fn virtual_cursor_position(surface: &EditableSurface) -> usize {
    match surface.cursor() {
        Some(position) => virtual_offset_of(surface, position),
        None => 0,
    }
}

/// Place the caret at a virtual-text offset. Returns `false` only when the
/// surface has no content at all.
pub fn set_virtual_cursor_position(surface: &mut EditableSurface, offset: usize) -> bool {
    let Some(position) = position_at_virtual_offset(surface, offset) else {
        return false;
    };
    surface.set_cursor(position);
    true
}
