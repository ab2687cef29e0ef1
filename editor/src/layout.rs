//! Screen positioning for completion-surface anchors.
//!
//! The dropdown for an open completion surface is anchored to the trigger
//! character's on-screen rectangle. How that rectangle is measured belongs
//! to the platform (the real host builds a zero-width range at the offset
//! and reads its bounding rect), so it sits behind [`LayoutMetrics`]; the
//! monospace implementation below serves headless hosts and tests.

use unicode_width::UnicodeWidthStr;

use crate::surface::EditableSurface;

/// On-screen rectangle of a character, in the host's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Platform seam for measuring text geometry.
pub trait LayoutMetrics {
    /// Rectangle of the character at `offset` in the surface's virtual text,
    /// or `None` when the offset is out of range.
    fn rect_at_virtual_offset(
        &self,
        surface: &EditableSurface,
        offset: usize,
    ) -> Option<AnchorRect>;
}

/// Fixed-cell metrics: every line is `line_height` tall and every column
/// advances by `cell_width` times the character's display width.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    pub cell_width: f64,
    pub line_height: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            line_height: 16.0,
        }
    }
}

impl LayoutMetrics for MonospaceMetrics {
    fn rect_at_virtual_offset(
        &self,
        surface: &EditableSurface,
        offset: usize,
    ) -> Option<AnchorRect> {
        let text = surface.virtual_text();
        if offset > text.len() || !text.is_char_boundary(offset) {
            return None;
        }
        let before = &text[..offset];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column_width = text[line_start..offset].width();
        let char_width = text[offset..]
            .chars()
            .next()
            .map(|ch| ch.to_string().width())
            .unwrap_or(0);
        Some(AnchorRect {
            top: line as f64 * self.line_height,
            left: column_width as f64 * self.cell_width,
            width: char_width as f64 * self.cell_width,
            height: self.line_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::InlineNode;
    use pretty_assertions::assert_eq;

    #[test]
    fn rect_tracks_line_and_column() {
        let surface = EditableSurface::from_nodes(vec![
            InlineNode::text("ab"),
            InlineNode::Break,
            InlineNode::text("cd @q"),
        ]);
        let metrics = MonospaceMetrics::default();
        // The '@' sits on line 1, column 3.
        let offset = surface.virtual_text().find('@').expect("trigger");
        let rect = metrics
            .rect_at_virtual_offset(&surface, offset)
            .expect("rect");
        assert_eq!(rect.top, 16.0);
        assert_eq!(rect.left, 24.0);
        assert_eq!(rect.width, 8.0);
        assert_eq!(rect.height, 16.0);
    }

    #[test]
    fn out_of_range_offset_has_no_rect() {
        let surface = EditableSurface::from_nodes(vec![InlineNode::text("x")]);
        let metrics = MonospaceMetrics::default();
        assert!(metrics.rect_at_virtual_offset(&surface, 5).is_none());
    }
}
