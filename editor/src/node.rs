use codemoss_protocol::file_references::FileReference;

/// One child of the editable surface.
///
/// `Tag` is atomic: it is never partially selected or edited from the inside.
/// Editing operations either keep a tag whole or remove it whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    Text(String),
    Break,
    Tag(FileReference),
}

impl InlineNode {
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text(text.into())
    }

    pub fn tag(path: &str) -> Self {
        InlineNode::Tag(FileReference::from_path(path))
    }

    /// What this node contributes to the canonical virtual text: literal text
    /// for text nodes, `"\n"` for breaks, `"@" + path` for tags.
    pub fn virtual_text(&self) -> String {
        match self {
            InlineNode::Text(text) => text.clone(),
            InlineNode::Break => "\n".to_string(),
            InlineNode::Tag(reference) => format!("@{}", reference.path),
        }
    }

    /// What this node contributes to the rendered (visible) text. Tags render
    /// their short display name rather than the full path.
    pub fn rendered_text(&self) -> String {
        match self {
            InlineNode::Text(text) => text.clone(),
            InlineNode::Break => "\n".to_string(),
            InlineNode::Tag(reference) => format!("@{}", reference.display_name),
        }
    }

    /// Byte length of this node's virtual-text contribution.
    pub fn virtual_len(&self) -> usize {
        match self {
            InlineNode::Text(text) => text.len(),
            InlineNode::Break => 1,
            InlineNode::Tag(reference) => reference.path.len() + 1,
        }
    }

    /// Width of this node in surface-position units: byte length for text,
    /// one unit for the atomic nodes.
    pub fn position_width(&self) -> usize {
        match self {
            InlineNode::Text(text) => text.len(),
            InlineNode::Break | InlineNode::Tag(_) => 1,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, InlineNode::Text(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, InlineNode::Tag(_))
    }
}

/// A cursor endpoint inside the surface.
///
/// `offset` is a byte offset within a text node, or `0`/`1` (before/after)
/// for the atomic `Break`/`Tag` nodes. The past-the-end position is
/// `{ node: nodes.len(), offset: 0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SurfacePosition {
    pub node: usize,
    pub offset: usize,
}

impl SurfacePosition {
    pub fn new(node: usize, offset: usize) -> Self {
        Self { node, offset }
    }

    pub const START: SurfacePosition = SurfacePosition { node: 0, offset: 0 };
}
