//! The editable-surface engine behind the CodeMoss composer.
//!
//! The composer's input area is a tree of inline content nodes: plain text,
//! explicit line breaks, and atomic file-reference tags. This crate owns that
//! tree and everything that operates on it directly: selection/range
//! primitives, the virtual-text offset mapping, and trigger-token detection.
//! Platform concerns (the host's native selection and layout machinery) sit
//! behind the [`surface::NativeEditHost`] and [`layout::LayoutMetrics`]
//! traits so the editing algorithms are testable on their own.

pub mod layout;
pub mod node;
pub mod surface;
pub mod trigger;
pub mod virtual_cursor;

pub use layout::AnchorRect;
pub use layout::LayoutMetrics;
pub use node::InlineNode;
pub use node::SurfacePosition;
pub use surface::EditableSurface;
pub use surface::NativeEditHost;
pub use trigger::TriggerChar;
pub use trigger::TriggerToken;
