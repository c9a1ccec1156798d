//! Side-band hit-test data the painter accumulates alongside the paint command
//! stream (§3, §4.6, §6): link/cursor/form/details/select regions for the shell to
//! route input events, plus per-element regions for generic hit testing.

use browser_core::Rect;
use html::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRegion {
    pub rect: Rect,
    pub href: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CursorRegion {
    pub rect: Rect,
    pub cursor: String,
}

/// A painted run of text, kept side-band so the shell can compute text selection
/// without re-walking the display list's draw commands (§6's `text_commands`).
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub rect: Rect,
    pub text: String,
    pub dom_node: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmitRegion {
    pub rect: Rect,
    pub action: String,
    pub method: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailsToggleRegion {
    pub rect: Rect,
    pub details_id: u32,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectClickRegion {
    pub rect: Rect,
    pub options: Vec<String>,
    pub selected_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRegion {
    pub rect: Rect,
    pub dom_node: NodeId,
}
