//! The box tree: the layout engine's output shape (§3's `LayoutNode`). Geometry is
//! resolved pixels; `margin`/`border`/`padding` are `browser_core::EdgeSizes` and the
//! box-model derived accessors (`content_left`, `margin_box_width`, ...) enforce the
//! invariant in §8: `margin_box_width = margin.l + border.l + padding.l + content_width
//! + padding.r + border.r + margin.r`.

use browser_core::{EdgeSizes, Length, Rect};
use css::computed::{ComputedStyle, Display, Position};
use html::NodeId;

/// The formatting context a node's children are laid out under, derived from
/// `display` (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Block,
    Inline,
    Flex,
    Grid,
    Table,
    None,
}

impl Mode {
    pub const fn from_display(display: Display) -> Self {
        match display {
            Display::None => Self::None,
            Display::Flex => Self::Flex,
            Display::Grid => Self::Grid,
            Display::Table => Self::Table,
            Display::Inline | Display::InlineBlock => Self::Inline,
            Display::Block | Display::TableRow | Display::TableCell => Self::Block,
        }
    }
}

/// Resolved box-model geometry: content-box origin/size plus the three resolved edge
/// rings around it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub margin: EdgeSizes,
    pub border: EdgeSizes,
    pub padding: EdgeSizes,
}

impl Geometry {
    pub fn content_left(&self) -> f32 {
        self.x + self.margin.left + self.border.left + self.padding.left
    }

    pub fn content_top(&self) -> f32 {
        self.y + self.margin.top + self.border.top + self.padding.top
    }

    pub fn margin_box_width(&self) -> f32 {
        self.margin.horizontal() + self.border.horizontal() + self.padding.horizontal() + self.width
    }

    pub fn margin_box_height(&self) -> f32 {
        self.margin.vertical() + self.border.vertical() + self.padding.vertical() + self.height
    }

    pub fn border_box_rect(&self) -> Rect {
        Rect::new(
            self.x + self.margin.left,
            self.y + self.margin.top,
            self.border.horizontal() + self.padding.horizontal() + self.width,
            self.border.vertical() + self.padding.vertical() + self.height,
        )
    }

    pub fn content_box_rect(&self) -> Rect {
        Rect::new(self.content_left(), self.content_top(), self.width, self.height)
    }

    /// The padding box: content plus padding, excluding border and margin. Out-of-flow
    /// offsets (`top`/`right`/`bottom`/`left`) resolve against this rect for an
    /// `absolute` child whose containing block is this node (§4.5's glossary entry).
    pub fn padding_box_rect(&self) -> Rect {
        Rect::new(
            self.x + self.margin.left + self.border.left,
            self.y + self.margin.top + self.border.top,
            self.padding.horizontal() + self.width,
            self.padding.vertical() + self.height,
        )
    }
}

/// Per-item flex parameters, cached from `ComputedStyle` so the flex formatting
/// context doesn't need to re-read style during resolution passes.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexItemParams {
    pub grow: f32,
    pub shrink: f32,
    pub basis: Length,
}

/// One box in the tree. Text boxes carry `text`/`font_*` and no children; everything
/// else carries zero or more owned children and dispatches to a formatting context by
/// `mode`.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub mode: Mode,
    pub geometry: Geometry,
    pub position: Position,
    /// Resolved `top`/`right`/`bottom`/`left` offsets; `None` when the property was
    /// `auto` (the positioning pass then falls back to the static position).
    pub offset: [Option<f32>; 4],
    pub min_width: Option<f32>,
    pub min_height: Option<f32>,
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
    pub text: Option<String>,
    pub font_size: f32,
    pub font_family: String,
    pub font_weight: u16,
    pub italic: bool,
    pub line_height: f32,
    pub flex_item: FlexItemParams,
    pub children: Vec<LayoutNode>,
    pub dom_node: Option<NodeId>,
    pub style: ComputedStyle,
    /// An anonymous box synthesized to wrap runs of inline children in a mixed
    /// block/inline parent (§4.5); it has no originating DOM node and no style of
    /// its own beyond what it inherited structurally.
    pub is_anonymous: bool,
    /// Lower-cased tag name, cached from the originating element so the painter
    /// doesn't need a DOM lookup per box for form-control/`<a>`/`<summary>` decisions.
    pub tag: Option<String>,
    /// Stable id for a `<details>` box's toggle region (§4.6), assigned during box-tree
    /// construction; `<summary>` boxes carry their enclosing `<details>`'s id.
    pub details_id: Option<u32>,
}

impl LayoutNode {
    pub fn leaf_text(text: impl Into<String>, style: &ComputedStyle) -> Self {
        Self {
            mode: Mode::Inline,
            geometry: Geometry::default(),
            position: Position::Static,
            offset: [None; 4],
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            text: Some(text.into()),
            font_size: style.font_size,
            font_family: style.font_family.clone(),
            font_weight: style.font_weight,
            italic: style.italic,
            line_height: style.line_height,
            flex_item: FlexItemParams { grow: 0.0, shrink: 1.0, basis: Length::Auto },
            children: Vec::new(),
            dom_node: None,
            style: style.clone(),
            is_anonymous: false,
            tag: None,
            details_id: None,
        }
    }

    pub fn anonymous_block(style: &ComputedStyle) -> Self {
        let mut node = Self::from_style(style, None);
        node.mode = Mode::Block;
        node.is_anonymous = true;
        node
    }

    pub fn from_style(style: &ComputedStyle, dom_node: Option<NodeId>) -> Self {
        Self {
            mode: Mode::from_display(style.display),
            geometry: Geometry::default(),
            position: style.position,
            offset: [None; 4],
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            text: None,
            font_size: style.font_size,
            font_family: style.font_family.clone(),
            font_weight: style.font_weight,
            italic: style.italic,
            line_height: style.line_height,
            flex_item: FlexItemParams { grow: style.flex_grow, shrink: style.flex_shrink, basis: style.flex_basis.clone() },
            children: Vec::new(),
            dom_node,
            style: style.clone(),
            is_anonymous: false,
            tag: None,
            details_id: None,
        }
    }

    pub fn is_inline_level(&self) -> bool {
        matches!(self.mode, Mode::Inline)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_box_dimensions_match_box_model_invariant() {
        let geometry = Geometry {
            x: 0.0,
            y: 0.0,
            width: 720.0,
            height: 20.0,
            margin: EdgeSizes::uniform(5.0),
            border: EdgeSizes::uniform(2.0),
            padding: EdgeSizes::uniform(10.0),
        };
        assert_eq!(geometry.margin_box_width(), 5.0 + 2.0 + 10.0 + 720.0 + 10.0 + 2.0 + 5.0);
        assert_eq!(geometry.margin_box_height(), 5.0 + 2.0 + 10.0 + 20.0 + 10.0 + 2.0 + 5.0);
    }
}
