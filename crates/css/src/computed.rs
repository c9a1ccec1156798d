//! `ComputedStyle`: the flat, resolved record the cascade produces for one element.
//! Box-model lengths stay as `Length` (resolved later by the layout engine against a
//! containing block); font metrics resolve eagerly to pixels during cascade because
//! `em`/`ch` in descendant declarations need the parent's already-resolved font size.

use std::collections::HashMap;

use browser_core::{Color, Length};

use crate::value::CssValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    Table,
    TableRow,
    TableCell,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Visible,
    Hidden,
    Scroll,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }

    pub const fn is_column(self) -> bool {
        matches!(self, Self::Column | Self::ColumnReverse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexWrap {
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Stretch,
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
}

/// A single `box-shadow` layer (§4.6/§4.7's "blurred rectangle outside, or inside for
/// inset, the element rect"). Only one layer is tracked, matching the "minimum
/// contract" this pipeline applies to visual effects outside the layout-affecting
/// properties in §4.5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShadow {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur_radius: f32,
    pub spread_radius: f32,
    pub color: Color,
    pub inset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub color: Color,
    pub width: f32,
}

impl Default for Outline {
    fn default() -> Self {
        Self { color: Color::TRANSPARENT, width: 0.0 }
    }
}

/// A `linear-gradient()`/`radial-gradient()`/`conic-gradient()` background image
/// (§4.7). The angle is in degrees for linear gradients and meaningless for the
/// others; stops are `(color, position in [0, 1])` pairs already normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    Linear { angle_degrees: f32, stops: Vec<(Color, f32)> },
    Radial { stops: Vec<(Color, f32)> },
    Conic { stops: Vec<(Color, f32)> },
}

/// A single `transform` function (§3's `AffineTransform`, built incrementally as the
/// `transform` property's function list is parsed). Kept as the op list rather than a
/// pre-composed matrix so the painter can still special-case 3D-looking inputs later
/// without losing information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(f32, f32),
    Scale(f32, f32),
    Rotate(f32),
}

/// `clip-path` shapes (§4.7), kept here rather than in `paint::ClipShape` so this crate
/// doesn't need a dependency on `paint` just to carry the parsed property; the painter
/// converts one of these into a `paint::ClipShape` against the box's resolved geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipPathShape {
    Circle { radius_percent: f32 },
    Ellipse { rx_percent: f32, ry_percent: f32 },
    Inset { top_percent: f32, right_percent: f32, bottom_percent: f32, left_percent: f32 },
    Polygon { points_percent: Vec<(f32, f32)> },
}

/// Four-sided `Length` box, the unresolved counterpart of `browser_core::EdgeSizes`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLengths {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl EdgeLengths {
    pub const fn zero() -> Self {
        Self { top: Length::Zero, right: Length::Zero, bottom: Length::Zero, left: Length::Zero }
    }

    pub fn uniform(length: Length) -> Self {
        Self { top: length.clone(), right: length.clone(), bottom: length.clone(), left: length }
    }
}

impl Default for EdgeLengths {
    fn default() -> Self {
        Self::zero()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub position: Position,
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub min_height: Length,
    pub max_width: Length,
    pub max_height: Length,
    pub margin: EdgeLengths,
    pub padding: EdgeLengths,
    pub border_width: EdgeLengths,
    pub border_color: Color,

    pub color: Color,
    pub background_color: Color,
    pub font_size: f32,
    pub font_family: String,
    pub font_weight: u16,
    pub italic: bool,
    pub line_height: f32,
    pub text_align: TextAlign,
    pub text_decoration: String,
    pub letter_spacing: f32,
    pub visible: bool,

    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub cursor: String,
    pub opacity: f32,
    pub z_index: Option<i32>,

    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_self: Option<AlignItems>,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Length,
    pub row_gap: Length,
    pub column_gap: Length,

    /// Explicit grid tracks (`px`/`fr`/`auto` only, per the Open Questions resolution);
    /// empty means the grid falls back to a single auto column.
    pub grid_template_columns: Vec<Length>,
    pub grid_template_rows: Vec<Length>,

    /// `--name` custom properties; inherited and substituted via `var()`.
    pub custom_properties: HashMap<String, CssValue>,

    pub border_radius: f32,
    pub box_shadow: Option<BoxShadow>,
    pub outline: Outline,
    pub transform: Option<TransformOp>,
    pub filter_blur: f32,
    pub background_gradient: Option<Gradient>,
    pub mix_blend_mode: Option<String>,
    pub clip_path: Option<ClipPathShape>,
    pub backdrop_filter_blur: f32,
    pub mask_gradient: Option<Gradient>,
}

impl ComputedStyle {
    /// The user-agent initial value set: a 16px black-on-transparent block, matching
    /// the defaults real engines seed the root element with before any author rule applies.
    pub fn initial() -> Self {
        Self {
            display: Display::Inline,
            position: Position::Static,
            top: Length::Auto,
            right: Length::Auto,
            bottom: Length::Auto,
            left: Length::Auto,
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Auto,
            min_height: Length::Auto,
            max_width: Length::Auto,
            max_height: Length::Auto,
            margin: EdgeLengths::zero(),
            padding: EdgeLengths::zero(),
            border_width: EdgeLengths::zero(),
            border_color: Color::BLACK,
            color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            font_size: 16.0,
            font_family: "sans-serif".to_owned(),
            font_weight: 400,
            italic: false,
            line_height: 16.0 * 1.2,
            text_align: TextAlign::Left,
            text_decoration: "none".to_owned(),
            letter_spacing: 0.0,
            visible: true,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            cursor: "auto".to_owned(),
            opacity: 1.0,
            z_index: None,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            align_self: None,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Length::Auto,
            row_gap: Length::Zero,
            column_gap: Length::Zero,
            grid_template_columns: Vec::new(),
            grid_template_rows: Vec::new(),
            custom_properties: HashMap::new(),
            border_radius: 0.0,
            box_shadow: None,
            outline: Outline::default(),
            transform: None,
            filter_blur: 0.0,
            background_gradient: None,
            mix_blend_mode: None,
            clip_path: None,
            backdrop_filter_blur: 0.0,
            mask_gradient: None,
        }
    }

    /// Build the style a child inherits before its own declarations apply: inherited
    /// properties (color, font, text-align, ...) copy from `parent`; everything else
    /// resets to the initial value.
    pub fn inherit_from(parent: &Self) -> Self {
        Self {
            color: parent.color,
            font_size: parent.font_size,
            font_family: parent.font_family.clone(),
            font_weight: parent.font_weight,
            italic: parent.italic,
            line_height: parent.line_height,
            text_align: parent.text_align,
            letter_spacing: parent.letter_spacing,
            visible: parent.visible,
            cursor: parent.cursor.clone(),
            custom_properties: parent.custom_properties.clone(),
            ..Self::initial()
        }
    }
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherit_from_copies_inherited_properties_only() {
        let mut parent = ComputedStyle::initial();
        parent.color = Color::rgb(10, 20, 30);
        parent.background_color = Color::rgb(1, 2, 3);
        parent.display = Display::Flex;

        let child = ComputedStyle::inherit_from(&parent);
        assert_eq!(child.color, parent.color);
        assert_eq!(child.background_color, Color::TRANSPARENT);
        assert_eq!(child.display, Display::Inline);
    }
}
