//! Out-of-flow positioning (§4.5): a second pass over the already-laid-out box tree
//! that relocates `absolute` children relative to their nearest positioned ancestor,
//! `fixed` children relative to the viewport, and reports `sticky` children's
//! threshold info for the shell to track against scroll offset.

use browser_core::{LengthContext, Rect};
use css::computed::Position;
use html::NodeId;

use crate::box_tree::LayoutNode;
use crate::inline::MeasureText;

/// `absolute`/`fixed` children are excluded from their parent's in-flow stacking
/// (§4.5); `sticky` and `relative` participate in flow at their static position.
pub const fn is_out_of_flow(position: Position) -> bool {
    matches!(position, Position::Absolute | Position::Fixed)
}

/// A `sticky` element's static (in-flow) position plus its resolved offset
/// thresholds; the shell compares these against live scroll offset each frame (§6).
#[derive(Debug, Clone)]
pub struct StickyInfo {
    pub dom_node: Option<NodeId>,
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
    pub static_rect: Rect,
    /// The containing block's border-edge top/bottom, i.e. the scroll range within
    /// which this element may stick (§6's `container_top`/`container_bottom`).
    pub container_top: f32,
    pub container_bottom: f32,
}

fn resolve_offset(length: &browser_core::Length, containing_size: f32, font_size: f32, line_height: f32, viewport: (f32, f32)) -> Option<f32> {
    length.resolve(&LengthContext {
        containing_size,
        font_size,
        root_font_size: 16.0,
        viewport_width: viewport.0,
        viewport_height: viewport.1,
        line_height,
    })
}

fn shift_subtree(node: &mut LayoutNode, dx: f32, dy: f32) {
    node.geometry.x += dx;
    node.geometry.y += dy;
    for child in &mut node.children {
        shift_subtree(child, dx, dy);
    }
}

/// Moves `node`'s border box so it satisfies its resolved `top`/`right`/`bottom`/`left`
/// offsets against `containing`, preferring `top`/`left` over `bottom`/`right` when
/// both are set on an axis (matching CSS's precedence for non-`auto` opposing insets).
fn reposition_out_of_flow(node: &mut LayoutNode, containing: Rect, viewport: (f32, f32)) {
    let top = resolve_offset(&node.style.top, containing.height, node.font_size, node.line_height, viewport);
    let left = resolve_offset(&node.style.left, containing.width, node.font_size, node.line_height, viewport);
    let right = resolve_offset(&node.style.right, containing.width, node.font_size, node.line_height, viewport);
    let bottom = resolve_offset(&node.style.bottom, containing.height, node.font_size, node.line_height, viewport);
    node.offset = [top, right, bottom, left];

    let margin_box_width = node.geometry.margin_box_width();
    let margin_box_height = node.geometry.margin_box_height();

    let new_x = left
        .map(|value| containing.x + value)
        .or_else(|| right.map(|value| containing.x + containing.width - value - margin_box_width))
        .unwrap_or(node.geometry.x);
    let new_y = top
        .map(|value| containing.y + value)
        .or_else(|| bottom.map(|value| containing.y + containing.height - value - margin_box_height))
        .unwrap_or(node.geometry.y);

    let dx = new_x - node.geometry.x;
    let dy = new_y - node.geometry.y;
    shift_subtree(node, dx, dy);
}

fn sticky_info(node: &LayoutNode, containing: Rect, viewport: (f32, f32)) -> StickyInfo {
    StickyInfo {
        dom_node: node.dom_node,
        top: resolve_offset(&node.style.top, viewport.1, node.font_size, node.line_height, viewport),
        right: resolve_offset(&node.style.right, viewport.0, node.font_size, node.line_height, viewport),
        bottom: resolve_offset(&node.style.bottom, viewport.1, node.font_size, node.line_height, viewport),
        left: resolve_offset(&node.style.left, viewport.0, node.font_size, node.line_height, viewport),
        static_rect: node.geometry.border_box_rect(),
        container_top: containing.y,
        container_bottom: containing.bottom(),
    }
}

fn walk(node: &mut LayoutNode, positioned_ancestor: Rect, viewport_rect: Rect, viewport: (f32, f32), sticky: &mut Vec<StickyInfo>) {
    let own_containing_block = if node.position == Position::Static { positioned_ancestor } else { node.geometry.padding_box_rect() };

    for child in &mut node.children {
        match child.position {
            Position::Absolute => reposition_out_of_flow(child, own_containing_block, viewport),
            Position::Fixed => reposition_out_of_flow(child, viewport_rect, viewport),
            Position::Sticky => sticky.push(sticky_info(child, own_containing_block, viewport)),
            Position::Static | Position::Relative => {}
        }
        walk(child, own_containing_block, viewport_rect, viewport, sticky);
    }
}

/// Runs the out-of-flow positioning pass over an already in-flow-laid-out tree.
/// `measure_text` is accepted for signature symmetry with the other formatting
/// contexts, though this pass never re-measures text.
pub fn layout_positioned(root: &mut LayoutNode, _x: f32, _y: f32, viewport: (f32, f32), _measure_text: &MeasureText<'_>) -> Vec<StickyInfo> {
    let viewport_rect = Rect::new(0.0, 0.0, viewport.0, viewport.1);
    let mut sticky = Vec::new();
    walk(root, viewport_rect, viewport_rect, viewport, &mut sticky);
    sticky
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_core::Length;
    use css::ComputedStyle;

    #[test]
    fn absolute_child_positions_against_nearest_positioned_ancestor() {
        let mut style = ComputedStyle::initial();
        style.position = Position::Relative;
        let mut ancestor = LayoutNode::from_style(&style, None);
        ancestor.geometry.x = 50.0;
        ancestor.geometry.y = 50.0;
        ancestor.geometry.width = 200.0;
        ancestor.geometry.height = 200.0;

        let mut child_style = ComputedStyle::initial();
        child_style.position = Position::Absolute;
        child_style.top = Length::Px(10.0);
        child_style.left = Length::Px(20.0);
        let mut child = LayoutNode::from_style(&child_style, None);
        child.geometry.x = 0.0;
        child.geometry.y = 0.0;
        ancestor.children.push(child);

        let measure: MeasureText<'_> = &|_, size| size * 0.6;
        layout_positioned(&mut ancestor, 0.0, 0.0, (800.0, 600.0), &measure);

        assert_eq!(ancestor.children[0].geometry.x, 70.0);
        assert_eq!(ancestor.children[0].geometry.y, 60.0);
    }

    #[test]
    fn fixed_child_positions_against_the_viewport() {
        let mut root = LayoutNode::from_style(&ComputedStyle::initial(), None);
        root.geometry.x = 300.0;
        root.geometry.y = 300.0;

        let mut child_style = ComputedStyle::initial();
        child_style.position = Position::Fixed;
        child_style.right = Length::Px(0.0);
        child_style.bottom = Length::Px(0.0);
        let mut child = LayoutNode::from_style(&child_style, None);
        child.geometry.width = 100.0;
        child.geometry.height = 50.0;
        root.children.push(child);

        let measure: MeasureText<'_> = &|_, size| size * 0.6;
        layout_positioned(&mut root, 0.0, 0.0, (800.0, 600.0), &measure);

        assert_eq!(root.children[0].geometry.x, 700.0);
        assert_eq!(root.children[0].geometry.y, 550.0);
    }

    #[test]
    fn sticky_child_reports_threshold_info_instead_of_moving() {
        let mut root = LayoutNode::from_style(&ComputedStyle::initial(), None);
        let mut child_style = ComputedStyle::initial();
        child_style.position = Position::Sticky;
        child_style.top = Length::Px(0.0);
        let mut child = LayoutNode::from_style(&child_style, None);
        child.geometry.x = 10.0;
        child.geometry.y = 10.0;
        root.children.push(child);

        let measure: MeasureText<'_> = &|_, size| size * 0.6;
        let sticky = layout_positioned(&mut root, 0.0, 0.0, (800.0, 600.0), &measure);

        assert_eq!(sticky.len(), 1);
        assert_eq!(sticky[0].top, Some(0.0));
        assert_eq!(root.children[0].geometry.x, 10.0);
    }
}
