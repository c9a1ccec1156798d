//! Block formatting context (§4.5): children stack top-to-bottom, widths fill the
//! containing block unless specified, and adjacent in-flow block siblings' vertical
//! margins collapse into the larger of the two.

use browser_core::{EdgeSizes, Length, LengthContext};

use crate::box_tree::{Geometry, LayoutNode, Mode};
use crate::inline::layout_inline_children;

fn resolve_edges(lengths: &css::computed::EdgeLengths, ctx: &LengthContext) -> EdgeSizes {
    EdgeSizes {
        top: lengths.top.resolve(ctx).unwrap_or(0.0),
        right: lengths.right.resolve(ctx).unwrap_or(0.0),
        bottom: lengths.bottom.resolve(ctx).unwrap_or(0.0),
        left: lengths.left.resolve(ctx).unwrap_or(0.0),
    }
}

/// Lay out `node`'s block-formatting-context children, placing `node`'s own border box
/// at `(x, y)` with a content width of `available_width`. Returns the used content
/// height. `measure_text` is threaded through to any descendant inline formatting
/// contexts.
pub fn layout_block(node: &mut LayoutNode, x: f32, y: f32, available_width: f32, viewport: (f32, f32), measure_text: &crate::inline::MeasureText<'_>) -> f32 {
    let ctx = LengthContext {
        containing_size: available_width,
        font_size: node.font_size,
        root_font_size: 16.0,
        viewport_width: viewport.0,
        viewport_height: viewport.1,
        line_height: node.line_height,
    };

    node.geometry.margin = resolve_edges(&node.style.margin, &ctx);
    node.geometry.border = resolve_edges(&node.style.border_width, &ctx);
    node.geometry.padding = resolve_edges(&node.style.padding, &ctx);

    let own_width = node.style.width.resolve(&ctx).unwrap_or_else(|| {
        available_width - node.geometry.border.horizontal() - node.geometry.padding.horizontal()
    });

    if node.style.width.resolve(&ctx).is_some() && node.style.margin.left.is_auto() && node.style.margin.right.is_auto() {
        let used = own_width + node.geometry.border.horizontal() + node.geometry.padding.horizontal();
        let slack = (available_width - used).max(0.0);
        node.geometry.margin.left = slack / 2.0;
        node.geometry.margin.right = slack / 2.0;
    }

    node.geometry.x = x;
    node.geometry.y = y;
    node.geometry.width = own_width;

    let content_width = own_width;
    let mut cursor_y = node.content_top_relative();
    let content_x = node.content_left_relative();
    let mut prev_margin_bottom = 0.0f32;
    let mut first_child = true;

    for child in &mut node.children {
        let child_height = match child.mode {
            Mode::Inline if child.is_text() => {
                child.geometry.x = content_x;
                child.geometry.y = cursor_y;
                child.geometry.width = child
                    .font_size
                    .mul_add(0.6, 0.0)
                    * child.text.as_deref().unwrap_or_default().chars().count() as f32;
                child.geometry.height = child.line_height;
                child.geometry.height
            }
            Mode::Inline => layout_inline_run(child, content_x, cursor_y, content_width, viewport, measure_text),
            Mode::Flex => {
                let height = crate::flex::layout_flex(child, content_x, cursor_y, content_width, viewport, measure_text);
                if !first_child {
                    let collapsed = prev_margin_bottom.max(child.geometry.margin.top);
                    cursor_y -= child.geometry.margin.top;
                    cursor_y += collapsed;
                }
                height
            }
            Mode::Grid => {
                let height = crate::grid::layout_grid(child, content_x, cursor_y, content_width, viewport, measure_text);
                if !first_child {
                    let collapsed = prev_margin_bottom.max(child.geometry.margin.top);
                    cursor_y -= child.geometry.margin.top;
                    cursor_y += collapsed;
                }
                height
            }
            Mode::Table => {
                let height = crate::table::layout_table(child, content_x, cursor_y, content_width, viewport, measure_text);
                if !first_child {
                    let collapsed = prev_margin_bottom.max(child.geometry.margin.top);
                    cursor_y -= child.geometry.margin.top;
                    cursor_y += collapsed;
                }
                height
            }
            Mode::Block => {
                let height = layout_block(child, content_x, cursor_y, content_width, viewport, measure_text);
                if !first_child {
                    let collapsed = prev_margin_bottom.max(child.geometry.margin.top);
                    cursor_y -= child.geometry.margin.top;
                    cursor_y += collapsed;
                }
                height
            }
            Mode::None => 0.0,
        };

        if crate::position::is_out_of_flow(child.position) {
            continue;
        }

        prev_margin_bottom = child.geometry.margin.bottom;
        cursor_y += child.geometry.margin_box_height_from(child_height);
        first_child = false;
    }

    let content_height = node.style.height.resolve(&ctx).unwrap_or_else(|| (cursor_y - node.content_top_relative()).max(0.0));
    node.geometry.height = content_height;
    content_height
}

fn layout_inline_run(node: &mut LayoutNode, x: f32, y: f32, available_width: f32, viewport: (f32, f32), measure_text: &crate::inline::MeasureText<'_>) -> f32 {
    let ctx = LengthContext {
        containing_size: available_width,
        font_size: node.font_size,
        root_font_size: 16.0,
        viewport_width: viewport.0,
        viewport_height: viewport.1,
        line_height: node.line_height,
    };
    node.geometry.margin = resolve_edges(&node.style.margin, &ctx);
    node.geometry.border = resolve_edges(&node.style.border_width, &ctx);
    node.geometry.padding = resolve_edges(&node.style.padding, &ctx);
    node.geometry.x = x;
    node.geometry.y = y;
    node.geometry.width = available_width - node.geometry.border.horizontal() - node.geometry.padding.horizontal();
    layout_inline_children(node, viewport, measure_text)
}

impl LayoutNode {
    fn content_top_relative(&self) -> f32 {
        self.geometry.y + self.geometry.margin.top + self.geometry.border.top + self.geometry.padding.top
    }

    fn content_left_relative(&self) -> f32 {
        self.geometry.x + self.geometry.margin.left + self.geometry.border.left + self.geometry.padding.left
    }

    fn margin_box_height_from(&self, content_height: f32) -> f32 {
        self.geometry.margin.vertical() + self.geometry.border.vertical() + self.geometry.padding.vertical() + content_height
    }
}

pub(crate) fn resolve_edges_pub(lengths: &css::computed::EdgeLengths, ctx: &LengthContext) -> EdgeSizes {
    resolve_edges(lengths, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::{resolve_style, ComputedStyle};

    fn block_style(width: Length) -> ComputedStyle {
        let mut style = ComputedStyle::initial();
        style.display = css::computed::Display::Block;
        style.width = width;
        style
    }

    #[test]
    fn nested_block_padding_offsets_child_content_origin() {
        let mut parent = LayoutNode::from_style(&{
            let mut s = block_style(Length::Px(400.0));
            s.padding = css::computed::EdgeLengths::uniform(Length::Px(20.0));
            s
        }, None);
        let mut child = LayoutNode::from_style(&block_style(Length::Auto), None);
        child.children.push(LayoutNode::leaf_text("x", &ComputedStyle::initial()));
        parent.children.push(child);

        let measure: crate::inline::MeasureText<'_> = &|_, size| size * 0.6;
        layout_block(&mut parent, 0.0, 0.0, 400.0, (800.0, 600.0), &measure);

        let child = &parent.children[0];
        assert_eq!(child.geometry.x, 20.0);
        assert_eq!(child.geometry.y, 20.0);
        assert_eq!(
            parent.geometry.margin_box_width(),
            parent.geometry.margin.horizontal() + parent.geometry.border.horizontal() + parent.geometry.padding.horizontal() + parent.geometry.width
        );
    }

    #[test]
    fn adjacent_block_siblings_collapse_margins() {
        let mut parent = LayoutNode::from_style(&block_style(Length::Px(400.0)), None);
        let mut a = LayoutNode::from_style(&{
            let mut s = block_style(Length::Px(100.0));
            s.margin.bottom = Length::Px(20.0);
            s.height = Length::Px(50.0);
            s
        }, None);
        let mut b = LayoutNode::from_style(&{
            let mut s = block_style(Length::Px(100.0));
            s.margin.top = Length::Px(10.0);
            s.height = Length::Px(30.0);
            s
        }, None);
        a.children.clear();
        b.children.clear();
        parent.children.push(a);
        parent.children.push(b);

        let measure: crate::inline::MeasureText<'_> = &|_, size| size * 0.6;
        layout_block(&mut parent, 0.0, 0.0, 400.0, (800.0, 600.0), &measure);

        // collapsed margin is max(20, 10) = 20, so b starts at 50 + 20 = 70
        assert_eq!(parent.children[1].geometry.y, 70.0);
    }
}
