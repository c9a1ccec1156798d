//! Flex formatting context (§4.5, simplified): resolves one axis of item sizes from
//! `flex-basis`/content, distributes slack by `flex-grow`/`flex-shrink`, then positions
//! items per `justify-content`/`align-items` with `gap`.

use browser_core::{Length, LengthContext};
use css::computed::{AlignItems, FlexDirection, JustifyContent};

use crate::block::{layout_block, resolve_edges_pub};
use crate::box_tree::LayoutNode;
use crate::inline::MeasureText;

fn item_ctx(container_width: f32, node: &LayoutNode) -> LengthContext {
    LengthContext {
        containing_size: container_width,
        font_size: node.font_size,
        root_font_size: 16.0,
        viewport_width: 0.0,
        viewport_height: 0.0,
        line_height: node.line_height,
    }
}

/// Lay out `node` (a flex container) and its items, placing `node`'s border box at
/// `(x, y)` within a containing content width of `available_width`. Returns the used
/// content height, mirroring `block::layout_block`.
pub fn layout_flex(node: &mut LayoutNode, x: f32, y: f32, available_width: f32, viewport: (f32, f32), measure_text: &MeasureText<'_>) -> f32 {
    let ctx = item_ctx(available_width, node);
    node.geometry.margin = resolve_edges_pub(&node.style.margin, &ctx);
    node.geometry.border = resolve_edges_pub(&node.style.border_width, &ctx);
    node.geometry.padding = resolve_edges_pub(&node.style.padding, &ctx);

    let own_width = node.style.width.resolve(&ctx).unwrap_or(available_width - node.geometry.border.horizontal() - node.geometry.padding.horizontal());
    node.geometry.x = x;
    node.geometry.y = y;
    node.geometry.width = own_width;

    let content_width = own_width;
    let content_x = node.geometry.content_left();
    let content_y = node.geometry.content_top();
    let is_column = node.style.flex_direction.is_column();
    let reversed = node.style.flex_direction.is_reversed();
    let gap_ctx = LengthContext { containing_size: content_width, ..ctx };
    let column_gap = node.style.column_gap.resolve(&gap_ctx).unwrap_or(0.0);
    let row_gap = node.style.row_gap.resolve(&gap_ctx).unwrap_or(0.0);
    let main_gap = if is_column { row_gap } else { column_gap };

    let content_height_target = node.style.height.resolve(&LengthContext { containing_size: 0.0, ..ctx });
    let main_container_size = if is_column { content_height_target } else { Some(content_width) };

    let indices: Vec<usize> = (0..node.children.len()).filter(|&i| !crate::position::is_out_of_flow(node.children[i].position)).collect();
    let item_count = indices.len();

    let mut basis = vec![0.0f32; item_count];
    for (slot, &index) in indices.iter().enumerate() {
        let child = &node.children[index];
        let item_ctx = item_ctx(content_width, child);
        basis[slot] = match &child.flex_item.basis {
            Length::Auto => {
                if is_column {
                    child.style.height.resolve(&item_ctx).unwrap_or(child.line_height)
                } else {
                    child.style.width.resolve(&item_ctx).unwrap_or(content_width / item_count.max(1) as f32)
                }
            }
            basis => basis.resolve(&item_ctx).unwrap_or(0.0),
        };
    }

    let gap_total = main_gap * item_count.saturating_sub(1) as f32;
    let sum_basis: f32 = basis.iter().sum();
    let free_space = main_container_size.map_or(0.0, |target| target - sum_basis - gap_total);

    let mut main_sizes = basis.clone();
    if free_space > 0.0 {
        let grow_sum: f32 = indices.iter().map(|&index| node.children[index].flex_item.grow).sum();
        if grow_sum > 0.0 {
            for (slot, &index) in indices.iter().enumerate() {
                main_sizes[slot] += free_space * node.children[index].flex_item.grow / grow_sum;
            }
        }
    } else if free_space < 0.0 {
        let shrink_sum: f32 = indices.iter().enumerate().map(|(slot, &index)| node.children[index].flex_item.shrink * basis[slot]).sum();
        if shrink_sum > 0.0 {
            for (slot, &index) in indices.iter().enumerate() {
                let weight = node.children[index].flex_item.shrink * basis[slot];
                main_sizes[slot] = (main_sizes[slot] + free_space * weight / shrink_sum).max(0.0);
            }
        }
    }

    let used_main: f32 = main_sizes.iter().sum::<f32>() + gap_total;
    let remaining = main_container_size.unwrap_or(used_main) - used_main;
    let (mut cursor, item_gap) = justify_offsets(node.style.justify_content, remaining.max(0.0), item_count, main_gap);

    let mut order: Vec<usize> = (0..item_count).collect();
    if reversed {
        order.reverse();
    }

    let cross_size = if is_column { content_width } else { content_height_target.unwrap_or(0.0) };
    let mut max_cross = 0.0f32;

    for slot in order {
        let index = indices[slot];
        let main_size = main_sizes[slot];
        let align = node.children[index].style.align_self.unwrap_or(node.style.align_items);

        let (item_x, item_y, item_w) = if is_column {
            let cross = cross_for(align, cross_size, 0.0);
            (content_x + cross, content_y + cursor, cross_size)
        } else {
            (content_x + cursor, content_y, main_size)
        };

        layout_block(&mut node.children[index], item_x, item_y, item_w, viewport, measure_text);
        if !is_column && matches!(align, AlignItems::Stretch) && cross_size > 0.0 {
            node.children[index].geometry.height = cross_size - node.children[index].geometry.border.vertical() - node.children[index].geometry.padding.vertical();
        }
        if is_column {
            node.children[index].geometry.height = main_size - node.children[index].geometry.border.vertical() - node.children[index].geometry.padding.vertical();
        }

        let item_cross = if is_column { node.children[index].geometry.margin_box_width() } else { node.children[index].geometry.margin_box_height() };
        max_cross = max_cross.max(item_cross);
        cursor += main_size + item_gap + main_gap;
    }

    let content_height = if is_column { content_height_target.unwrap_or(used_main.max(0.0)) } else { max_cross };
    node.geometry.height = content_height;
    content_height
}

fn cross_for(align: AlignItems, cross_size: f32, natural: f32) -> f32 {
    match align {
        AlignItems::FlexStart | AlignItems::Baseline | AlignItems::Stretch => 0.0,
        AlignItems::FlexEnd => (cross_size - natural).max(0.0),
        AlignItems::Center => ((cross_size - natural) / 2.0).max(0.0),
    }
}

/// Starting cursor offset and extra per-item gap `justify-content` introduces, given
/// `remaining` free space left after item sizes and fixed gaps.
fn justify_offsets(justify: JustifyContent, remaining: f32, item_count: usize, _main_gap: f32) -> (f32, f32) {
    match justify {
        JustifyContent::FlexStart => (0.0, 0.0),
        JustifyContent::FlexEnd => (remaining, 0.0),
        JustifyContent::Center => (remaining / 2.0, 0.0),
        JustifyContent::SpaceBetween if item_count > 1 => (0.0, remaining / (item_count - 1) as f32),
        JustifyContent::SpaceBetween => (0.0, 0.0),
        JustifyContent::SpaceAround if item_count > 0 => {
            let each = remaining / item_count as f32;
            (each / 2.0, each)
        }
        JustifyContent::SpaceAround => (0.0, 0.0),
        JustifyContent::SpaceEvenly => {
            let each = remaining / (item_count + 1) as f32;
            (each, each)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::ComputedStyle;

    fn flex_container(width: f32) -> LayoutNode {
        let mut style = ComputedStyle::initial();
        style.display = css::computed::Display::Flex;
        style.width = Length::Px(width);
        LayoutNode::from_style(&style, None)
    }

    fn flex_item(basis: f32, grow: f32) -> LayoutNode {
        let mut style = ComputedStyle::initial();
        style.flex_basis = Length::Px(basis);
        style.flex_grow = grow;
        LayoutNode::from_style(&style, None)
    }

    #[test]
    fn flex_grow_distributes_slack_by_ratio() {
        let mut container = flex_container(800.0);
        container.children.push(flex_item(100.0, 1.0));
        container.children.push(flex_item(100.0, 3.0));

        let measure: MeasureText<'_> = &|_, size| size * 0.6;
        layout_flex(&mut container, 0.0, 0.0, 800.0, (800.0, 600.0), &measure);

        assert_eq!(container.children[0].geometry.width, 250.0);
        assert_eq!(container.children[1].geometry.width, 550.0);
    }

    #[test]
    fn justify_content_space_between_pushes_items_to_the_edges() {
        let mut container = flex_container(800.0);
        container.style.justify_content = JustifyContent::SpaceBetween;
        container.children.push(flex_item(100.0, 0.0));
        container.children.push(flex_item(100.0, 0.0));

        let measure: MeasureText<'_> = &|_, size| size * 0.6;
        layout_flex(&mut container, 0.0, 0.0, 800.0, (800.0, 600.0), &measure);

        assert_eq!(container.children[0].geometry.x, 0.0);
        assert_eq!(container.children[1].geometry.x, 700.0);
    }
}
