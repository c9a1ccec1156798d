//! Grid formatting context (§4.5, minimal single-axis resolver): explicit
//! `grid-template-columns` tracks in `px`/`fr`/`auto` only, no auto-placement
//! algorithm. Children fill tracks left to right, wrapping to a new row once every
//! column has one item (row tracks size to the tallest cell placed in them).

use browser_core::{Length, LengthContext};

use crate::block::{layout_block, resolve_edges_pub};
use crate::box_tree::LayoutNode;
use crate::inline::MeasureText;

/// Resolve a track list to pixel widths within `available`, treating `fr` shares
/// against the space left after fixed and `auto` tracks (`auto` falls back to an
/// equal share of that remainder, there being no content-measurement pass for tracks).
fn resolve_tracks(tracks: &[Length], available: f32, ctx: &LengthContext) -> Vec<f32> {
    if tracks.is_empty() {
        return vec![available];
    }

    let mut sizes = vec![0.0f32; tracks.len()];
    let mut fixed_total = 0.0f32;
    let mut fr_total = 0.0f32;
    let mut auto_count = 0usize;

    for track in tracks {
        match track {
            Length::Fr(share) => fr_total += share,
            Length::Auto => auto_count += 1,
            other => fixed_total += other.resolve(ctx).unwrap_or(0.0),
        }
    }

    let remainder = (available - fixed_total).max(0.0);
    let auto_share = if auto_count > 0 && fr_total == 0.0 { remainder / auto_count as f32 } else { 0.0 };
    let fr_unit = if fr_total > 0.0 { remainder / fr_total } else { 0.0 };

    for (index, track) in tracks.iter().enumerate() {
        sizes[index] = match track {
            Length::Fr(share) => fr_unit * share,
            Length::Auto => auto_share,
            other => other.resolve(ctx).unwrap_or(0.0),
        };
    }
    sizes
}

/// Lay out `node` (a grid container) and its items. Mirrors `block::layout_block` and
/// `flex::layout_flex`'s signature so the three formatting contexts are interchangeable
/// from the caller's perspective.
pub fn layout_grid(node: &mut LayoutNode, x: f32, y: f32, available_width: f32, viewport: (f32, f32), measure_text: &MeasureText<'_>) -> f32 {
    let ctx = LengthContext {
        containing_size: available_width,
        font_size: node.font_size,
        root_font_size: 16.0,
        viewport_width: viewport.0,
        viewport_height: viewport.1,
        line_height: node.line_height,
    };
    node.geometry.margin = resolve_edges_pub(&node.style.margin, &ctx);
    node.geometry.border = resolve_edges_pub(&node.style.border_width, &ctx);
    node.geometry.padding = resolve_edges_pub(&node.style.padding, &ctx);

    let own_width = node.style.width.resolve(&ctx).unwrap_or(available_width - node.geometry.border.horizontal() - node.geometry.padding.horizontal());
    node.geometry.x = x;
    node.geometry.y = y;
    node.geometry.width = own_width;

    let content_x = node.geometry.content_left();
    let content_y = node.geometry.content_top();
    let column_gap = node.style.column_gap.resolve(&ctx).unwrap_or(0.0);
    let row_gap = node.style.row_gap.resolve(&ctx).unwrap_or(0.0);

    let column_count = node.style.grid_template_columns.len().max(1);
    let gap_total = column_gap * column_count.saturating_sub(1) as f32;
    let column_widths = resolve_tracks(&node.style.grid_template_columns, own_width - gap_total, &ctx);

    let mut cursor_y = content_y;
    let mut row_height = 0.0f32;
    let mut column = 0usize;

    for child in &mut node.children {
        if crate::position::is_out_of_flow(child.position) {
            continue;
        }
        if column == column_count {
            cursor_y += row_height + row_gap;
            row_height = 0.0;
            column = 0;
        }
        let cell_x = content_x + column_widths[..column].iter().sum::<f32>() + column_gap * column as f32;
        let cell_width = column_widths[column];
        layout_block(child, cell_x, cursor_y, cell_width, viewport, measure_text);
        row_height = row_height.max(child.geometry.margin_box_height());
        column += 1;
    }
    if column > 0 {
        cursor_y += row_height;
    }

    let content_height = node.style.height.resolve(&ctx).unwrap_or_else(|| (cursor_y - content_y).max(0.0));
    node.geometry.height = content_height;
    content_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::ComputedStyle;

    fn grid_container(width: f32, columns: Vec<Length>) -> LayoutNode {
        let mut style = ComputedStyle::initial();
        style.display = css::computed::Display::Grid;
        style.width = Length::Px(width);
        style.grid_template_columns = columns;
        LayoutNode::from_style(&style, None)
    }

    fn cell() -> LayoutNode {
        let style = ComputedStyle::initial();
        LayoutNode::from_style(&style, None)
    }

    #[test]
    fn two_px_columns_place_children_side_by_side() {
        let mut container = grid_container(600.0, vec![Length::Px(200.0), Length::Px(400.0)]);
        container.children.push(cell());
        container.children.push(cell());

        let measure: MeasureText<'_> = &|_, size| size * 0.6;
        layout_grid(&mut container, 0.0, 0.0, 600.0, (800.0, 600.0), &measure);

        assert_eq!(container.children[0].geometry.x, 0.0);
        assert_eq!(container.children[0].geometry.width, 200.0);
        assert_eq!(container.children[1].geometry.x, 200.0);
        assert_eq!(container.children[1].geometry.width, 400.0);
    }

    #[test]
    fn fr_track_absorbs_remaining_space() {
        let mut container = grid_container(600.0, vec![Length::Px(200.0), Length::Fr(1.0)]);
        container.children.push(cell());
        container.children.push(cell());

        let measure: MeasureText<'_> = &|_, size| size * 0.6;
        layout_grid(&mut container, 0.0, 0.0, 600.0, (800.0, 600.0), &measure);

        assert_eq!(container.children[1].geometry.width, 400.0);
    }

    #[test]
    fn third_child_wraps_to_a_new_row() {
        let mut container = grid_container(600.0, vec![Length::Px(200.0), Length::Px(400.0)]);
        container.children.push(cell());
        container.children.push(cell());
        container.children.push(cell());

        let measure: MeasureText<'_> = &|_, size| size * 0.6;
        layout_grid(&mut container, 0.0, 0.0, 600.0, (800.0, 600.0), &measure);

        assert!(container.children[2].geometry.y > container.children[0].geometry.y);
    }
}
