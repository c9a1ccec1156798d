//! Table formatting context (§4.5, minimal contract): one `content_width` per column,
//! sized to the max of its cells' content widths, then rows laid out top to bottom.
//! No `colspan`/`rowspan` redistribution; row groups (`<tbody>`/`<thead>`/`<tfoot>`) are
//! transparent to row collection, matching how real tables treat them visually.

use browser_core::LengthContext;

use crate::block::{layout_block, resolve_edges_pub};
use crate::box_tree::{LayoutNode, Mode};
use crate::inline::MeasureText;

/// A rough max-content width estimate: sums sibling inline runs, takes the max across
/// block-level children, so a `<td>` wrapping a `<p>` doesn't get counted twice.
fn estimate_width(node: &LayoutNode, measure_text: &MeasureText<'_>) -> f32 {
    if let Some(text) = &node.text {
        return measure_text(text, node.font_size);
    }
    if node.children.is_empty() {
        return 0.0;
    }
    match node.mode {
        Mode::Inline => node.children.iter().map(|child| estimate_width(child, measure_text)).sum(),
        _ => node.children.iter().map(|child| estimate_width(child, measure_text)).fold(0.0, f32::max),
    }
}

fn is_row(node: &LayoutNode) -> bool {
    node.tag.as_deref() == Some("tr")
}

fn collect_row_widths(node: &LayoutNode, measure_text: &MeasureText<'_>, rows: &mut Vec<Vec<f32>>) {
    for child in &node.children {
        if is_row(child) {
            rows.push(child.children.iter().map(|cell| estimate_width(cell, measure_text)).collect());
        } else {
            collect_row_widths(child, measure_text, rows);
        }
    }
}

fn column_widths(rows: &[Vec<f32>]) -> Vec<f32> {
    let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..column_count)
        .map(|column| rows.iter().filter_map(|row| row.get(column)).copied().fold(0.0, f32::max))
        .collect()
}

/// Mirrors `collect_row_widths`'s traversal, mutably laying out each row's cells at
/// `column_widths` and stacking rows from `cursor_y` downward.
fn place_rows(
    node: &mut LayoutNode,
    widths: &[f32],
    column_gap: f32,
    row_gap: f32,
    content_x: f32,
    cursor_y: &mut f32,
    viewport: (f32, f32),
    measure_text: &MeasureText<'_>,
) {
    for child in &mut node.children {
        if crate::position::is_out_of_flow(child.position) {
            continue;
        }
        if is_row(child) {
            let row_y = *cursor_y;
            let mut cell_x = content_x;
            let mut row_height = 0.0f32;
            for (index, cell) in child.children.iter_mut().enumerate() {
                let width = widths.get(index).copied().unwrap_or(0.0);
                layout_block(cell, cell_x, row_y, width, viewport, measure_text);
                row_height = row_height.max(cell.geometry.margin_box_height());
                cell_x += width + column_gap;
            }
            child.geometry.x = content_x;
            child.geometry.y = row_y;
            child.geometry.width = widths.iter().sum::<f32>() + column_gap * widths.len().saturating_sub(1) as f32;
            child.geometry.height = row_height;
            *cursor_y += row_height + row_gap;
        } else {
            place_rows(child, widths, column_gap, row_gap, content_x, cursor_y, viewport, measure_text);
        }
    }
}

/// Lay out `node` (a table) and its rows/cells, mirroring `block::layout_block`'s
/// signature.
pub fn layout_table(node: &mut LayoutNode, x: f32, y: f32, available_width: f32, viewport: (f32, f32), measure_text: &MeasureText<'_>) -> f32 {
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

    let mut rows = Vec::new();
    collect_row_widths(node, measure_text, &mut rows);
    let natural_widths = column_widths(&rows);
    let natural_total: f32 = natural_widths.iter().sum::<f32>() + column_gap * natural_widths.len().saturating_sub(1) as f32;

    // Scale natural widths up to fill the table's own width when there's room; never
    // shrink below natural content width (matching `table-layout: auto`'s intent).
    let widths = if natural_total > 0.0 && own_width > natural_total {
        let scale = own_width / natural_total;
        natural_widths.iter().map(|width| width * scale).collect()
    } else {
        natural_widths
    };

    let mut cursor_y = content_y;
    place_rows(node, &widths, column_gap, row_gap, content_x, &mut cursor_y, viewport, measure_text);

    let content_height = node.style.height.resolve(&ctx).unwrap_or_else(|| (cursor_y - content_y).max(0.0));
    node.geometry.height = content_height;
    content_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::ComputedStyle;

    fn table(width: f32) -> LayoutNode {
        let mut style = ComputedStyle::initial();
        style.display = css::computed::Display::Table;
        style.width = Length::Px(width);
        LayoutNode::from_style(&style, None).with_tag("table")
    }

    fn row(cell_texts: &[&str]) -> LayoutNode {
        let style = ComputedStyle::initial();
        let mut tr = LayoutNode::from_style(&style, None).with_tag("tr");
        for text in cell_texts {
            let mut cell = LayoutNode::from_style(&style, None).with_tag("td");
            cell.mode = Mode::Block;
            cell.children.push(LayoutNode::leaf_text((*text).to_owned(), &style));
            tr.children.push(cell);
        }
        tr
    }

    use browser_core::Length;

    #[test]
    fn column_width_is_the_max_of_its_cells() {
        let mut root = table(600.0);
        root.children.push(row(&["short", "a much longer cell"]));
        root.children.push(row(&["a very long first cell indeed", "x"]));

        let measure: MeasureText<'_> = &|text, size| text.chars().count() as f32 * size * 0.6;
        layout_table(&mut root, 0.0, 0.0, 600.0, (800.0, 600.0), &measure);

        let first_column_width = root.children[0].children[0].geometry.width;
        let second_row_first_cell_width = root.children[1].children[0].geometry.width;
        assert_eq!(first_column_width, second_row_first_cell_width);
    }

    #[test]
    fn second_row_is_placed_below_the_first() {
        let mut root = table(600.0);
        root.children.push(row(&["a", "b"]));
        root.children.push(row(&["c", "d"]));

        let measure: MeasureText<'_> = &|text, size| text.chars().count() as f32 * size * 0.6;
        layout_table(&mut root, 0.0, 0.0, 600.0, (800.0, 600.0), &measure);

        assert!(root.children[1].geometry.y > root.children[0].geometry.y);
    }
}
