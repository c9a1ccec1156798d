//! Inline formatting context (§4.5): text and inline-level boxes flow left to right,
//! wrapping to a new line when the next item would overflow the containing width.

use crate::box_tree::LayoutNode;

/// Measures the pixel width of a run of text at a given font size. The caller injects
/// this (a real engine would shape through a platform font API); when none is
/// available, callers fall back to `fallback_measure` below.
pub type MeasureText<'a> = &'a dyn Fn(&str, f32) -> f32;

/// `char_count · font_size · 0.6`, used when no `measure_text` callback is supplied.
pub fn fallback_measure(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.6
}

/// Total width an inline box would take up on one line, recursing into nested inline
/// children (e.g. a `<span>` inside a paragraph) without wrapping them internally.
fn measure_width(node: &LayoutNode, measure_text: &MeasureText<'_>) -> f32 {
    if let Some(text) = &node.text {
        measure_text(text, node.font_size)
    } else {
        node.children.iter().map(|child| measure_width(child, measure_text)).sum()
    }
}

/// Positions `item` (and, recursively, its own inline children) starting at `(x, y)`
/// on a line of height `line_height`. Returns the width it consumed.
fn place_item(item: &mut LayoutNode, x: f32, y: f32, line_height: f32, measure_text: &MeasureText<'_>) -> f32 {
    item.geometry.x = x;
    item.geometry.y = y;
    item.geometry.height = line_height;
    if let Some(text) = item.text.clone() {
        item.geometry.width = measure_text(&text, item.font_size);
    } else {
        let mut cursor = x;
        for child in &mut item.children {
            cursor += place_item(child, cursor, y, line_height, measure_text);
        }
        item.geometry.width = cursor - x;
    }
    item.geometry.width
}

/// Lay out `node`'s inline-level children within its already-resolved content box,
/// wrapping lines at `node.geometry.width` and applying `text-align` (§4.5). Returns
/// the total content height consumed (also written to `node.geometry.height`).
pub fn layout_inline_children(node: &mut LayoutNode, _viewport: (f32, f32), measure_text: &MeasureText<'_>) -> f32 {
    let available_width = node.geometry.width;
    let line_height = node.line_height;
    let content_x = node.geometry.content_left();
    let content_y = node.geometry.content_top();
    let text_align = node.style.text_align;

    let widths: Vec<f32> = node.children.iter().map(|child| measure_width(child, measure_text)).collect();

    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_width = 0.0f32;
    for (index, &width) in widths.iter().enumerate() {
        if !current.is_empty() && current_width + width > available_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        current.push(index);
        current_width += width;
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let line_count = lines.len().max(1);
    for (line_index, line) in lines.iter().enumerate() {
        let line_width: f32 = line.iter().map(|&index| widths[index]).sum();
        let slack = (available_width - line_width).max(0.0);
        let is_last = line_index + 1 == lines.len();

        let (mut cursor, gap) = match text_align {
            css::computed::TextAlign::Left => (content_x, 0.0),
            css::computed::TextAlign::Center => (content_x + slack / 2.0, 0.0),
            css::computed::TextAlign::Right => (content_x + slack, 0.0),
            css::computed::TextAlign::Justify if !is_last && line.len() > 1 => {
                (content_x, slack / (line.len() - 1) as f32)
            }
            css::computed::TextAlign::Justify => (content_x, 0.0),
        };

        let line_y = content_y + line_index as f32 * line_height;
        for &index in line {
            place_item(&mut node.children[index], cursor, line_y, line_height, measure_text);
            cursor += widths[index] + gap;
        }
    }

    let total_height = line_count as f32 * line_height;
    node.geometry.height = total_height;
    total_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::Mode;
    use css::ComputedStyle;

    fn text_node(text: &str, font_size: f32) -> LayoutNode {
        let mut style = ComputedStyle::initial();
        style.font_size = font_size;
        style.line_height = font_size * 1.2;
        LayoutNode::leaf_text(text, &style)
    }

    #[test]
    fn single_short_line_stays_on_one_line() {
        let mut style = ComputedStyle::initial();
        style.line_height = 20.0;
        let mut container = LayoutNode::from_style(&style, None);
        container.mode = Mode::Inline;
        container.geometry.width = 400.0;
        container.line_height = 20.0;
        container.children.push(text_node("hi", 16.0));

        let measure: MeasureText<'_> = &fallback_measure;
        let height = layout_inline_children(&mut container, (800.0, 600.0), &measure);
        assert_eq!(height, 20.0);
        assert_eq!(container.children[0].geometry.y, 0.0);
    }

    #[test]
    fn overflowing_second_item_wraps_to_a_new_line() {
        let mut style = ComputedStyle::initial();
        style.line_height = 20.0;
        let mut container = LayoutNode::from_style(&style, None);
        container.mode = Mode::Inline;
        container.geometry.width = 50.0;
        container.line_height = 20.0;
        container.children.push(text_node("wwwwwwwwww", 16.0));
        container.children.push(text_node("wwwwwwwwww", 16.0));

        let measure: MeasureText<'_> = &fallback_measure;
        layout_inline_children(&mut container, (800.0, 600.0), &measure);
        assert_eq!(container.children[0].geometry.y, 0.0);
        assert_eq!(container.children[1].geometry.y, 20.0);
    }

    #[test]
    fn text_align_right_shifts_line_to_the_containing_edge() {
        let mut style = ComputedStyle::initial();
        style.line_height = 20.0;
        style.text_align = css::computed::TextAlign::Right;
        let mut container = LayoutNode::from_style(&style, None);
        container.mode = Mode::Inline;
        container.geometry.width = 100.0;
        container.line_height = 20.0;
        container.children.push(text_node("hi", 16.0));

        let measure: MeasureText<'_> = &|text, size| text.chars().count() as f32 * size * 0.6;
        layout_inline_children(&mut container, (800.0, 600.0), &measure);
        let width = container.children[0].geometry.width;
        assert_eq!(container.children[0].geometry.x, 100.0 - width);
    }
}
