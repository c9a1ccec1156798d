//! The painter (§4.6): walks the positioned box tree in tree order and emits an
//! ordered `DisplayList`. Geometry is already absolute (layout resolved it), so the
//! painter only needs its own clip/transform stack for `overflow`/`transform`, not for
//! ordinary in-flow positioning.

use std::collections::HashSet;

use browser_core::{AffineTransform, Color, Rect};
use css::computed::{Overflow, Position, TransformOp};
use html::{Document, NodeId};
use layout::LayoutNode;

use crate::command::{BlendMode, PaintCommand};
use crate::display_list::DisplayList;
use crate::region::{CursorRegion, DetailsToggleRegion, ElementRegion, FormSubmitRegion, LinkRegion, SelectClickRegion, TextCommand};

fn transform_of(op: TransformOp) -> AffineTransform {
    match op {
        TransformOp::Translate(x, y) => AffineTransform::translation(x, y),
        TransformOp::Scale(x, y) => AffineTransform::scale(x, y),
        TransformOp::Rotate(degrees) => AffineTransform::rotation_degrees(degrees),
    }
}

fn attribute<'doc>(doc: &'doc Document, node: Option<NodeId>, name: &str) -> Option<&'doc str> {
    doc.data(node?).attribute(name)
}

/// Build the full display list for a positioned box tree. `toggled_details` carries
/// the `<details>` element ids the shell has toggled open since their layout-assigned
/// default (§6's optional `toggled_details` input).
pub fn build_display_list(doc: &Document, root: &LayoutNode, toggled_details: &HashSet<u32>) -> DisplayList {
    let mut list = DisplayList::new();
    paint_node(doc, root, &mut list, toggled_details);
    list
}

fn paint_node(doc: &Document, node: &LayoutNode, list: &mut DisplayList, toggled_details: &HashSet<u32>) {
    let border_rect = node.geometry.border_box_rect();

    if let Some(dom_node) = node.dom_node {
        list.element_regions.push(ElementRegion { rect: border_rect, dom_node });
    }

    let transform = node.style.transform.map(transform_of);
    if let Some(transform) = transform {
        list.push(PaintCommand::PushTransform { transform });
    }

    let clip_rect = clip_rect_for(node);
    if let Some(clip_rect) = clip_rect {
        list.push(PaintCommand::PushClip { rect: clip_rect });
    }

    if node.style.visible {
        paint_own_content(doc, node, border_rect, list);
    }

    for child in &node.children {
        paint_node(doc, child, list, toggled_details);
    }

    if node.style.visible {
        paint_outline(node, border_rect, list);
        paint_form_decorations(doc, node, border_rect, list, toggled_details);
    }

    if clip_rect.is_some() {
        list.push(PaintCommand::PopClip);
    }
    if transform.is_some() {
        list.push(PaintCommand::PopTransform);
    }
}

/// A finite clip rectangle iff `overflow` on either axis clips content (§4.6).
fn clip_rect_for(node: &LayoutNode) -> Option<Rect> {
    let clips = matches!(node.style.overflow_x, Overflow::Hidden | Overflow::Scroll | Overflow::Auto)
        || matches!(node.style.overflow_y, Overflow::Hidden | Overflow::Scroll | Overflow::Auto);
    clips.then(|| node.geometry.padding_box_rect())
}

fn paint_own_content(doc: &Document, node: &LayoutNode, border_rect: Rect, list: &mut DisplayList) {
    if let Some(text) = &node.text {
        if node.style.color.a > 0 {
            list.push(PaintCommand::DrawText {
                origin: (node.geometry.x, node.geometry.y),
                text: text.clone(),
                font_size: node.font_size,
                font_family: node.font_family.clone(),
                font_weight: node.font_weight,
                italic: node.italic,
                letter_spacing: node.style.letter_spacing,
                color: node.style.color,
            });
        }
        list.text_commands.push(TextCommand { rect: border_rect, text: text.clone(), dom_node: node.dom_node });
        return;
    }

    if let Some(shadow) = node.style.box_shadow {
        if !shadow.inset {
            list.push(PaintCommand::FillBoxShadow { rect: border_rect, shadow });
        }
    }

    if let Some(gradient) = &node.style.background_gradient {
        list.push(PaintCommand::FillGradient { rect: border_rect, gradient: gradient.clone() });
    } else if node.style.background_color.a > 0 {
        list.push(PaintCommand::FillRect {
            rect: border_rect,
            color: node.style.background_color,
            corner_radius: node.style.border_radius,
        });
    }

    if let Some(shadow) = node.style.box_shadow {
        if shadow.inset {
            list.push(PaintCommand::FillBoxShadow { rect: border_rect, shadow });
        }
    }

    let border = &node.style.border_width;
    let resolve_border_widths = |ctx_size: f32, length: &browser_core::Length| -> f32 {
        length
            .resolve(&browser_core::LengthContext {
                containing_size: ctx_size,
                font_size: node.font_size,
                root_font_size: 16.0,
                viewport_width: ctx_size,
                viewport_height: ctx_size,
                line_height: node.line_height,
            })
            .unwrap_or(0.0)
    };
    let resolved_widths = browser_core::EdgeSizes {
        top: resolve_border_widths(border_rect.height, &border.top),
        right: resolve_border_widths(border_rect.width, &border.right),
        bottom: resolve_border_widths(border_rect.height, &border.bottom),
        left: resolve_border_widths(border_rect.width, &border.left),
    };
    if resolved_widths.top > 0.0 || resolved_widths.right > 0.0 || resolved_widths.bottom > 0.0 || resolved_widths.left > 0.0 {
        list.push(PaintCommand::DrawBorder {
            rect: border_rect,
            widths: resolved_widths,
            color: node.style.border_color,
            corner_radius: node.style.border_radius,
        });
    }
}

fn paint_outline(node: &LayoutNode, border_rect: Rect, list: &mut DisplayList) {
    if node.style.outline.width > 0.0 && node.style.outline.color.a > 0 {
        let outline_rect = Rect::new(
            border_rect.x - node.style.outline.width,
            border_rect.y - node.style.outline.width,
            border_rect.width + node.style.outline.width * 2.0,
            border_rect.height + node.style.outline.width * 2.0,
        );
        list.push(PaintCommand::DrawBorder {
            rect: outline_rect,
            widths: browser_core::EdgeSizes::uniform(node.style.outline.width),
            color: node.style.outline.color,
            corner_radius: 0.0,
        });
    }
}

#[allow(clippy::too_many_lines, reason = "form-control decoration dispatch enumerates every control kind in one place")]
fn paint_form_decorations(doc: &Document, node: &LayoutNode, rect: Rect, list: &mut DisplayList, toggled_details: &HashSet<u32>) {
    if !node.style.cursor.is_empty() && node.style.cursor != "auto" {
        list.cursor_regions.push(CursorRegion { rect, cursor: node.style.cursor.clone() });
    }

    let Some(tag) = node.tag.as_deref() else { return };
    match tag {
        "a" => {
            if let Some(href) = attribute(doc, node.dom_node, "href") {
                list.links.push(LinkRegion {
                    rect,
                    href: href.to_owned(),
                    target: attribute(doc, node.dom_node, "target").map(str::to_owned),
                });
            }
        }
        "button" | "input" => {
            let input_type = attribute(doc, node.dom_node, "type").unwrap_or("text");
            match input_type {
                "submit" => {
                    list.form_submit_regions.push(FormSubmitRegion {
                        rect,
                        action: nearest_form_attribute(doc, node.dom_node, "action").unwrap_or_default(),
                        method: nearest_form_attribute(doc, node.dom_node, "method").unwrap_or_else(|| "get".to_owned()),
                    });
                }
                "checkbox" => paint_checkbox(node, rect, list, doc),
                "radio" => paint_radio(node, rect, list, doc),
                "range" => paint_range(node, rect, list, doc),
                "color" => {
                    let swatch = attribute(doc, node.dom_node, "value").and_then(Color::parse).unwrap_or(Color::BLACK);
                    list.push(PaintCommand::FillRect { rect, color: swatch, corner_radius: 2.0 });
                }
                _ => paint_caret(node, rect, list, doc),
            }
        }
        "textarea" => paint_caret(node, rect, list, doc),
        "select" => {
            let selected_index = attribute(doc, node.dom_node, "data-selected-index").and_then(|value| value.parse().ok());
            let options = node
                .dom_node
                .map(|dom_node| doc.children(dom_node).into_iter().filter(|&child| doc.tag_name_of(child) == Some("option")).collect::<Vec<_>>())
                .unwrap_or_default();
            let option_labels = options
                .iter()
                .filter_map(|&option| doc.children(option).into_iter().find_map(|child| doc.data(child).text_data().map(str::to_owned)))
                .collect();
            list.select_click_regions.push(SelectClickRegion { rect, options: option_labels, selected_index });
            let arrow_x = rect.right() - 12.0;
            let arrow_y = rect.y + rect.height / 2.0;
            list.push(PaintCommand::DrawLine { from: (arrow_x - 4.0, arrow_y - 2.0), to: (arrow_x, arrow_y + 2.0), color: Color::BLACK, width: 1.5 });
            list.push(PaintCommand::DrawLine { from: (arrow_x, arrow_y + 2.0), to: (arrow_x + 4.0, arrow_y - 2.0), color: Color::BLACK, width: 1.5 });
        }
        "summary" => {
            if let Some(details_id) = node.details_id {
                let open = toggled_details.contains(&details_id) ^ parent_details_open_attr(doc, node.dom_node);
                list.details_toggle_regions.push(DetailsToggleRegion { rect, details_id, open });
            }
        }
        _ => {}
    }
}

fn parent_details_open_attr(doc: &Document, summary_node: Option<NodeId>) -> bool {
    summary_node.and_then(|node| doc.parent(node)).is_some_and(|parent| attribute(doc, Some(parent), "open").is_some())
}

fn nearest_form_attribute(doc: &Document, start: Option<NodeId>, name: &str) -> Option<String> {
    let mut current = start.and_then(|node| doc.parent(node));
    while let Some(node) = current {
        if doc.tag_name_of(node) == Some("form") {
            return attribute(doc, Some(node), name).map(str::to_owned);
        }
        current = doc.parent(node);
    }
    None
}

fn paint_checkbox(node: &LayoutNode, rect: Rect, list: &mut DisplayList, doc: &Document) {
    let size = rect.height.min(rect.width).min(16.0);
    let box_rect = Rect::new(rect.x, rect.y + (rect.height - size) / 2.0, size, size);
    list.push(PaintCommand::DrawBorder { rect: box_rect, widths: browser_core::EdgeSizes::uniform(1.0), color: Color::BLACK, corner_radius: 2.0 });
    if attribute(doc, node.dom_node, "checked").is_some() {
        list.push(PaintCommand::DrawLine { from: (box_rect.x + 2.0, box_rect.y + size / 2.0), to: (box_rect.x + size / 2.0, box_rect.bottom() - 2.0), color: Color::BLACK, width: 2.0 });
        list.push(PaintCommand::DrawLine { from: (box_rect.x + size / 2.0, box_rect.bottom() - 2.0), to: (box_rect.right() - 2.0, box_rect.y + 2.0), color: Color::BLACK, width: 2.0 });
    }
}

fn paint_radio(node: &LayoutNode, rect: Rect, list: &mut DisplayList, doc: &Document) {
    let size = rect.height.min(rect.width).min(16.0);
    let circle_rect = Rect::new(rect.x, rect.y + (rect.height - size) / 2.0, size, size);
    list.push(PaintCommand::DrawEllipse { rect: circle_rect, color: Color::TRANSPARENT });
    list.push(PaintCommand::DrawBorder { rect: circle_rect, widths: browser_core::EdgeSizes::uniform(1.0), color: Color::BLACK, corner_radius: size / 2.0 });
    if attribute(doc, node.dom_node, "checked").is_some() {
        let inset = size * 0.3;
        list.push(PaintCommand::DrawEllipse {
            rect: Rect::new(circle_rect.x + inset / 2.0, circle_rect.y + inset / 2.0, size - inset, size - inset),
            color: Color::BLACK,
        });
    }
}

fn paint_range(node: &LayoutNode, rect: Rect, list: &mut DisplayList, doc: &Document) {
    let track_y = rect.y + rect.height / 2.0;
    list.push(PaintCommand::DrawLine { from: (rect.x, track_y), to: (rect.right(), track_y), color: Color::rgb(200, 200, 200), width: 3.0 });
    let value: f32 = attribute(doc, node.dom_node, "value").and_then(|value| value.parse().ok()).unwrap_or(0.0);
    let min: f32 = attribute(doc, node.dom_node, "min").and_then(|value| value.parse().ok()).unwrap_or(0.0);
    let max: f32 = attribute(doc, node.dom_node, "max").and_then(|value| value.parse().ok()).unwrap_or(100.0);
    let fraction = if max > min { ((value - min) / (max - min)).clamp(0.0, 1.0) } else { 0.0 };
    let thumb_x = rect.x + fraction * rect.width;
    list.push(PaintCommand::DrawEllipse { rect: Rect::new(thumb_x - 6.0, track_y - 6.0, 12.0, 12.0), color: Color::BLACK });
}

fn paint_caret(node: &LayoutNode, rect: Rect, list: &mut DisplayList, doc: &Document) {
    if attribute(doc, node.dom_node, "autofocus").is_none() {
        return;
    }
    let value = attribute(doc, node.dom_node, "value").unwrap_or_default();
    let measured_width = value.chars().count() as f32 * node.font_size * 0.6;
    let caret_x = rect.x + 4.0 + measured_width;
    list.push(PaintCommand::DrawLine {
        from: (caret_x, rect.y + 2.0),
        to: (caret_x, rect.bottom() - 2.0),
        color: node.style.color,
        width: 1.0,
    });
}

/// Derive a `BlendMode` and, if non-`Normal`, the `SaveBackdrop`/`ApplyBlendMode` pair
/// that brackets a stacking context's content (§4.7). Exposed for `raster` tests that
/// exercise the backdrop-snapshot machinery without a full box tree.
pub fn blend_mode_commands(mode: &str) -> Option<(PaintCommand, PaintCommand)> {
    let parsed = BlendMode::parse(mode);
    (parsed != BlendMode::Normal).then_some((PaintCommand::SaveBackdrop, PaintCommand::ApplyBlendMode { mode: parsed }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::tree_builder::parse_document;
    use layout::{build_styled_tree, layout_document};
    use std::collections::HashSet;

    fn measure(_: &str, size: f32) -> f32 {
        size * 0.6
    }

    #[test]
    fn link_emits_a_link_region_with_its_href() {
        let doc = parse_document(r#"<a href="https://example.com">hi</a>"#);
        let styled = build_styled_tree(&doc, &[], (800.0, 600.0), &|_| Vec::new());
        let root = doc.children(doc.root)[0];
        let measure_fn: layout::MeasureText<'_> = &measure;
        let (tree, _) = layout_document(&doc, &styled, root, &[], (800.0, 600.0), &measure_fn).unwrap();
        let list = build_display_list(&doc, &tree, &HashSet::new());
        assert_eq!(list.links.len(), 1);
        assert_eq!(list.links[0].href, "https://example.com");
    }

    #[test]
    fn every_rendered_element_gets_exactly_one_element_region() {
        let doc = parse_document("<div><p>a</p><p style=\"display:none\">b</p><span>c</span></div>");
        let styled = build_styled_tree(&doc, &[], (800.0, 600.0), &|_| Vec::new());
        let root = doc.children(doc.root)[0];
        let measure_fn: layout::MeasureText<'_> = &measure;
        let (tree, _) = layout_document(&doc, &styled, root, &[], (800.0, 600.0), &measure_fn).unwrap();
        let list = build_display_list(&doc, &tree, &HashSet::new());
        // div, p("a"), span -- the display:none p contributes no box, hence no region.
        assert_eq!(list.element_regions.len(), 3);
    }

    #[test]
    fn display_list_from_a_real_tree_is_balanced() {
        let doc = parse_document(r#"<div style="overflow:hidden"><p>hi</p></div>"#);
        let styled = build_styled_tree(&doc, &[], (800.0, 600.0), &|_| Vec::new());
        let root = doc.children(doc.root)[0];
        let measure_fn: layout::MeasureText<'_> = &measure;
        let (tree, _) = layout_document(&doc, &styled, root, &[], (800.0, 600.0), &measure_fn).unwrap();
        let list = build_display_list(&doc, &tree, &HashSet::new());
        assert!(list.validate().is_ok());
    }

    #[test]
    fn checkbox_marked_checked_paints_a_check_mark_line() {
        let doc = parse_document(r#"<input type="checkbox" checked>"#);
        let styled = build_styled_tree(&doc, &[], (800.0, 600.0), &|_| Vec::new());
        let root = doc.children(doc.root)[0];
        let measure_fn: layout::MeasureText<'_> = &measure;
        let (tree, _) = layout_document(&doc, &styled, root, &[], (800.0, 600.0), &measure_fn).unwrap();
        let list = build_display_list(&doc, &tree, &HashSet::new());
        assert!(list.commands.iter().any(|command| matches!(command, PaintCommand::DrawLine { .. })));
    }
}
