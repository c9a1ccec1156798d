//! Top-level render pipeline: wires the tokenizer/tree builder, cascade, layout
//! engine, painter, and rasterizer into the single `render_html` entry point a shell
//! actually calls. Nothing downstream of `html::parse_document` talks to the DOM
//! crate directly except this module and `metadata`/`forms`, which both need one extra
//! walk over the finished tree for data the layout pipeline doesn't carry.

pub mod config;
pub mod forms;
pub mod metadata;
pub mod result;

use std::collections::HashMap;

use browser_core::registry;
use css::StyleSheet;
use html::{Document, NodeData};
use layout::{LayoutNode, MeasureText, StickyInfo};
use raster::PixelBuffer;

pub use config::{DarkModeOverride, MarkerLookup, RenderConfig};
pub use result::{RenderResult, StickyElement};

/// Every `<style>` element's text content, parsed in document order, so inline sheets
/// cascade exactly where the author wrote them relative to `extra_stylesheets`.
fn inline_stylesheets(doc: &Document) -> Vec<StyleSheet> {
    let mut sheets = Vec::new();
    for node in doc.descendants(doc.root) {
        if doc.tag_name_of(node) != Some("style") {
            continue;
        }
        let mut source = String::new();
        for child in doc.children(node) {
            if let NodeData::Text { data } = doc.data(child) {
                source.push_str(data);
            }
        }
        sheets.push(css::parse_stylesheet(&source));
    }
    sheets
}

/// Crop a `width x height` RGBA snapshot out of the rasterized frame at `rect`'s
/// border-box origin, clamping to the frame bounds (a sticky element positioned
/// partway off-screen still gets a snapshot of whatever is visible).
fn crop_snapshot(buffer: &PixelBuffer, x: f32, y: f32, width: f32, height: f32) -> Vec<u8> {
    let w = width.round().max(0.0) as i32;
    let h = height.round().max(0.0) as i32;
    let x0 = x.round() as i32;
    let y0 = y.round() as i32;
    let mut pixels = Vec::with_capacity((w.max(0) as usize) * (h.max(0) as usize) * 4);
    for row in 0..h {
        for col in 0..w {
            let color = buffer.get(x0 + col, y0 + row);
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }
    pixels
}

/// Collect the rendered y-offset of every element carrying an `id` attribute, keyed by
/// the id, walking the positioned box tree alongside the DOM so anonymous boxes (which
/// never carry a `dom_node`) are skipped.
fn collect_id_positions(doc: &Document, node: &LayoutNode, out: &mut HashMap<String, f32>) {
    if let Some(dom_node) = node.dom_node {
        if let Some(id) = doc.data(dom_node).attribute("id") {
            out.entry(id.to_owned()).or_insert_with(|| node.geometry.border_box_rect().y);
        }
    }
    for child in &node.children {
        collect_id_positions(doc, child, out);
    }
}

fn sticky_elements(sticky: Vec<StickyInfo>, buffer: &PixelBuffer) -> Vec<StickyElement> {
    sticky
        .into_iter()
        .map(|info| {
            let rect = info.static_rect;
            StickyElement {
                abs_y: rect.y,
                width: rect.width,
                height: rect.height,
                top_offset: info.top,
                container_top: info.container_top,
                container_bottom: info.container_bottom,
                pixel_snapshot: crop_snapshot(buffer, rect.x, rect.y, rect.width, rect.height),
            }
        })
        .collect()
}

/// Run the whole render pipeline end to end. On any `InvariantViolation` raised
/// downstream (an unbalanced display list, a rasterizer failure), returns a
/// `RenderResult::failure` rather than propagating -- the shell is the one piece of
/// this system allowed to show an error state, the core never panics its way out of a
/// bad document.
pub fn render_html(html: &str, config: &RenderConfig<'_>) -> RenderResult {
    let _span = tracing::info_span!("page.render_html").entered();

    registry::reset_counters();
    registry::set_dark_mode_override(config.dark_mode_override.as_i8());
    registry::set_system_dark_mode(config.system_dark_mode);

    let viewport = config.viewport();
    let doc = { let _span = tracing::info_span!("page.parse_html").entered(); html::parse_document(html) };

    let mut sheets = inline_stylesheets(&doc);
    sheets.extend(config.extra_stylesheets.iter().cloned());
    let sheet_refs: Vec<&StyleSheet> = sheets.iter().collect();

    let metadata = metadata::extract_metadata(&doc);
    let forms = forms::extract_forms(&doc);
    let (selection_color, selection_bg_color) = css::resolve_selection_colors(&sheet_refs, viewport);

    let root_node = doc.html_element.unwrap_or(doc.root);
    let markers = config.marker_lookup();
    let styled = {
        let _span = tracing::info_span!("page.resolve_styles").entered();
        layout::build_styled_tree(&doc, &sheet_refs, viewport, markers)
    };

    let fallback_measure: MeasureText<'_> = &layout::inline::fallback_measure;
    let measure_text: MeasureText<'_> = config.measure_text.unwrap_or(fallback_measure);

    let layout_result = {
        let _span = tracing::info_span!("page.layout").entered();
        layout::layout_document(&doc, &styled, root_node, &sheet_refs, viewport, &measure_text)
    };

    let Some((root_box, sticky)) = layout_result else {
        // A `display: none` root renders nothing; not a failure, just an empty page.
        log::trace!("root element is display:none, rendering an empty frame");
        return RenderResult {
            success: true,
            width: viewport.0 as u32,
            height: viewport.1 as u32,
            pixels: vec![0; (viewport.0 as usize) * (viewport.1 as usize) * 4],
            page_title: metadata.page_title,
            favicon_url: metadata.favicon_url,
            forms,
            meta_refresh_delay: metadata.meta_refresh_delay,
            meta_refresh_url: metadata.meta_refresh_url,
            selection_color,
            selection_bg_color,
            ..RenderResult::default()
        };
    };

    let display_list = {
        let _span = tracing::info_span!("page.paint").entered();
        paint::build_display_list(&doc, &root_box, &config.toggled_details)
    };
    let width = viewport.0 as u32;
    let height = viewport.1 as u32;

    if let Err(violation) = display_list.validate() {
        log::warn!("display list failed balance validation: {violation}");
        return RenderResult::failure(width, height, violation.to_string());
    }

    let buffer = {
        let _span = tracing::info_span!("page.rasterize").entered();
        match raster::rasterize(&display_list, width, height, config.glyph_renderer) {
            Ok(buffer) => buffer,
            Err(violation) => {
                log::warn!("rasterization failed: {violation}");
                return RenderResult::failure(width, height, violation.to_string());
            }
        }
    };

    let mut id_positions = HashMap::new();
    collect_id_positions(&doc, &root_box, &mut id_positions);

    let sticky_elements = sticky_elements(sticky, &buffer);

    RenderResult {
        success: true,
        error: None,
        pixels: buffer.pixels.clone(),
        width,
        height,
        page_title: metadata.page_title,
        favicon_url: metadata.favicon_url,
        links: display_list.links,
        cursor_regions: display_list.cursor_regions,
        text_commands: display_list.text_commands,
        form_submit_regions: display_list.form_submit_regions,
        details_toggle_regions: display_list.details_toggle_regions,
        select_click_regions: display_list.select_click_regions,
        element_regions: display_list.element_regions,
        forms,
        id_positions,
        meta_refresh_delay: metadata.meta_refresh_delay,
        meta_refresh_url: metadata.meta_refresh_url,
        selection_color,
        selection_bg_color,
        sticky_elements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_simple_document_and_reports_its_title() {
        let config = RenderConfig::new("https://example.com", 800.0, 600.0);
        let result = render_html("<html><head><title>Hi</title></head><body><p>hello</p></body></html>", &config);
        assert!(result.success);
        assert_eq!(result.page_title, "Hi");
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);
        assert_eq!(result.pixels.len(), 800 * 600 * 4);
    }

    #[test]
    fn display_none_root_renders_an_empty_transparent_frame() {
        let config = RenderConfig::new("https://example.com", 100.0, 50.0);
        let result = render_html("<html style=\"display:none\"><body>hi</body></html>", &config);
        assert!(result.success);
        assert_eq!(result.pixels.len(), 100 * 50 * 4);
        assert!(result.pixels.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn extracts_forms_alongside_the_rendered_frame() {
        let config = RenderConfig::new("https://example.com", 400.0, 300.0);
        let result = render_html(r#"<form action="/go"><input name="q" value="hi"></form>"#, &config);
        assert_eq!(result.forms.len(), 1);
        assert_eq!(result.forms[0].action, "/go");
    }

    #[test]
    fn id_positions_tracks_elements_with_an_id_attribute() {
        let config = RenderConfig::new("https://example.com", 400.0, 300.0);
        let result = render_html(r#"<div><p id="target">hello</p></div>"#, &config);
        assert!(result.id_positions.contains_key("target"));
    }

    #[test]
    fn selection_colors_resolve_from_inline_style_sheets() {
        let config = RenderConfig::new("https://example.com", 400.0, 300.0);
        let result = render_html("<style>::selection { color: white; background-color: blue }</style><p>hi</p>", &config);
        assert_eq!(result.selection_color, browser_core::Color::parse("white"));
        assert_eq!(result.selection_bg_color, browser_core::Color::parse("blue"));
    }

    #[test]
    fn meta_refresh_is_reported_on_the_result() {
        let config = RenderConfig::new("https://example.com", 400.0, 300.0);
        let result = render_html(r#"<meta http-equiv="refresh" content="5; url=https://example.com/next">"#, &config);
        assert_eq!(result.meta_refresh_delay, Some(5.0));
        assert_eq!(result.meta_refresh_url.as_deref(), Some("https://example.com/next"));
    }
}
