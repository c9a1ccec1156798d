//! `RenderConfig`: the one configuration object this core exposes, since it is a
//! library with no file-based config of its own. It carries the viewport, dark-mode
//! flags, already-fetched author stylesheets, and the optional collaborator callbacks
//! -- text measurement and glyph rendering are external collaborators the core only
//! states a contract for.

use std::collections::HashSet;

use css::StyleSheet;
use html::NodeId;
use layout::MeasureText;
use raster::GlyphRenderer;

/// Runtime-state markers (`hover`, `focus`, `active`, `target`, ...) the shell injects
/// onto an element before a render, since the core has no event loop of its own.
/// Returns the marker names present on `node`; an empty `Vec` if none.
pub type MarkerLookup<'a> = dyn Fn(NodeId) -> Vec<String> + 'a;

fn no_markers(_node: NodeId) -> Vec<String> {
    Vec::new()
}

/// `-1` = auto (follow the platform), `0` = force light, `1` = force dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DarkModeOverride {
    Auto,
    Light,
    Dark,
}

impl DarkModeOverride {
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Auto => -1,
            Self::Light => 0,
            Self::Dark => 1,
        }
    }
}

/// Everything `render_html` needs beyond the HTML/CSS bytes themselves. Borrows its
/// callbacks rather than owning boxed trait objects, matching the lifetime shape
/// `layout::MeasureText`/`raster::GlyphRenderer` already use.
pub struct RenderConfig<'a> {
    pub base_url: String,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// `<details>` element ids the shell has toggled open since layout assigned
    /// their default state.
    pub toggled_details: HashSet<u32>,
    pub dark_mode_override: DarkModeOverride,
    /// The platform's own light/dark preference, consulted when `dark_mode_override`
    /// is `Auto`.
    pub system_dark_mode: bool,
    /// Author stylesheets already fetched and parsed for this document's
    /// `<link rel=stylesheet>` elements; `<style>` elements are parsed by
    /// `render_html` itself from the DOM, since they need no network collaborator.
    pub extra_stylesheets: Vec<StyleSheet>,
    pub measure_text: Option<MeasureText<'a>>,
    pub glyph_renderer: Option<GlyphRenderer<'a>>,
    pub markers: Option<&'a MarkerLookup<'a>>,
}

impl<'a> RenderConfig<'a> {
    pub fn new(base_url: impl Into<String>, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            base_url: base_url.into(),
            viewport_width,
            viewport_height,
            toggled_details: HashSet::new(),
            dark_mode_override: DarkModeOverride::Auto,
            system_dark_mode: false,
            extra_stylesheets: Vec::new(),
            measure_text: None,
            glyph_renderer: None,
            markers: None,
        }
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn marker_lookup(&self) -> &MarkerLookup<'a> {
        self.markers.unwrap_or(&no_markers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dark_mode_override_is_auto() {
        let config = RenderConfig::new("https://example.com", 800.0, 600.0);
        assert_eq!(config.dark_mode_override.as_i8(), -1);
    }

    #[test]
    fn marker_lookup_falls_back_to_no_markers() {
        let config = RenderConfig::new("https://example.com", 800.0, 600.0);
        let doc = html::tree_builder::parse_document("<div></div>");
        assert!(config.marker_lookup()(doc.root).is_empty());
    }
}
