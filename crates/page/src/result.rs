//! `RenderResult`: everything `render_html` hands back to the shell -- the pixel
//! buffer, page metadata, every side-band hit-test region list, and the few
//! compositing hints (`sticky_elements`) the shell can't derive on its own.

use std::collections::HashMap;

use browser_core::Color;
use paint::{CursorRegion, DetailsToggleRegion, ElementRegion, FormSubmitRegion, LinkRegion, SelectClickRegion, TextCommand};

use crate::forms::FormInfo;

/// One `position: sticky` element's scroll-compositing data. `pixel_snapshot` is a
/// cropped RGBA copy of the element's border box at render time, `4 * height * width`
/// bytes wide where `width` is implied by the element's rendered width; the shell
/// blits it back during scroll instead of re-running the whole pipeline per frame.
#[derive(Debug, Clone)]
pub struct StickyElement {
    pub abs_y: f32,
    pub width: f32,
    pub height: f32,
    pub top_offset: Option<f32>,
    pub container_top: f32,
    pub container_bottom: f32,
    pub pixel_snapshot: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderResult {
    pub success: bool,
    pub error: Option<String>,

    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,

    pub page_title: String,
    pub favicon_url: String,

    pub links: Vec<LinkRegion>,
    pub cursor_regions: Vec<CursorRegion>,
    pub text_commands: Vec<TextCommand>,
    pub form_submit_regions: Vec<FormSubmitRegion>,
    pub details_toggle_regions: Vec<DetailsToggleRegion>,
    pub select_click_regions: Vec<SelectClickRegion>,
    pub element_regions: Vec<ElementRegion>,

    pub forms: Vec<FormInfo>,
    pub id_positions: HashMap<String, f32>,

    pub meta_refresh_delay: Option<f32>,
    pub meta_refresh_url: Option<String>,

    pub selection_color: Option<Color>,
    pub selection_bg_color: Option<Color>,

    pub sticky_elements: Vec<StickyElement>,
}

impl RenderResult {
    /// A failed-render result: the shell is expected to build its own error UI from
    /// `error`, since the core does not render one.
    pub fn failure(width: u32, height: u32, error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), width, height, ..Self::default() }
    }
}
