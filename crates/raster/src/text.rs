//! `DrawText` dispatch (§4.7): delegates to an injected glyph renderer that rasterizes
//! through a platform font API; when the caller supplies none (the "missing
//! collaborator" case in the error-handling design), falls back to a block-glyph
//! renderer that sketches one filled rectangle per character so text is still visible
//! in outline.

use browser_core::{Color, Rect};

use crate::buffer::PixelBuffer;

/// One `DrawText` command's parameters, already resolved to absolute pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct GlyphRequest<'a> {
    pub origin: (f32, f32),
    pub text: &'a str,
    pub font_size: f32,
    pub font_family: &'a str,
    pub font_weight: u16,
    pub italic: bool,
    pub letter_spacing: f32,
    pub color: Color,
    pub clip: Rect,
}

/// A platform font API bridge. Takes the pixel buffer directly so it can blend glyph
/// coverage straight into the output rather than returning an intermediate mask.
pub type GlyphRenderer<'a> = &'a dyn Fn(&mut PixelBuffer, GlyphRequest<'_>);

/// The character-width heuristic from `layout::inline::fallback_measure` (`0.6em` per
/// character), reused here so the fallback glyph spacing matches what the layout pass
/// already assumed when it measured this text run.
fn fallback_advance(font_size: f32) -> f32 {
    font_size * 0.6
}

/// Sketch one solid block per non-whitespace character at roughly cap-height, so a
/// render without a real font backend still shows where text landed instead of
/// leaving blank space.
pub fn draw_fallback_text(buffer: &mut PixelBuffer, request: GlyphRequest<'_>) {
    let advance = fallback_advance(request.font_size) + request.letter_spacing;
    let glyph_height = request.font_size * 0.7;
    let glyph_width = (advance - 1.0).max(1.0);
    let baseline_y = request.origin.1 + request.font_size * 0.85;
    let top_y = baseline_y - glyph_height;

    for (index, ch) in request.text.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let glyph_x = request.origin.0 + index as f32 * advance;
        let glyph_rect = Rect::new(glyph_x, top_y, glyph_width, glyph_height).intersect(&request.clip);
        if glyph_rect.width <= 0.0 || glyph_rect.height <= 0.0 {
            continue;
        }
        let x0 = glyph_rect.x.floor() as i32;
        let y0 = glyph_rect.y.floor() as i32;
        let x1 = glyph_rect.right().ceil() as i32;
        let y1 = glyph_rect.bottom().ceil() as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                buffer.blend(x, y, request.color, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_text_leaves_whitespace_untouched() {
        let mut buffer = PixelBuffer::new(40, 20);
        let request = GlyphRequest {
            origin: (0.0, 0.0),
            text: "  ",
            font_size: 16.0,
            font_family: "sans-serif",
            font_weight: 400,
            italic: false,
            letter_spacing: 0.0,
            color: Color::BLACK,
            clip: Rect::new(0.0, 0.0, 40.0, 20.0),
        };
        draw_fallback_text(&mut buffer, request);
        assert!(buffer.pixels.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn fallback_text_paints_a_block_per_character() {
        let mut buffer = PixelBuffer::new(40, 20);
        let request = GlyphRequest {
            origin: (0.0, 0.0),
            text: "hi",
            font_size: 16.0,
            font_family: "sans-serif",
            font_weight: 400,
            italic: false,
            letter_spacing: 0.0,
            color: Color::BLACK,
            clip: Rect::new(0.0, 0.0, 40.0, 20.0),
        };
        draw_fallback_text(&mut buffer, request);
        assert!(buffer.pixels.iter().any(|&byte| byte != 0));
    }
}
