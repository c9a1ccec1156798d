//! The software rasterizer (§4.7): walks a validated `DisplayList` into an RGBA
//! `PixelBuffer`. It maintains a clip stack and a transform stack in lockstep with
//! the painter's `PushClip`/`PushTransform` pairs, an active-clip-path stack scoped
//! by the `PushClip`/`PopClip` pair the painter always brackets `ApplyClipPath`
//! with, and a stack of saved backdrop snapshots for `mix-blend-mode`.
//!
//! Every write goes through `current_transform.apply`; every read back for coverage
//! testing goes through `apply_inverse`, per §4.7.

use browser_core::{AffineTransform, Color, InvariantViolation, Rect};
use paint::{DisplayList, PaintCommand};

use crate::buffer::PixelBuffer;
use crate::filter::{apply_blend_mode, box_blur};
use crate::gradient::sample_gradient;
use crate::shapes::{box_shadow_coverage, clip_path_coverage, ellipse_coverage, line_coverage, rounded_rect_coverage};
use crate::text::{draw_fallback_text, GlyphRenderer, GlyphRequest};

/// A placeholder fill for `DrawImage`: this pipeline receives an image's source URL,
/// not its decoded pixels (decoding is a collaborator's job, completed before the
/// render starts per §5), so an image box paints as a neutral swatch rather than
/// nothing, matching the "missing collaborator" fallback convention in §7.
const IMAGE_PLACEHOLDER: Color = Color { r: 222, g: 222, b: 222, a: 255 };

struct Rasterizer<'a> {
    buffer: PixelBuffer,
    clip_stack: Vec<Rect>,
    clip_path_stack: Vec<Option<paint::ClipShape>>,
    transform_stack: Vec<AffineTransform>,
    backdrop_stack: Vec<PixelBuffer>,
    glyph_renderer: Option<GlyphRenderer<'a>>,
}

impl<'a> Rasterizer<'a> {
    fn new(width: u32, height: u32, glyph_renderer: Option<GlyphRenderer<'a>>) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height),
            clip_stack: vec![Rect::new(0.0, 0.0, width as f32, height as f32)],
            clip_path_stack: vec![None],
            transform_stack: vec![AffineTransform::IDENTITY],
            backdrop_stack: Vec::new(),
            glyph_renderer,
        }
    }

    /// `clip_stack`/`transform_stack` always carry the viewport-sized/identity base
    /// entry pushed by `new` and `PopClip`/`PopTransform` never pop below it, so the
    /// fallback here is unreachable in practice rather than a real default.
    fn current_clip(&self) -> Rect {
        self.clip_stack.last().copied().unwrap_or(Rect::new(0.0, 0.0, self.buffer.width as f32, self.buffer.height as f32))
    }

    fn current_transform(&self) -> AffineTransform {
        self.transform_stack.last().copied().unwrap_or(AffineTransform::IDENTITY)
    }

    fn active_clip_path_coverage(&self, local_x: f32, local_y: f32) -> f32 {
        self.clip_path_stack.iter().flatten().map(|shape| clip_path_coverage(shape, local_x, local_y)).fold(1.0, f32::min)
    }

    /// Device-space bounding box of `rect`'s four corners under the current
    /// transform, intersected with the active clip.
    fn device_bounds(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let transform = self.current_transform();
        let corners = [
            transform.apply(rect.x, rect.y),
            transform.apply(rect.right(), rect.y),
            transform.apply(rect.x, rect.bottom()),
            transform.apply(rect.right(), rect.bottom()),
        ];
        let min_x = corners.iter().map(|(x, _)| *x).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|(x, _)| *x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|(_, y)| *y).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|(_, y)| *y).fold(f32::NEG_INFINITY, f32::max);
        let bounds = Rect::new(min_x, min_y, (max_x - min_x).max(0.0), (max_y - min_y).max(0.0)).intersect(&self.current_clip());
        (bounds.x.floor() as i32, bounds.y.floor() as i32, bounds.right().ceil() as i32, bounds.bottom().ceil() as i32)
    }

    /// Walk the device pixels `iterate_rect` occupies, handing each one's
    /// inverse-mapped local coordinates to `coverage`, and blend `color` weighted
    /// by `coverage(..) * (active clip-path coverage)`.
    fn fill_with(&mut self, iterate_rect: Rect, color: Color, coverage: impl Fn(f32, f32) -> f32) {
        let (x0, y0, x1, y1) = self.device_bounds(iterate_rect);
        let transform = self.current_transform();
        for device_y in y0..y1 {
            for device_x in x0..x1 {
                let (local_x, local_y) = transform.apply_inverse(device_x as f32 + 0.5, device_y as f32 + 0.5);
                let weight = coverage(local_x, local_y) * self.active_clip_path_coverage(local_x, local_y);
                if weight <= 0.0 {
                    continue;
                }
                self.buffer.blend(device_x, device_y, color, weight);
            }
        }
    }

    fn dispatch(&mut self, command: &PaintCommand) {
        match command {
            PaintCommand::FillRect { rect, color, corner_radius } => {
                let rect = *rect;
                let radius = *corner_radius;
                self.fill_with(rect, *color, move |x, y| rounded_rect_coverage(x - rect.x, y - rect.y, rect.width, rect.height, radius));
            }
            PaintCommand::FillGradient { rect, gradient } => {
                let rect = *rect;
                self.fill_gradient(rect, gradient);
            }
            PaintCommand::FillBoxShadow { rect, shadow } => self.fill_box_shadow(*rect, shadow),
            PaintCommand::DrawText { origin, text, font_size, font_family, font_weight, italic, letter_spacing, color } => {
                self.draw_text(*origin, text, *font_size, font_family, *font_weight, *italic, *letter_spacing, *color);
            }
            PaintCommand::DrawBorder { rect, widths, color, corner_radius } => self.draw_border(*rect, *widths, *color, *corner_radius),
            PaintCommand::DrawImage { rect, src } => {
                log::debug!("painting placeholder swatch for undecoded image {src}");
                self.fill_with(*rect, IMAGE_PLACEHOLDER, |_, _| 1.0);
            }
            PaintCommand::DrawEllipse { rect, color } => {
                let rect = *rect;
                self.fill_with(rect, *color, move |x, y| ellipse_coverage(x - rect.x, y - rect.y, rect.width, rect.height));
            }
            PaintCommand::DrawLine { from, to, color, width } => self.draw_line(*from, *to, *color, *width),
            PaintCommand::PushClip { rect } => {
                let (x0, y0, x1, y1) = self.device_bounds(*rect);
                self.clip_stack.push(Rect::new(x0 as f32, y0 as f32, (x1 - x0).max(0) as f32, (y1 - y0).max(0) as f32));
                self.clip_path_stack.push(None);
            }
            PaintCommand::PopClip => {
                if self.clip_stack.len() > 1 {
                    self.clip_stack.pop();
                    self.clip_path_stack.pop();
                }
            }
            PaintCommand::PushTransform { transform } => {
                let composed = self.current_transform().then(transform);
                self.transform_stack.push(composed);
            }
            PaintCommand::PopTransform => {
                if self.transform_stack.len() > 1 {
                    self.transform_stack.pop();
                }
            }
            PaintCommand::ApplyFilter { blur_radius } | PaintCommand::ApplyBackdropFilter { blur_radius } => {
                box_blur(&mut self.buffer, self.current_clip(), *blur_radius);
            }
            PaintCommand::ApplyClipPath { shape } => {
                if let Some(slot) = self.clip_path_stack.last_mut() {
                    *slot = Some(shape.clone());
                }
            }
            PaintCommand::SaveBackdrop => self.backdrop_stack.push(self.buffer.clone()),
            PaintCommand::ApplyBlendMode { mode } => {
                if let Some(backdrop) = self.backdrop_stack.pop() {
                    apply_blend_mode(&mut self.buffer, &backdrop, self.current_clip(), *mode);
                }
            }
            PaintCommand::ApplyMaskGradient { rect, gradient } => self.apply_mask_gradient(*rect, gradient),
        }
    }

    fn fill_gradient(&mut self, rect: Rect, gradient: &css::computed::Gradient) {
        let (x0, y0, x1, y1) = self.device_bounds(rect);
        let transform = self.current_transform();
        for device_y in y0..y1 {
            for device_x in x0..x1 {
                let (local_x, local_y) = transform.apply_inverse(device_x as f32 + 0.5, device_y as f32 + 0.5);
                if !rect.contains(local_x, local_y) {
                    continue;
                }
                let coverage = self.active_clip_path_coverage(local_x, local_y);
                if coverage <= 0.0 {
                    continue;
                }
                let sample = sample_gradient(gradient, rect, local_x, local_y);
                self.buffer.blend(device_x, device_y, sample, coverage);
            }
        }
    }

    fn fill_box_shadow(&mut self, rect: Rect, shadow: &css::computed::BoxShadow) {
        let shadow_rect = Rect::new(
            rect.x + shadow.offset_x - shadow.spread_radius,
            rect.y + shadow.offset_y - shadow.spread_radius,
            rect.width + shadow.spread_radius * 2.0,
            rect.height + shadow.spread_radius * 2.0,
        );
        let blur = shadow.blur_radius;
        let inset = shadow.inset;
        let iterate_rect = if inset {
            shadow_rect
        } else {
            Rect::new(shadow_rect.x - blur, shadow_rect.y - blur, shadow_rect.width + blur * 2.0, shadow_rect.height + blur * 2.0)
        };
        self.fill_with(iterate_rect, shadow.color, move |x, y| {
            box_shadow_coverage(x - shadow_rect.x, y - shadow_rect.y, shadow_rect.width, shadow_rect.height, blur, inset)
        });
    }

    #[allow(clippy::too_many_arguments, reason = "mirrors the DrawText command's own field list one-for-one")]
    fn draw_text(&mut self, origin: (f32, f32), text: &str, font_size: f32, font_family: &str, font_weight: u16, italic: bool, letter_spacing: f32, color: Color) {
        let (device_x, device_y) = self.current_transform().apply(origin.0, origin.1);
        let request = GlyphRequest {
            origin: (device_x, device_y),
            text,
            font_size,
            font_family,
            font_weight,
            italic,
            letter_spacing,
            color,
            clip: self.current_clip(),
        };
        match self.glyph_renderer {
            Some(renderer) => renderer(&mut self.buffer, request),
            None => draw_fallback_text(&mut self.buffer, request),
        }
    }

    fn draw_border(&mut self, rect: Rect, widths: browser_core::EdgeSizes, color: Color, corner_radius: f32) {
        let inner_w = (rect.width - widths.horizontal()).max(0.0);
        let inner_h = (rect.height - widths.vertical()).max(0.0);
        let inner_radius = (corner_radius - widths.top.min(widths.left)).max(0.0);
        self.fill_with(rect, color, move |x, y| {
            let outer = rounded_rect_coverage(x - rect.x, y - rect.y, rect.width, rect.height, corner_radius);
            if outer <= 0.0 {
                return 0.0;
            }
            if inner_w <= 0.0 || inner_h <= 0.0 {
                return outer;
            }
            let inner = rounded_rect_coverage(x - rect.x - widths.left, y - rect.y - widths.top, inner_w, inner_h, inner_radius);
            outer * (1.0 - inner)
        });
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        let half = (width / 2.0).max(0.5);
        let iterate_rect = Rect::new(
            from.0.min(to.0) - half,
            from.1.min(to.1) - half,
            (from.0 - to.0).abs() + half * 2.0,
            (from.1 - to.1).abs() + half * 2.0,
        );
        self.fill_with(iterate_rect, color, move |x, y| line_coverage(x, y, from.0, from.1, to.0, to.1, width));
    }

    fn apply_mask_gradient(&mut self, rect: Rect, gradient: &css::computed::Gradient) {
        let (x0, y0, x1, y1) = self.device_bounds(rect);
        let transform = self.current_transform();
        for device_y in y0..y1 {
            for device_x in x0..x1 {
                let (local_x, local_y) = transform.apply_inverse(device_x as f32 + 0.5, device_y as f32 + 0.5);
                if !rect.contains(local_x, local_y) {
                    continue;
                }
                let mask = sample_gradient(gradient, rect, local_x, local_y).alpha_fraction();
                let existing = self.buffer.get(device_x, device_y);
                self.buffer.set(device_x, device_y, Color { a: (f32::from(existing.a) * mask).round().clamp(0.0, 255.0) as u8, ..existing });
            }
        }
    }
}

/// Rasterize `list` into a `width` x `height` RGBA buffer. `glyph_renderer` is the
/// platform font bridge `DrawText` delegates to; `None` falls back to block glyphs.
/// Fails only if the display list itself is unbalanced (§7's invariant-violation
/// class) — the rasterizer never fails on the content it's asked to draw.
pub fn rasterize(list: &DisplayList, width: u32, height: u32, glyph_renderer: Option<GlyphRenderer<'_>>) -> Result<PixelBuffer, InvariantViolation> {
    list.validate()?;
    let mut rasterizer = Rasterizer::new(width, height, glyph_renderer);
    for command in &list.commands {
        rasterizer.dispatch(command);
    }
    Ok(rasterizer.buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_core::{AffineTransform, EdgeSizes};
    use paint::{BlendMode, ClipShape};

    #[test]
    fn fill_rect_paints_inside_and_leaves_outside_untouched() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::FillRect { rect: Rect::new(2.0, 2.0, 4.0, 4.0), color: Color::BLACK, corner_radius: 0.0 });
        let buffer = rasterize(&list, 8, 8, None).unwrap();
        assert_eq!(buffer.get(3, 3), Color::BLACK);
        assert_eq!(buffer.get(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn push_clip_confines_a_fill_to_the_clip_rect() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::PushClip { rect: Rect::new(0.0, 0.0, 4.0, 8.0) });
        list.push(PaintCommand::FillRect { rect: Rect::new(0.0, 0.0, 8.0, 8.0), color: Color::BLACK, corner_radius: 0.0 });
        list.push(PaintCommand::PopClip);
        let buffer = rasterize(&list, 8, 8, None).unwrap();
        assert_eq!(buffer.get(1, 1), Color::BLACK);
        assert_eq!(buffer.get(6, 1), Color::TRANSPARENT);
    }

    #[test]
    fn push_transform_translates_subsequent_fills() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::PushTransform { transform: AffineTransform::translation(4.0, 0.0) });
        list.push(PaintCommand::FillRect { rect: Rect::new(0.0, 0.0, 2.0, 2.0), color: Color::BLACK, corner_radius: 0.0 });
        list.push(PaintCommand::PopTransform);
        let buffer = rasterize(&list, 8, 8, None).unwrap();
        assert_eq!(buffer.get(5, 1), Color::BLACK);
        assert_eq!(buffer.get(1, 1), Color::TRANSPARENT);
    }

    #[test]
    fn unbalanced_display_list_fails_before_any_pixel_is_touched() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::PushClip { rect: Rect::new(0.0, 0.0, 4.0, 4.0) });
        assert!(rasterize(&list, 4, 4, None).is_err());
    }

    #[test]
    fn clip_path_mask_excludes_points_outside_the_shape() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::PushClip { rect: Rect::new(0.0, 0.0, 10.0, 10.0) });
        list.push(PaintCommand::ApplyClipPath { shape: ClipShape::Circle { cx: 5.0, cy: 5.0, radius: 3.0 } });
        list.push(PaintCommand::FillRect { rect: Rect::new(0.0, 0.0, 10.0, 10.0), color: Color::BLACK, corner_radius: 0.0 });
        list.push(PaintCommand::PopClip);
        let buffer = rasterize(&list, 10, 10, None).unwrap();
        assert_eq!(buffer.get(5, 5), Color::BLACK);
        assert_eq!(buffer.get(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn save_backdrop_and_blend_mode_bracket_darkens_with_multiply() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::FillRect { rect: Rect::new(0.0, 0.0, 4.0, 4.0), color: Color::rgb(200, 200, 200), corner_radius: 0.0 });
        list.push(PaintCommand::SaveBackdrop);
        list.push(PaintCommand::FillRect { rect: Rect::new(0.0, 0.0, 4.0, 4.0), color: Color::rgb(100, 100, 100), corner_radius: 0.0 });
        list.push(PaintCommand::ApplyBlendMode { mode: BlendMode::Multiply });
        let buffer = rasterize(&list, 4, 4, None).unwrap();
        assert!(buffer.get(1, 1).r < 100);
    }

    #[test]
    fn draw_border_leaves_the_interior_untouched() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::DrawBorder { rect: Rect::new(0.0, 0.0, 10.0, 10.0), widths: EdgeSizes::uniform(2.0), color: Color::BLACK, corner_radius: 0.0 });
        let buffer = rasterize(&list, 10, 10, None).unwrap();
        assert_eq!(buffer.get(1, 1), Color::BLACK);
        assert_eq!(buffer.get(5, 5), Color::TRANSPARENT);
    }

    #[test]
    fn fallback_glyph_renderer_draws_when_none_is_supplied() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::DrawText {
            origin: (0.0, 0.0),
            text: "A".to_owned(),
            font_size: 16.0,
            font_family: "sans-serif".to_owned(),
            font_weight: 400,
            italic: false,
            letter_spacing: 0.0,
            color: Color::BLACK,
        });
        let buffer = rasterize(&list, 20, 20, None).unwrap();
        assert!(buffer.pixels.iter().any(|&byte| byte != 0));
    }
}
