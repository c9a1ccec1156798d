//! `ApplyFilter`/`ApplyBackdropFilter` (an approximate box blur of already-painted
//! pixels) and the `mix-blend-mode` formulas `ApplyBlendMode` composites a subtree's
//! content against its saved backdrop with (§4.7, §7.3).

use browser_core::{Color, Rect};
use paint::BlendMode;

use crate::buffer::PixelBuffer;

/// Box-blur the pixels within `region` in place, using `blur_radius` (pixels) as the
/// sampling half-width. A `blur_radius` of zero is a no-op, which is also how the
/// painter's bracket convention resets a filter once a subtree finishes (§7.3's note
/// that this implementation has no dedicated "pop" variant for filter commands).
pub fn box_blur(buffer: &mut PixelBuffer, region: Rect, blur_radius: f32) {
    let radius = blur_radius.round() as i32;
    if radius <= 0 {
        return;
    }
    let x0 = region.x.floor().max(0.0) as i32;
    let y0 = region.y.floor().max(0.0) as i32;
    let x1 = region.right().ceil().min(buffer.width as f32) as i32;
    let y1 = region.bottom().ceil().min(buffer.height as f32) as i32;
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let source = buffer.clone();
    for y in y0..y1 {
        for x in x0..x1 {
            let mut r_sum = 0u32;
            let mut g_sum = 0u32;
            let mut b_sum = 0u32;
            let mut a_sum = 0u32;
            let mut count = 0u32;
            for sample_y in (y - radius)..=(y + radius) {
                for sample_x in (x - radius)..=(x + radius) {
                    let sample = source.get(sample_x, sample_y);
                    r_sum += u32::from(sample.r);
                    g_sum += u32::from(sample.g);
                    b_sum += u32::from(sample.b);
                    a_sum += u32::from(sample.a);
                    count += 1;
                }
            }
            if count == 0 {
                continue;
            }
            buffer.set(
                x,
                y,
                Color {
                    r: (r_sum / count) as u8,
                    g: (g_sum / count) as u8,
                    b: (b_sum / count) as u8,
                    a: (a_sum / count) as u8,
                },
            );
        }
    }
}

fn blend_channel(mode: BlendMode, backdrop: f32, source: f32) -> f32 {
    match mode {
        BlendMode::Normal => source,
        BlendMode::Multiply => backdrop * source,
        BlendMode::Screen => backdrop + source - backdrop * source,
        BlendMode::Overlay => {
            if backdrop <= 0.5 {
                2.0 * backdrop * source
            } else {
                1.0 - 2.0 * (1.0 - backdrop) * (1.0 - source)
            }
        }
        BlendMode::Darken => backdrop.min(source),
        BlendMode::Lighten => backdrop.max(source),
        BlendMode::Difference => (backdrop - source).abs(),
        BlendMode::Exclusion => backdrop + source - 2.0 * backdrop * source,
    }
}

/// Recompose `region` by blending the pixels painted since `backdrop` was snapshotted
/// against `backdrop` itself, using `mode`'s per-channel formula. The drawn layer's
/// own alpha still governs how much of the blended result shows through, so a fully
/// transparent brush stroke leaves the backdrop untouched.
pub fn apply_blend_mode(buffer: &mut PixelBuffer, backdrop: &PixelBuffer, region: Rect, mode: BlendMode) {
    let x0 = region.x.floor().max(0.0) as i32;
    let y0 = region.y.floor().max(0.0) as i32;
    let x1 = region.right().ceil().min(buffer.width as f32) as i32;
    let y1 = region.bottom().ceil().min(buffer.height as f32) as i32;

    for y in y0..y1 {
        for x in x0..x1 {
            let current = buffer.get(x, y);
            let under = backdrop.get(x, y);
            let source_alpha = current.alpha_fraction();
            let blend = |current: u8, under: u8| -> u8 {
                let blended = blend_channel(mode, f32::from(under) / 255.0, f32::from(current) / 255.0);
                let mixed = blended * source_alpha + (f32::from(under) / 255.0) * (1.0 - source_alpha);
                (mixed * 255.0).round().clamp(0.0, 255.0) as u8
            };
            buffer.set(
                x,
                y,
                Color {
                    r: blend(current.r, under.r),
                    g: blend(current.g, under.g),
                    b: blend(current.b, under.b),
                    a: (source_alpha * 255.0 + under.alpha_fraction() * 255.0 * (1.0 - source_alpha)).round().clamp(0.0, 255.0) as u8,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_blur_is_a_no_op() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.set(1, 1, Color::rgb(200, 0, 0));
        box_blur(&mut buffer, Rect::new(0.0, 0.0, 4.0, 4.0), 0.0);
        assert_eq!(buffer.get(1, 1), Color::rgb(200, 0, 0));
    }

    #[test]
    fn blur_spreads_a_solid_pixel_into_its_neighbors() {
        let mut buffer = PixelBuffer::new(5, 5);
        buffer.set(2, 2, Color::rgb(255, 255, 255));
        box_blur(&mut buffer, Rect::new(0.0, 0.0, 5.0, 5.0), 1.0);
        let neighbor = buffer.get(1, 2);
        assert!(neighbor.r > 0 && neighbor.r < 255);
    }

    #[test]
    fn multiply_blend_darkens_toward_black() {
        let mut buffer = PixelBuffer::new(1, 1);
        buffer.set(0, 0, Color::rgb(200, 200, 200));
        let mut backdrop = PixelBuffer::new(1, 1);
        backdrop.set(0, 0, Color::rgb(100, 100, 100));
        apply_blend_mode(&mut buffer, &backdrop, Rect::new(0.0, 0.0, 1.0, 1.0), BlendMode::Multiply);
        let result = buffer.get(0, 0);
        assert!(result.r < 200);
    }
}
