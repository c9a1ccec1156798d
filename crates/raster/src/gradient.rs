//! Gradient sampling (§4.7): linear samples the position `t` along the angle vector,
//! radial by normalized radius, conic by normalized angle; all interpolate between
//! adjacent stops. Angle convention matches `css::cascade`'s `angle_from_side`: 0deg
//! points "to top", increasing clockwise.

use browser_core::{Color, Rect};
use css::computed::Gradient;

/// Interpolate between the stops bracketing `t` (already clamped to `[0, 1]`).
fn sample_stops(stops: &[(Color, f32)], t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let Some(first) = stops.first() else { return Color::TRANSPARENT };
    if stops.len() == 1 || t <= first.1 {
        return first.0;
    }
    let Some(last) = stops.last() else { return first.0 };
    if t >= last.1 {
        return last.0;
    }
    for window in stops.windows(2) {
        let [(start_color, start_pos), (end_color, end_pos)] = window else { continue };
        if t >= *start_pos && t <= *end_pos {
            let span = (end_pos - start_pos).max(f32::EPSILON);
            let local_t = (t - start_pos) / span;
            return lerp_color(*start_color, *end_color, local_t);
        }
    }
    last.0
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let lerp_channel = |from: u8, to: u8| -> u8 { (f32::from(from) + (f32::from(to) - f32::from(from)) * t).round().clamp(0.0, 255.0) as u8 };
    Color { r: lerp_channel(a.r, b.r), g: lerp_channel(a.g, b.g), b: lerp_channel(a.b, b.b), a: lerp_channel(a.a, b.a) }
}

/// Sample `gradient` at an absolute point `(x, y)` against the box it fills.
pub fn sample_gradient(gradient: &Gradient, rect: Rect, x: f32, y: f32) -> Color {
    let cx = rect.x + rect.width / 2.0;
    let cy = rect.y + rect.height / 2.0;
    match gradient {
        Gradient::Linear { angle_degrees, stops } => {
            let radians = angle_degrees.to_radians();
            let (dx, dy) = (radians.sin(), -radians.cos());
            let half_w = rect.width / 2.0;
            let half_h = rect.height / 2.0;
            let line_half_length = (half_w * dx).abs() + (half_h * dy).abs();
            let line_half_length = line_half_length.max(f32::EPSILON);
            let projection = (x - cx) * dx + (y - cy) * dy;
            let t = (projection / line_half_length + 1.0) / 2.0;
            sample_stops(stops, t)
        }
        Gradient::Radial { stops } => {
            let max_radius = (rect.width / 2.0).hypot(rect.height / 2.0).max(f32::EPSILON);
            let dist = (x - cx).hypot(y - cy);
            sample_stops(stops, dist / max_radius)
        }
        Gradient::Conic { stops } => {
            let angle = (x - cx).atan2(-(y - cy));
            let normalized = angle / (2.0 * std::f32::consts::PI);
            let t = if normalized < 0.0 { normalized + 1.0 } else { normalized };
            sample_stops(stops, t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_gradient_samples_first_stop_at_the_starting_edge() {
        let gradient = Gradient::Linear { angle_degrees: 180.0, stops: vec![(Color::BLACK, 0.0), (Color::WHITE, 1.0)] };
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let top = sample_gradient(&gradient, rect, 50.0, 0.0);
        let bottom = sample_gradient(&gradient, rect, 50.0, 100.0);
        assert_eq!(top, Color::BLACK);
        assert_eq!(bottom, Color::WHITE);
    }

    #[test]
    fn radial_gradient_centers_on_the_first_stop() {
        let gradient = Gradient::Radial { stops: vec![(Color::WHITE, 0.0), (Color::BLACK, 1.0)] };
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(sample_gradient(&gradient, rect, 50.0, 50.0), Color::WHITE);
    }

    #[test]
    fn single_stop_gradient_is_a_solid_fill() {
        let gradient = Gradient::Linear { angle_degrees: 0.0, stops: vec![(Color::rgb(10, 20, 30), 0.0)] };
        let rect = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert_eq!(sample_gradient(&gradient, rect, 1.0, 1.0), Color::rgb(10, 20, 30));
        assert_eq!(sample_gradient(&gradient, rect, 40.0, 40.0), Color::rgb(10, 20, 30));
    }
}
