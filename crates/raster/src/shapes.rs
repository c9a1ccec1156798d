//! Per-pixel coverage tests (§4.7): rounded-corner attenuation for `FillRect`, the
//! approximate-gaussian falloff for `FillBoxShadow`, and the shape masks `ApplyClipPath`
//! sets for `circle`/`ellipse`/`inset`/`polygon`.

use paint::ClipShape;

/// Signed distance from `(local_x, local_y)` to the axis-aligned box `(w, h)` whose
/// top-left corner is the origin; negative inside, positive outside, zero on the
/// boundary. The standard "box SDF" used for both rounded-corner and shadow falloff.
fn box_signed_distance(local_x: f32, local_y: f32, w: f32, h: f32) -> f32 {
    let dx = (local_x - w / 2.0).abs() - w / 2.0;
    let dy = (local_y - h / 2.0).abs() - h / 2.0;
    let outside = dx.max(0.0).hypot(dy.max(0.0));
    let inside = dx.max(dy).min(0.0);
    outside + inside
}

/// Coverage of a rounded rectangle at a point local to the rect's top-left corner.
/// Away from the corners this is a hard 0/1 edge; within `radius` of a corner it
/// attenuates over roughly one pixel for a cheap antialiased edge.
pub fn rounded_rect_coverage(local_x: f32, local_y: f32, w: f32, h: f32, radius: f32) -> f32 {
    let radius = radius.max(0.0).min(w.min(h) / 2.0);
    if radius <= 0.0 {
        return if (0.0..=w).contains(&local_x) && (0.0..=h).contains(&local_y) { 1.0 } else { 0.0 };
    }
    let in_corner_band = (local_x < radius || local_x > w - radius) && (local_y < radius || local_y > h - radius);
    if !in_corner_band {
        return if (0.0..=w).contains(&local_x) && (0.0..=h).contains(&local_y) { 1.0 } else { 0.0 };
    }
    let corner_x = if local_x < radius { radius } else { w - radius };
    let corner_y = if local_y < radius { radius } else { h - radius };
    let dist = (local_x - corner_x).hypot(local_y - corner_y);
    (radius - dist + 0.5).clamp(0.0, 1.0)
}

/// Coverage for a single `box-shadow` layer at a point local to the shadow rect's
/// top-left corner (the shadow rect already has offset and spread baked in).
/// `inset` shadows are bright near the edge and fade toward the center; outset
/// shadows are solid inside and fade outward over `blur_radius`.
pub fn box_shadow_coverage(local_x: f32, local_y: f32, w: f32, h: f32, blur_radius: f32, inset: bool) -> f32 {
    let distance = box_signed_distance(local_x, local_y, w, h);
    let blur_radius = blur_radius.max(1.0);
    if inset {
        if distance > 0.0 {
            return 0.0;
        }
        (1.0 + distance / blur_radius).clamp(0.0, 1.0)
    } else {
        (1.0 - distance / blur_radius).clamp(0.0, 1.0)
    }
}

/// Coverage of an axis-aligned ellipse inscribed in `(w, h)`, at a point local to
/// the bounding rect's top-left corner. Used by `DrawEllipse` (radio buttons, the
/// `<select>` arrow's circular affordances); antialiased the same way
/// `rounded_rect_coverage` is, over roughly one pixel at the boundary.
pub fn ellipse_coverage(local_x: f32, local_y: f32, w: f32, h: f32) -> f32 {
    let rx = (w / 2.0).max(f32::EPSILON);
    let ry = (h / 2.0).max(f32::EPSILON);
    let cx = w / 2.0;
    let cy = h / 2.0;
    let normalized = ((local_x - cx) / rx).powi(2) + ((local_y - cy) / ry).powi(2);
    let edge_softness = 1.0 / rx.min(ry).max(1.0);
    (1.0 - (normalized.sqrt() - 1.0) / edge_softness).clamp(0.0, 1.0)
}

/// Coverage of a stroked line segment at an absolute point, for `DrawLine` (form
/// control affordances, the `<select>` arrow). Soft-edged over roughly one pixel.
pub fn line_coverage(x: f32, y: f32, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let length_squared = dx * dx + dy * dy;
    let t = if length_squared > f32::EPSILON { (((x - x1) * dx + (y - y1) * dy) / length_squared).clamp(0.0, 1.0) } else { 0.0 };
    let closest_x = x1 + t * dx;
    let closest_y = y1 + t * dy;
    let distance = (x - closest_x).hypot(y - closest_y);
    (width / 2.0 - distance + 0.5).clamp(0.0, 1.0)
}

/// Coverage for the active `ApplyClipPath` shape at an absolute point, per §4.7's
/// "sets per-pixel coverage masks for circle, ellipse, inset, and polygon".
pub fn clip_path_coverage(shape: &ClipShape, x: f32, y: f32) -> f32 {
    match shape {
        ClipShape::Circle { cx, cy, radius } => {
            if (x - cx).hypot(y - cy) <= *radius {
                1.0
            } else {
                0.0
            }
        }
        ClipShape::Ellipse { cx, cy, rx, ry } => {
            let rx = rx.max(f32::EPSILON);
            let ry = ry.max(f32::EPSILON);
            let normalized = ((x - cx) / rx).powi(2) + ((y - cy) / ry).powi(2);
            if normalized <= 1.0 {
                1.0
            } else {
                0.0
            }
        }
        ClipShape::Inset { rect } => {
            if rect.contains(x, y) {
                1.0
            } else {
                0.0
            }
        }
        ClipShape::Polygon { points } => {
            if point_in_polygon(points, x, y) {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Even-odd ray-casting point-in-polygon test.
fn point_in_polygon(points: &[(f32, f32)], x: f32, y: f32) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) {
            let intersect_x = xi + (y - yi) / (yj - yi) * (xj - xi);
            if x < intersect_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_core::Rect;

    #[test]
    fn zero_radius_is_a_hard_edged_rect() {
        assert_eq!(rounded_rect_coverage(5.0, 5.0, 10.0, 10.0, 0.0), 1.0);
        assert_eq!(rounded_rect_coverage(-1.0, 5.0, 10.0, 10.0, 0.0), 0.0);
    }

    #[test]
    fn rounded_corner_fades_past_the_radius() {
        let full = rounded_rect_coverage(5.0, 5.0, 20.0, 20.0, 6.0);
        let corner = rounded_rect_coverage(0.2, 0.2, 20.0, 20.0, 6.0);
        assert_eq!(full, 1.0);
        assert!(corner < 1.0);
    }

    #[test]
    fn outset_shadow_is_solid_under_the_box_and_fades_outward() {
        let center = box_shadow_coverage(10.0, 10.0, 20.0, 20.0, 8.0, false);
        let far = box_shadow_coverage(-20.0, 10.0, 20.0, 20.0, 8.0, false);
        assert_eq!(center, 1.0);
        assert_eq!(far, 0.0);
    }

    #[test]
    fn inset_shadow_fades_toward_the_center() {
        let edge = box_shadow_coverage(0.5, 10.0, 20.0, 20.0, 8.0, true);
        let center = box_shadow_coverage(10.0, 10.0, 20.0, 20.0, 8.0, true);
        assert!(edge > center);
    }

    #[test]
    fn ellipse_coverage_is_solid_at_the_center_and_empty_at_the_corner() {
        assert_eq!(ellipse_coverage(10.0, 5.0, 20.0, 10.0), 1.0);
        assert_eq!(ellipse_coverage(0.0, 0.0, 20.0, 10.0), 0.0);
    }

    #[test]
    fn line_coverage_is_solid_on_the_segment_and_empty_far_away() {
        assert_eq!(line_coverage(5.0, 0.0, 0.0, 0.0, 10.0, 0.0, 2.0), 1.0);
        assert_eq!(line_coverage(5.0, 20.0, 0.0, 0.0, 10.0, 0.0, 2.0), 0.0);
    }

    #[test]
    fn polygon_coverage_matches_a_simple_triangle() {
        let triangle = ClipShape::Polygon { points: vec![(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)] };
        assert_eq!(clip_path_coverage(&triangle, 5.0, 2.0), 1.0);
        assert_eq!(clip_path_coverage(&triangle, 0.5, 9.0), 0.0);
    }

    #[test]
    fn inset_clip_path_matches_the_rect_bounds() {
        let shape = ClipShape::Inset { rect: Rect::new(2.0, 2.0, 6.0, 6.0) };
        assert_eq!(clip_path_coverage(&shape, 4.0, 4.0), 1.0);
        assert_eq!(clip_path_coverage(&shape, 0.0, 0.0), 0.0);
    }
}
