// small geometry helpers shared by genome construction, mutation and rendering

/// axis-aligned bounds of a point list as (min_x, min_y, max_x, max_y).
/// returns None for an empty list.
pub fn bounds(pts: &[(f32, f32)]) -> Option<(f32, f32, f32, f32)> {
    if pts.is_empty() {
        return None;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for &(x, y) in pts {
        if x < min_x { min_x = x; }
        if y < min_y { min_y = y; }
        if x > max_x { max_x = x; }
        if y > max_y { max_y = y; }
    }
    Some((min_x, min_y, max_x, max_y))
}

/// true when the bounds lie entirely outside a width x height canvas
#[inline]
pub fn outside_canvas(b: (f32, f32, f32, f32), width: f32, height: f32) -> bool {
    let (min_x, min_y, max_x, max_y) = b;
    max_x < 0.0 || max_y < 0.0 || min_x >= width || min_y >= height
}

/// clamp a point into [0, width] x [0, height]
#[inline]
pub fn clamp_point(p: (f32, f32), width: f32, height: f32) -> (f32, f32) {
    (p.0.clamp(0.0, width), p.1.clamp(0.0, height))
}

/// euclidean distance between two points
#[inline]
pub fn point_distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}
