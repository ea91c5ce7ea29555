//! Geometry helpers: grid snapping, component bounds, and wire paths.
//!
//! All functions work in world coordinates with y growing downward.

use circuitlab_core::{Point, Rotation, Size};

/// Number of straight segments a rendered wire curve is flattened into.
pub const WIRE_PATH_SEGMENTS: usize = 16;

/// Snaps a single coordinate to the nearest multiple of `pitch`.
///
/// A non-positive pitch disables snapping.
pub fn snap_to_grid(value: f64, pitch: f64) -> f64 {
    if pitch <= 0.0 || !pitch.is_finite() {
        return value;
    }
    let snapped = (value / pitch).round() * pitch;
    // Keep -0.0 out of positions so snapshots compare equal.
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}

/// Snaps both coordinates of a point to the grid.
pub fn snap_point(point: Point, pitch: f64) -> Point {
    Point::new(snap_to_grid(point.x, pitch), snap_to_grid(point.y, pitch))
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Body box of a component centred on `center`. Quarter turns swap the
    /// width and height.
    pub fn around(center: Point, size: Size, rotation: Rotation) -> Self {
        let (w, h) = if rotation.is_quarter_turn() {
            (size.height, size.width)
        } else {
            (size.width, size.height)
        };
        Self::new(
            center.x - w / 2.0,
            center.y - h / 2.0,
            center.x + w / 2.0,
            center.y + h / 2.0,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Bézier control points of a rendered wire: the curve leaves each end
/// horizontally and bends at the midpoint x.
pub fn wire_control_points(start: Point, end: Point) -> (Point, Point) {
    let mid_x = (start.x + end.x) / 2.0;
    (Point::new(mid_x, start.y), Point::new(mid_x, end.y))
}

/// Flattened rendered path of a wire from `start` to `end`.
///
/// Returns `WIRE_PATH_SEGMENTS + 1` points; the first and last are exactly
/// `start` and `end`.
pub fn wire_path(start: Point, end: Point) -> Vec<Point> {
    let (c1, c2) = wire_control_points(start, end);
    (0..=WIRE_PATH_SEGMENTS)
        .map(|i| {
            if i == 0 {
                return start;
            }
            if i == WIRE_PATH_SEGMENTS {
                return end;
            }
            let t = i as f64 / WIRE_PATH_SEGMENTS as f64;
            let u = 1.0 - t;
            let a = u * u * u;
            let b = 3.0 * u * u * t;
            let c = 3.0 * u * t * t;
            let d = t * t * t;
            Point::new(
                a * start.x + b * c1.x + c * c2.x + d * end.x,
                a * start.y + b * c1.y + c * c2.y + d * end.y,
            )
        })
        .collect()
}

/// Minimum distance from `p` to a polyline.
pub fn distance_to_path(p: Point, path: &[Point]) -> f64 {
    match path {
        [] => f64::INFINITY,
        [only] => p.distance_to(only),
        _ => path
            .windows(2)
            .map(|seg| point_to_segment_distance(p, seg[0], seg[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
