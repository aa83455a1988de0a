//! Hit-testing and distance math for shapes.
//!
//! Everything here is a pure function of its arguments.

use crate::shapes::{Shape, ShapeKind};
use kurbo::Point;

/// Maximum perpendicular distance (in pixels) for a point to hit a line.
pub const LINE_HIT_TOLERANCE: f64 = 5.0;

/// Side length of the square resize handle anchored at a shape's `end`.
pub const RESIZE_HANDLE_SIZE: f64 = 10.0;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Perpendicular distance from `point` to the infinite line through `a` and `b`.
///
/// Returns `None` when `a == b` since the line has no direction.
pub fn line_distance(point: Point, a: Point, b: Point) -> Option<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return None;
    }
    let cross = dy * point.x - dx * point.y + b.x * a.y - b.y * a.x;
    Some(cross.abs() / len)
}

/// Check if a point lies inside (or on) a shape.
///
/// Lines test against the infinite line through their endpoints, so a point
/// beyond either endpoint but close to the extension still hits.
pub fn contains(point: Point, shape: &Shape) -> bool {
    let (start, end) = (shape.start, shape.end);
    match shape.kind() {
        ShapeKind::Rectangle => {
            point.x >= start.x.min(end.x)
                && point.x <= start.x.max(end.x)
                && point.y >= start.y.min(end.y)
                && point.y <= start.y.max(end.y)
        }
        ShapeKind::Circle => {
            let r_sq = (end - start).hypot2();
            (point - start).hypot2() <= r_sq
        }
        ShapeKind::Line => line_distance(point, start, end)
            .is_some_and(|dist| dist <= LINE_HIT_TOLERANCE),
    }
}

/// Check if a point is on the resize handle, the square `[end - 10, end]`.
pub fn on_resize_handle(point: Point, shape: &Shape) -> bool {
    let end = shape.end;
    point.x >= end.x - RESIZE_HANDLE_SIZE
        && point.x <= end.x
        && point.y >= end.y - RESIZE_HANDLE_SIZE
        && point.y <= end.y
}

/// Find the shape under a point.
///
/// Shapes are scanned in paint order and the *first* match wins, so an
/// earlier shape shadows later ones drawn on top of it.
// NOTE: this picks the bottom-most shape. Kept for compatibility with stored
// drawings; revisit together with product before changing.
pub fn hit_test<'a, I>(shapes: I, point: Point) -> Option<usize>
where
    I: IntoIterator<Item = &'a Shape>,
{
    shapes.into_iter().position(|shape| contains(point, shape))
}
