//! Shape definitions for the planner canvas.

use crate::geometry;
use kurbo::{Circle, Line, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier assigned by the persistence service.
pub type ShapeId = String;

/// The kind of an architectural primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Rectangle,
    Circle,
}

impl ShapeKind {
    /// Lowercase name used on the wire and in annotations.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown shape kind: {0}")]
pub struct UnknownShapeKind(pub String);

impl FromStr for ShapeKind {
    type Err = UnknownShapeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(ShapeKind::Line),
            "rectangle" => Ok(ShapeKind::Rectangle),
            "circle" => Ok(ShapeKind::Circle),
            other => Err(UnknownShapeKind(other.to_string())),
        }
    }
}

/// A line, rectangle or circle defined by two points.
///
/// - Line: segment from `start` to `end`.
/// - Rectangle: axis-aligned box with opposite corners `start` and `end`.
///   The corners are not normalized.
/// - Circle: centered on `start`, passing through `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Service-assigned id, `None` until the first save is acknowledged.
    pub id: Option<ShapeId>,
    kind: ShapeKind,
    pub start: Point,
    pub end: Point,
}

impl Shape {
    /// Create an unsaved shape.
    pub fn new(kind: ShapeKind, start: Point, end: Point) -> Self {
        Self {
            id: None,
            kind,
            start,
            end,
        }
    }

    /// Create a degenerate shape at a single point (the start of a draw gesture).
    pub fn at(kind: ShapeKind, point: Point) -> Self {
        Self::new(kind, point, point)
    }

    /// Attach a service id.
    pub fn with_id(mut self, id: impl Into<ShapeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Euclidean distance from `start` to `end`.
    ///
    /// This is the line length, the rectangle diagonal and the circle radius.
    pub fn length(&self) -> f64 {
        geometry::distance(self.start, self.end)
    }

    /// Radius when interpreted as a circle.
    pub fn radius(&self) -> f64 {
        self.length()
    }

    /// Signed extent `end - start`.
    pub fn extent(&self) -> Vec2 {
        self.end - self.start
    }

    /// Move the shape so that `start` lands on `new_start`, keeping its extent.
    pub fn move_start_to(&mut self, new_start: Point) {
        let extent = self.extent();
        self.start = new_start;
        self.end = new_start + extent;
    }

    /// Overwrite the `end` point, leaving `start` untouched.
    pub fn set_end(&mut self, end: Point) {
        self.end = end;
    }

    /// Whether both points have finite coordinates.
    pub fn is_finite(&self) -> bool {
        is_finite_point(self.start) && is_finite_point(self.end)
    }

    /// Normalized bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        match self.kind {
            ShapeKind::Line | ShapeKind::Rectangle => Rect::from_points(self.start, self.end),
            ShapeKind::Circle => {
                let r = self.radius();
                Rect::new(
                    self.start.x - r,
                    self.start.y - r,
                    self.start.x + r,
                    self.start.y + r,
                )
            }
        }
    }

    /// Outline geometry for stroking.
    pub fn outline(&self) -> Outline {
        match self.kind {
            ShapeKind::Line => Outline::Segment(Line::new(self.start, self.end)),
            ShapeKind::Rectangle => Outline::Rect(Rect::from_points(self.start, self.end)),
            ShapeKind::Circle => Outline::Circle(Circle::new(self.start, self.radius())),
        }
    }

    /// Annotation text, e.g. `line (100px)`.
    pub fn label(&self) -> String {
        format!("{} ({}px)", self.kind, self.length().round())
    }
}

/// Stroke geometry of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outline {
    Segment(Line),
    Rect(Rect),
    Circle(Circle),
}

/// Whether a point has finite coordinates.
pub fn is_finite_point(point: Point) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [ShapeKind::Line, ShapeKind::Rectangle, ShapeKind::Circle] {
            assert_eq!(kind.as_str().parse::<ShapeKind>(), Ok(kind));
        }
        assert!("ellipse".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn test_new_shape_has_no_id() {
        let shape = Shape::new(ShapeKind::Line, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!(shape.id.is_none());
        assert_eq!(shape.with_id("abc").id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_circle_radius() {
        let circle = Shape::new(ShapeKind::Circle, Point::new(50.0, 50.0), Point::new(50.0, 60.0));
        assert!((circle.radius() - 10.0).abs() < f64::EPSILON);
        let bounds = circle.bounds();
        assert!((bounds.x0 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_move_start_preserves_extent() {
        let mut rect = Shape::new(
            ShapeKind::Rectangle,
            Point::new(10.0, 20.0),
            Point::new(-30.0, 70.0),
        );
        rect.move_start_to(Point::new(100.0, 100.0));
        assert_eq!(rect.start, Point::new(100.0, 100.0));
        assert_eq!(rect.end, Point::new(60.0, 150.0));
    }

    #[test]
    fn test_rectangle_bounds_are_normalized() {
        let rect = Shape::new(
            ShapeKind::Rectangle,
            Point::new(100.0, 80.0),
            Point::new(20.0, 10.0),
        );
        assert_eq!(rect.bounds(), Rect::new(20.0, 10.0, 100.0, 80.0));
    }

    #[test]
    fn test_label_rounds_length() {
        let line = Shape::new(ShapeKind::Line, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(line.label(), "line (100px)");

        let diag = Shape::new(ShapeKind::Rectangle, Point::new(0.0, 0.0), Point::new(3.0, 3.0));
        assert_eq!(diag.label(), "rectangle (4px)");
    }

    #[test]
    fn test_is_finite() {
        let shape = Shape::new(ShapeKind::Line, Point::new(0.0, f64::NAN), Point::new(1.0, 1.0));
        assert!(!shape.is_finite());
    }
}
