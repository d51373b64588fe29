//! Geometry types shared by gestures and transforms

use std::ops::{Add, Sub};

/// 2D point or displacement
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length when used as a displacement
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(&self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Rectangular limits for a dragged value pair
///
/// Unbounded sides use infinities; `DragConstraints::default()` is fully
/// unconstrained.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragConstraints {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl DragConstraints {
    pub const UNBOUNDED: DragConstraints = DragConstraints {
        min_x: f32::NEG_INFINITY,
        max_x: f32::INFINITY,
        min_y: f32::NEG_INFINITY,
        max_y: f32::INFINITY,
    };

    pub const fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Symmetric box around the origin: `-half_width..=half_width` etc.
    pub const fn symmetric(half_width: f32, half_height: f32) -> Self {
        Self::new(-half_width, half_width, -half_height, half_height)
    }

    /// Limit only the horizontal axis
    pub const fn horizontal(min_x: f32, max_x: f32) -> Self {
        Self::new(min_x, max_x, f32::NEG_INFINITY, f32::INFINITY)
    }

    /// Limit only the vertical axis
    pub const fn vertical(min_y: f32, max_y: f32) -> Self {
        Self::new(f32::NEG_INFINITY, f32::INFINITY, min_y, max_y)
    }

    /// Hard clamp of a point into the rectangle. An inverted range pins to
    /// its max.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.max(self.min_x).min(self.max_x),
            point.y.max(self.min_y).min(self.max_y),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }
}

impl Default for DragConstraints {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a - Point::new(1.0, 1.0), Point::new(2.0, 3.0));
        assert_eq!(a + a, a.scale(2.0));
    }

    #[test]
    fn test_single_axis_constraints_leave_other_axis_free() {
        let c = DragConstraints::horizontal(-50.0, 50.0);
        let p = c.clamp(Point::new(80.0, 1_000.0));
        assert_eq!(p, Point::new(50.0, 1_000.0));
        assert!(!c.contains(Point::new(51.0, 0.0)));
    }
}
