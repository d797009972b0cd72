use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Position in layout-local pixels, top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }
}

/// Pointer displacement between two successive pointer samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delta {
    pub dx: i32,
    pub dy: i32,
}

impl Delta {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

impl Sub for Point {
    type Output = Delta;

    fn sub(self, rhs: Point) -> Delta {
        Delta::new(
            self.x.saturating_sub(rhs.x),
            self.y.saturating_sub(rhs.y),
        )
    }
}

impl Add<Delta> for Point {
    type Output = Point;

    fn add(self, rhs: Delta) -> Point {
        Point::new(
            self.x.saturating_add(rhs.dx),
            self.y.saturating_add(rhs.dy),
        )
    }
}

/// Effective width/height of a seat used for bounds clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Footprint {
    pub width: i32,
    pub height: i32,
}

impl Footprint {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `size` centred on `center`.
    pub fn centered(center: Point, size: i32) -> Self {
        let half = size / 2;
        Self::new(
            center.x.saturating_sub(half),
            center.y.saturating_sub(half),
            size,
            size,
        )
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_difference_yields_delta() {
        let delta = Point::new(60, 40) - Point::new(10, 50);
        assert_eq!(delta, Delta::new(50, -10));
        assert_eq!(Point::new(10, 50) + delta, Point::new(60, 40));
    }

    #[test]
    fn rect_containment_is_half_open() {
        let rect = Rect::new(10, 10, 5, 5);
        assert!(rect.contains(Point::new(10, 10)));
        assert!(rect.contains(Point::new(14, 14)));
        assert!(!rect.contains(Point::new(15, 10)));
        assert!(!rect.contains(Point::new(9, 12)));
    }

    #[test]
    fn centered_square_surrounds_point() {
        let rect = Rect::centered(Point::new(100, 100), 12);
        assert_eq!(rect, Rect::new(94, 94, 12, 12));
        assert!(rect.contains(Point::new(100, 100)));
    }

    #[test]
    fn centered_rect_saturates_at_i32_limits() {
        let rect = Rect::centered(Point::new(i32::MIN, i32::MIN), 12);
        assert_eq!(rect, Rect::new(i32::MIN, i32::MIN, 12, 12));
        assert!(rect.contains(Point::new(i32::MIN, i32::MIN + 5)));
        let far = Rect::centered(Point::new(i32::MAX, 0), 12);
        assert_eq!(far.right(), i32::MAX);
        assert!(!far.contains(Point::new(i32::MAX, 0)));
    }
}
