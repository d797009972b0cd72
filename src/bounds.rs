//! Bounds policy: pure clamping helpers that keep every seat inside the table.
//!
//! Bounds always use the table's bounding rectangle; the table shape is a
//! rendering hint only. When a table is narrower than a seat the upper bound
//! goes negative and the coordinate is pinned to 0, letting the seat overflow
//! visually instead of failing.

use crate::geometry::{Footprint, Point};

/// Clamp `position` so the footprint fits within `table_width` x `table_length`.
pub fn clamp_position(
    position: Point,
    footprint: Footprint,
    table_width: i32,
    table_length: i32,
) -> Point {
    Point::new(
        clamp_axis(position.x, table_width.saturating_sub(footprint.width)),
        clamp_axis(position.y, table_length.saturating_sub(footprint.height)),
    )
}

fn clamp_axis(value: i32, upper: i32) -> i32 {
    value.min(upper).max(0)
}

/// True when `position` already satisfies the placement invariant.
pub fn is_within(position: Point, footprint: Footprint, table_width: i32, table_length: i32) -> bool {
    clamp_position(position, footprint, table_width, table_length) == position
}

/// Clamp a table dimension into `[min, max]`, with no upper bound when `max` is `None`.
pub fn clamp_dimension(value: i32, min: i32, max: Option<i32>) -> i32 {
    let floored = value.max(min);
    match max {
        Some(max) => floored.min(max.max(min)),
        None => floored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEAT: Footprint = Footprint::new(60, 60);

    #[test]
    fn inside_positions_are_untouched() {
        let p = Point::new(100, 200);
        assert_eq!(clamp_position(p, SEAT, 800, 600), p);
        assert!(is_within(p, SEAT, 800, 600));
    }

    #[test]
    fn clamps_to_far_edges() {
        let p = clamp_position(Point::new(900, 700), SEAT, 800, 600);
        assert_eq!(p, Point::new(740, 540));
    }

    #[test]
    fn clamps_negative_to_origin() {
        let p = clamp_position(Point::new(-15, -1), SEAT, 800, 600);
        assert_eq!(p, Point::origin());
    }

    #[test]
    fn table_smaller_than_seat_pins_to_zero() {
        let p = clamp_position(Point::new(30, 30), SEAT, 40, 600);
        assert_eq!(p, Point::new(0, 30));
        let p = clamp_position(Point::new(30, 30), SEAT, 40, 20);
        assert_eq!(p, Point::origin());
    }

    #[test]
    fn zero_sized_footprint_reaches_table_edge() {
        let p = clamp_position(Point::new(1000, 1000), Footprint::new(0, 0), 400, 300);
        assert_eq!(p, Point::new(400, 300));
    }

    #[test]
    fn dimension_clamping_respects_optional_max() {
        assert_eq!(clamp_dimension(350, 400, None), 400);
        assert_eq!(clamp_dimension(5000, 400, None), 5000);
        assert_eq!(clamp_dimension(5000, 400, Some(1600)), 1600);
        assert_eq!(clamp_dimension(900, 400, Some(1600)), 900);
    }
}
