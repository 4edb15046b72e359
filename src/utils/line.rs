//! # Bresenham Lines
//!
//! Discrete lines used for sight rays and arrow flight paths.

use crate::Position;

/// Returns the grid points of the line from `start` to `end`, both included.
///
/// The first point is always `start`, so callers can walk the line outward.
///
/// # Examples
///
/// ```
/// use delve::{bresenham_line, Position};
///
/// let points = bresenham_line(Position::new(0, 0), Position::new(3, 4));
/// assert_eq!(points.first(), Some(&Position::new(0, 0)));
/// assert_eq!(points.last(), Some(&Position::new(3, 4)));
/// assert_eq!(points.len(), 5);
/// ```
pub fn bresenham_line(start: Position, end: Position) -> Vec<Position> {
    // Differences of two i32 coordinates only fit in i64.
    let (mut x1, mut y1, mut x2, mut y2) = (
        i64::from(start.x),
        i64::from(start.y),
        i64::from(end.x),
        i64::from(end.y),
    );

    let steep = (y2 - y1).abs() > (x2 - x1).abs();
    if steep {
        std::mem::swap(&mut x1, &mut y1);
        std::mem::swap(&mut x2, &mut y2);
    }

    let swapped = x1 > x2;
    if swapped {
        std::mem::swap(&mut x1, &mut x2);
        std::mem::swap(&mut y1, &mut y2);
    }

    let dx = x2 - x1;
    let dy = (y2 - y1).abs();
    let ystep = if y1 < y2 { 1 } else { -1 };
    let mut error = dx / 2;
    let mut y = y1;

    // Every point lies between the two i32 endpoints, so narrowing is lossless.
    let point = |a: i64, b: i64| Position::new(a as i32, b as i32);
    let mut points = Vec::new();
    for x in x1..=x2 {
        points.push(if steep { point(y, x) } else { point(x, y) });
        error -= dy;
        if error < 0 {
            y += ystep;
            error += dx;
        }
    }

    if swapped {
        points.reverse();
    }
    points
}
