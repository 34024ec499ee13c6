//! Continuous positions, cells, and world-bounds helpers.
//!
//! Positions are continuous `f64` pairs in `[0, side)`. A *cell* is the integer
//! floor of a position; two things are co-located when they share a cell.
//!
//! Bounds handling follows "clamp then slide":
//! 1. The caller clamps the displacement to the speed budget along its ray
//! 2. The end point is clamped into `[0, side)` on each axis independently, so
//!    a move into a wall keeps its component parallel to the wall

use serde::{Deserialize, Serialize};

use crate::constants::BOUND_EPSILON;

/// A point in the world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Integer cell containing this position.
    pub fn cell(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }

    pub fn same_cell(&self, other: &Position) -> bool {
        self.cell() == other.cell()
    }

    pub fn offset(&self, d: Displacement) -> Position {
        Position::new(self.x + d.dx, self.y + d.dy)
    }

    /// Displacement from `self` to `target`.
    pub fn towards(&self, target: &Position) -> Displacement {
        Displacement::new(target.x - self.x, target.y - self.y)
    }
}

/// A requested movement vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Displacement {
    pub dx: f64,
    pub dy: f64,
}

impl Displacement {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn length(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }

    pub fn scale(&self, factor: f64) -> Displacement {
        Displacement::new(self.dx * factor, self.dy * factor)
    }

    /// Shorten to at most `budget`, keeping the direction.
    pub fn clamp_length(&self, budget: f64) -> Displacement {
        let len = self.length();
        if len <= budget || len == 0.0 {
            *self
        } else {
            self.scale(budget / len)
        }
    }
}

/// The square world `[0, side) x [0, side)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub side: f64,
}

impl Bounds {
    pub fn new(side: f64) -> Self {
        Self { side }
    }

    /// Largest admissible coordinate.
    fn max_coord(&self) -> f64 {
        self.side - BOUND_EPSILON
    }

    pub fn contains(&self, p: &Position) -> bool {
        p.x >= 0.0 && p.x < self.side && p.y >= 0.0 && p.y < self.side
    }

    /// Clamp a point into the world on each axis independently.
    pub fn clamp(&self, p: Position) -> Position {
        let hi = self.max_coord();
        let fix = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, hi) };
        Position::new(fix(p.x), fix(p.y))
    }

    /// Move from `start` by `d`, sliding along any wall the move runs into.
    pub fn slide(&self, start: Position, d: Displacement) -> Position {
        self.clamp(self.clamp(start).offset(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_and_cells() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(Position::new(20.9, 80.1).cell(), (20, 80));
        assert!(Position::new(20.0, 80.0).same_cell(&Position::new(20.99, 80.5)));
        assert!(!Position::new(20.0, 80.0).same_cell(&Position::new(21.0, 80.0)));
    }

    #[test]
    fn clamp_length_keeps_direction() {
        let d = Displacement::new(30.0, 40.0).clamp_length(5.0);
        assert!((d.length() - 5.0).abs() < 1e-12);
        assert!((d.dx - 3.0).abs() < 1e-12);
        assert!((d.dy - 4.0).abs() < 1e-12);

        let short = Displacement::new(1.0, 1.0).clamp_length(5.0);
        assert_eq!(short, Displacement::new(1.0, 1.0));
    }

    #[test]
    fn clamp_stays_below_side() {
        let b = Bounds::new(1000.0);
        let p = b.clamp(Position::new(1500.0, -3.0));
        assert!(b.contains(&p), "{p:?}");
        assert_eq!(p.y, 0.0);
        assert!(p.x < 1000.0);
    }

    #[test]
    fn slide_stops_at_boundary_and_keeps_parallel_component() {
        let b = Bounds::new(100.0);
        let p = b.slide(Position::new(98.0, 50.0), Displacement::new(4.0, 2.0));
        assert!(b.contains(&p));
        // X pinned at the wall, Y moves the full amount.
        assert!((p.x - 100.0).abs() < 1e-6, "x={}", p.x);
        assert!((p.y - 52.0).abs() < 1e-9, "y={}", p.y);
    }

    #[test]
    fn slide_inside_is_plain_offset() {
        let b = Bounds::new(100.0);
        let p = b.slide(Position::new(10.0, 10.0), Displacement::new(-3.0, 4.0));
        assert_eq!(p, Position::new(7.0, 14.0));
    }

    #[test]
    fn slide_straight_into_origin_wall_stays_put() {
        let b = Bounds::new(100.0);
        let p = b.slide(Position::new(0.0, 5.0), Displacement::new(-1.0, 0.0));
        assert_eq!(p, Position::new(0.0, 5.0));
    }

    #[test]
    fn at_wall_diagonal_slides_not_snaps() {
        let b = Bounds::new(100.0);
        let p = b.slide(Position::new(0.0, 5.0), Displacement::new(-1.0, 2.0));
        assert_eq!(p, Position::new(0.0, 7.0));

        let corner = b.slide(Position::new(0.0, 0.0), Displacement::new(-3.0, -4.0));
        assert_eq!(corner, Position::new(0.0, 0.0));
    }
}
