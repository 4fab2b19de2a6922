//! Pointer geometry.

use nalgebra::Point2;

pub type Point = Point2<f64>;

/// Taxicab distance between two points.
pub fn manhattan(a: &Point, b: &Point) -> f64 {
    (a - b).abs().sum()
}

/// Straight preview segment drawn while a link is being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewLine {
    pub from: Point,
    pub to: Point,
}

impl PreviewLine {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f64 {
        nalgebra::distance(&self.from, &self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, -2.0);
        assert_eq!(manhattan(&a, &b), 7.0);
        assert_eq!(manhattan(&a, &a), 0.0);
    }

    #[test]
    fn preview_length() {
        let line = PreviewLine::new(Point::origin(), Point::new(3.0, 4.0));
        assert!((line.length() - 5.0).abs() < 1e-12);
    }
}
