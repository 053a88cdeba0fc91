//! Square grid metrics: unit size and cell-centre snapping.

use serde::{Deserialize, Serialize};

use crate::data::Point;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    size: f64,
}

impl GridMetrics {
    /// Non-positive or non-finite sizes fall back to 1 so snapping stays defined.
    pub fn new(size: f64) -> Self {
        let size = if size.is_finite() && size > 0.0 {
            size
        } else {
            1.0
        };
        Self { size }
    }

    #[inline]
    pub fn unit_size(&self) -> f64 {
        self.size
    }

    /// Centre of the cell containing `p`.
    pub fn cell_center(&self, p: Point) -> Point {
        let half = self.size / 2.0;
        Point {
            x: (p.x / self.size).floor() * self.size + half,
            y: (p.y / self.size).floor() * self.size + half,
        }
    }

    pub fn snap_path(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.cell_center(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Animation, PathPoint};

    #[test]
    fn cell_center_floors_into_cell() {
        let grid = GridMetrics::new(100.0);
        assert_eq!(grid.cell_center(Point::new(10.0, 199.0)), Point::new(50.0, 150.0));
        assert_eq!(grid.cell_center(Point::new(-1.0, 0.0)), Point::new(-50.0, 50.0));
    }

    #[test]
    fn snapped_animation_only_when_flag_set() {
        let grid = GridMetrics::new(50.0);
        let anim = Animation::new("s", [PathPoint::new(3.0, 4.0), PathPoint::new(60.0, 99.0)]);
        assert_eq!(anim.snapped(&grid), anim);

        let snapped = anim.with_snap(true).snapped(&grid);
        assert_eq!(
            snapped.resolved_points(),
            vec![Point::new(25.0, 25.0), Point::new(75.0, 75.0)]
        );
        assert!(snapped.snap);
    }

    #[test]
    fn invalid_size_falls_back() {
        assert_eq!(GridMetrics::new(0.0).unit_size(), 1.0);
    }
}
