//! Animation data model: recorded path points, speed and metadata.

use serde::{Deserialize, Serialize};

use crate::error::AnimatorError;
use crate::grid::GridMetrics;

/// A resolved scene coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation; `t` is not clamped.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// A recorded path point. Either coordinate may be absent in stored data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

impl PathPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }
}

impl From<Point> for PathPoint {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<(f64, f64)> for PathPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// A stored animation: ordered path, speed in grid units per second, and
/// metadata the walker carries through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    #[serde(default)]
    pub name: String,
    pub points: Vec<PathPoint>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub snap: bool,
    #[serde(default)]
    pub folder: Option<String>,
}

fn usable_speed(speed: Option<f64>) -> Option<f64> {
    speed.filter(|s| s.is_finite() && *s > 0.0)
}

impl Animation {
    pub fn new(name: impl Into<String>, points: impl IntoIterator<Item = PathPoint>) -> Self {
        Self {
            name: name.into(),
            points: points.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_snap(mut self, snap: bool) -> Self {
        self.snap = snap;
        self
    }

    /// Resolve stored points into coordinates. A missing coordinate inherits the
    /// previous point's value; on the first point it resolves to 0.
    pub fn resolved_points(&self) -> Vec<Point> {
        let mut prev = Point::default();
        self.points
            .iter()
            .map(|p| {
                let resolved = Point {
                    x: p.x.unwrap_or(prev.x),
                    y: p.y.unwrap_or(prev.y),
                };
                prev = resolved;
                resolved
            })
            .collect()
    }

    /// The implicit home position (first point).
    pub fn home(&self) -> Option<Point> {
        self.points.first().map(|p| Point {
            x: p.x.unwrap_or(0.0),
            y: p.y.unwrap_or(0.0),
        })
    }

    /// Caller override, then the animation's own speed, then `default`.
    pub fn effective_speed(&self, override_speed: Option<f64>, default: f64) -> f64 {
        usable_speed(override_speed)
            .or_else(|| usable_speed(self.speed))
            .unwrap_or(default)
    }

    /// Grouping key for folder-wide controls (trimmed, empty when unset).
    pub fn folder_key(&self) -> &str {
        self.folder.as_deref().map(str::trim).unwrap_or("")
    }

    /// Copy with every point moved to its grid cell centre when `snap` is set.
    pub fn snapped(&self, grid: &GridMetrics) -> Self {
        if !self.snap {
            return self.clone();
        }
        Self {
            points: grid
                .snap_path(&self.resolved_points())
                .into_iter()
                .map(PathPoint::from)
                .collect(),
            ..self.clone()
        }
    }

    /// Validate basic invariants (non-empty path, usable explicit speed).
    pub fn validate(&self) -> Result<(), AnimatorError> {
        if self.points.is_empty() {
            return Err(AnimatorError::EmptyPath);
        }
        if let Some(speed) = self.speed {
            if usable_speed(Some(speed)).is_none() {
                return Err(AnimatorError::InvalidSpeed { speed });
            }
        }
        Ok(())
    }
}
