//! Core configuration for token-animator-core.

use serde::{Deserialize, Serialize};

use crate::grid::GridMetrics;

/// Speed (grid units per second) used when neither the caller nor the animation supplies one.
pub const DEFAULT_SPEED: f64 = 4.0;

/// Configuration for walker granularity, grid metrics and event buffering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback speed in grid units per second.
    pub default_speed: f64,
    /// Size of one grid unit in scene distance units (pixels on the host canvas).
    pub grid_size: f64,

    /// Micro-step length as a fraction of one grid unit.
    pub step_fraction: f64,
    /// Lower bound for the micro-step length, in distance units.
    pub min_step_distance: f64,
    /// Window a single animated micro-step duration is clamped into.
    pub min_step_ms: u64,
    pub max_step_ms: u64,

    /// Capacity of the playback event broadcast channel.
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            grid_size: 100.0,
            step_fraction: 0.125,
            min_step_distance: 2.0,
            min_step_ms: 12,
            max_step_ms: 24,
            event_capacity: 64,
        }
    }
}

impl Config {
    pub fn grid(&self) -> GridMetrics {
        GridMetrics::new(self.grid_size)
    }

    /// Replace nonsensical values with defaults so the walker math stays finite.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.default_speed.is_finite() && self.default_speed > 0.0) {
            self.default_speed = defaults.default_speed;
        }
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            self.grid_size = defaults.grid_size;
        }
        if !(self.step_fraction.is_finite() && self.step_fraction > 0.0) {
            self.step_fraction = defaults.step_fraction;
        }
        if !(self.min_step_distance.is_finite() && self.min_step_distance > 0.0) {
            self.min_step_distance = defaults.min_step_distance;
        }
        if self.min_step_ms == 0 {
            self.min_step_ms = 1;
        }
        if self.max_step_ms < self.min_step_ms {
            self.max_step_ms = self.min_step_ms;
        }
        self.event_capacity = self.event_capacity.max(1);
        self
    }
}
