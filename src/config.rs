//! Machine limit configuration.
//!
//! [`AxisLimits`] carries the per-axis kinematic caps and junction
//! parameters the planner needs. Values usually come from a machine
//! profile file; the planner itself only ever receives a populated
//! struct and performs no I/O.

use crate::core::math::is_zero;
use crate::core::Point2D;
use crate::error::{PlanError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sentinel limit used when a direction has no component on an axis.
///
/// That axis then imposes no bound along the direction; the other axis
/// (or the commanded speed) saturates first.
pub const LIMIT_SENTINEL: f64 = 1e9;

/// Which configured default cruise speed a move uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedKind {
    /// Engraving/cutting move at the material feed rate.
    Cutting,
    /// Rapid repositioning move with the tool disengaged.
    Travel,
}

/// Per-axis kinematic limits and junction parameters.
///
/// All speeds in units/s, accelerations in units/s², distances in device
/// units. Every field except `min_junction_speed` must be strictly
/// positive; see [`AxisLimits::validate`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AxisLimits {
    /// Maximum X-axis speed (units/s). Default: 500.0
    #[serde(default = "default_max_speed")]
    pub max_speed_x: f64,

    /// Maximum Y-axis speed (units/s). Default: 500.0
    #[serde(default = "default_max_speed")]
    pub max_speed_y: f64,

    /// Maximum X-axis acceleration (units/s²). Default: 3000.0
    #[serde(default = "default_accel")]
    pub accel_x: f64,

    /// Maximum Y-axis acceleration (units/s²). Default: 3000.0
    #[serde(default = "default_accel")]
    pub accel_y: f64,

    /// Speed floor at sharp corners (units/s). Zero forces a full stop.
    /// Default: 0.0
    #[serde(default)]
    pub min_junction_speed: f64,

    /// Maximum allowed deviation from the geometric path at a corner
    /// (device units). Controls the radius of the virtual arc bounding
    /// centripetal acceleration. Default: 0.01
    #[serde(default = "default_junction_deviation")]
    pub junction_deviation: f64,

    /// Default cruise speed for cutting moves (units/s). Default: 200.0
    #[serde(default = "default_cutting_speed")]
    pub cutting_speed: f64,

    /// Default cruise speed for travel moves (units/s). Default: 400.0
    #[serde(default = "default_travel_speed")]
    pub travel_speed: f64,
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self {
            max_speed_x: default_max_speed(),
            max_speed_y: default_max_speed(),
            accel_x: default_accel(),
            accel_y: default_accel(),
            min_junction_speed: 0.0,
            junction_deviation: default_junction_deviation(),
            cutting_speed: default_cutting_speed(),
            travel_speed: default_travel_speed(),
        }
    }
}

// Default value functions
fn default_max_speed() -> f64 {
    500.0
}
fn default_accel() -> f64 {
    3000.0
}
fn default_junction_deviation() -> f64 {
    0.01
}
fn default_cutting_speed() -> f64 {
    200.0
}
fn default_travel_speed() -> f64 {
    400.0
}

impl AxisLimits {
    /// Load limits from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlanError::Config(format!("Failed to read limits file: {}", e)))?;
        let limits: AxisLimits = toml::from_str(&content)?;
        limits.validate()?;
        Ok(limits)
    }

    /// Check that every limit is in range.
    ///
    /// Speeds, accelerations, and the junction deviation must be strictly
    /// positive; the minimum junction speed must be non-negative.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_speed_x", self.max_speed_x),
            ("max_speed_y", self.max_speed_y),
            ("accel_x", self.accel_x),
            ("accel_y", self.accel_y),
            ("junction_deviation", self.junction_deviation),
            ("cutting_speed", self.cutting_speed),
            ("travel_speed", self.travel_speed),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(PlanError::InvalidLimit { name, value });
            }
        }
        if self.min_junction_speed < 0.0 {
            return Err(PlanError::InvalidLimit {
                name: "min_junction_speed",
                value: self.min_junction_speed,
            });
        }
        Ok(())
    }

    /// Default cruise speed for the given move kind.
    #[inline]
    pub fn speed_for(&self, kind: SpeedKind) -> f64 {
        match kind {
            SpeedKind::Cutting => self.cutting_speed,
            SpeedKind::Travel => self.travel_speed,
        }
    }

    /// Maximum speed magnitude along the unit direction `dir`.
    ///
    /// This is the per-direction projection `min(|Lx/dx|, |Ly/dy|)`: the
    /// axis that saturates first bounds the combined move.
    #[inline]
    pub fn max_speed_along(&self, dir: Point2D) -> f64 {
        limit_along(self.max_speed_x, self.max_speed_y, dir)
    }

    /// Maximum acceleration magnitude along the unit direction `dir`.
    #[inline]
    pub fn max_accel_along(&self, dir: Point2D) -> f64 {
        limit_along(self.accel_x, self.accel_y, dir)
    }
}

/// Project a per-axis limit pair onto a unit direction.
///
/// An axis with no component contributes [`LIMIT_SENTINEL`] so it never
/// binds.
fn limit_along(limit_x: f64, limit_y: f64, dir: Point2D) -> f64 {
    let along_x = if is_zero(dir.x) {
        LIMIT_SENTINEL
    } else {
        (limit_x / dir.x).abs()
    };
    let along_y = if is_zero(dir.y) {
        LIMIT_SENTINEL
    } else {
        (limit_y / dir.y).abs()
    };
    along_x.min(along_y)
}
