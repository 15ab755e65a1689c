//! Input waypoints and the planned velocity profile.
//!
//! A [`Profile`] is the planner's output: an ordered list of
//! constant-acceleration sub-segments ([`SpeedPoint`]) with cumulative
//! timestamps. It is immutable after construction and can be sampled at
//! any time with [`Profile::position_at`].

use crate::config::{AxisLimits, SpeedKind};
use crate::core::math::sq;
use crate::core::Point2D;
use serde::{Deserialize, Serialize};

/// A commanded corner of the toolpath with its desired cruise speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Target position in device units.
    pub position: Point2D,
    /// Desired cruise speed for the move (units/s). Must be positive.
    pub speed: f64,
}

impl Waypoint {
    /// Create a waypoint with an explicit desired speed.
    pub fn new(position: Point2D, speed: f64) -> Self {
        Self { position, speed }
    }

    /// Waypoint using the configured cutting speed.
    pub fn cutting(position: Point2D, limits: &AxisLimits) -> Self {
        Self::new(position, limits.speed_for(SpeedKind::Cutting))
    }

    /// Waypoint using the configured travel speed.
    pub fn travel(position: Point2D, limits: &AxisLimits) -> Self {
        Self::new(position, limits.speed_for(SpeedKind::Travel))
    }
}

/// One constant-acceleration sub-segment of a planned profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedPoint {
    /// Where the sub-segment begins.
    pub start: Point2D,
    /// Where the sub-segment ends.
    pub target: Point2D,
    /// Unit vector from `start` to `target`.
    pub direction: Point2D,
    /// Entry speed into the sub-segment (units/s).
    pub speed: f64,
    /// Signed acceleration along `direction` (units/s²). Positive while
    /// speeding up, zero while cruising, negative while braking.
    pub acceleration: f64,
    /// Cumulative time at which the tool reaches `target`, measured from
    /// the start of the profile (seconds).
    pub time: f64,
}

impl SpeedPoint {
    /// Length of the sub-segment in device units.
    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(&self.target)
    }

    /// Speed at the end of the sub-segment (units/s).
    ///
    /// Derived from `v₁² = v₀² + 2·a·ℓ`, clamped at zero.
    pub fn exit_speed(&self) -> f64 {
        (sq(self.speed) + 2.0 * self.acceleration * self.length())
            .max(0.0)
            .sqrt()
    }
}

/// A planned velocity profile.
///
/// Invariants (established by `plan`, relied on by consumers):
/// - `time` is non-decreasing across `points`;
/// - the first point starts at the profile's start position with entry
///   speed zero, the last point ends at the final waypoint at rest;
/// - the exit speed of each sub-segment equals the entry speed of the
///   next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Ordered sub-segments with cumulative timestamps.
    pub points: Vec<SpeedPoint>,
    /// Position the tool occupies at `t = 0`.
    pub start: Point2D,
    /// Input-path indices of waypoints whose junction speed had to be cut
    /// below the requested bound to keep the profile feasible. Empty for
    /// a clean plan.
    pub degraded_at: Vec<usize>,
}

impl Profile {
    /// Number of sub-segments.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check whether the profile contains no motion.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when at least one corner could not honor its requested speed.
    pub fn is_degraded(&self) -> bool {
        !self.degraded_at.is_empty()
    }

    /// Total traversal time in seconds. Zero for an empty profile.
    pub fn total_time(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.time)
    }

    /// Position where the profile ends.
    pub fn end_position(&self) -> Point2D {
        self.points.last().map_or(self.start, |p| p.target)
    }

    /// Position of the tool `t` seconds after the profile starts.
    ///
    /// Times past the end return the final position; negative times
    /// return the start.
    pub fn position_at(&self, t: f64) -> Point2D {
        let mut segment_start_time = 0.0;
        for point in &self.points {
            if point.time > t {
                let dt = (t - segment_start_time).max(0.0);
                let travelled = point.speed * dt + 0.5 * point.acceleration * sq(dt);
                return point.start + point.direction * travelled;
            }
            segment_start_time = point.time;
        }
        self.end_position()
    }

    /// Sample positions at a fixed timestep, including both endpoints.
    ///
    /// Intended for animation and time-estimate consumers. A
    /// non-positive `step` yields only the start position.
    pub fn sample_positions(&self, step: f64) -> impl Iterator<Item = Point2D> + '_ {
        let total = self.total_time();
        let steps = if step > 0.0 && total > 0.0 {
            (total / step).ceil() as usize
        } else {
            0
        };
        (0..=steps).map(move |i| self.position_at((i as f64 * step).min(total)))
    }
}
