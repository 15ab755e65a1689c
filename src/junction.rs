//! Junction speeds and the feasibility passes.
//!
//! For each corner of the path this module bounds the speed at which the
//! tool may pass without exceeding the centripetal acceleration implied
//! by the configured junction deviation (the Grbl virtual-arc model). A
//! backward pass then propagates the stopping constraint from the final
//! waypoint, and a forward pass clamps every corner to what full
//! acceleration from its predecessor can actually reach. After both
//! passes every adjacent speed pair is connectable within the projected
//! acceleration limit, which is what the trapezoid synthesis relies on.

use crate::config::{AxisLimits, LIMIT_SENTINEL};
use crate::core::math::{approx_ge, is_zero, sq, EPSILON};
use crate::core::Point2D;
use crate::profile::Waypoint;
use log::{debug, trace, warn};

/// Tolerance on cos(θ) for classifying a corner as a reversal (θ ≈ 0°)
/// or as collinear (θ ≈ 180°).
const CORNER_COS_TOLERANCE: f64 = 1e-6;

/// Planned speed data at one waypoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct JunctionPoint {
    /// Waypoint position.
    pub position: Point2D,
    /// Centripetal bound on the speed through this corner (units/s).
    pub max_junction_speed: f64,
    /// Feasible speed at which the tool passes the waypoint (units/s).
    pub final_speed: f64,
    /// Cruise cap of the segment arriving at this waypoint (units/s).
    pub max_speed: f64,
}

/// Output of the junction solver.
pub(crate) struct JunctionPlan {
    /// One entry per surviving waypoint, in traversal order.
    pub points: Vec<JunctionPoint>,
    /// Input-path indices whose speed had to be cut during the forward
    /// reachability pass.
    pub degraded_at: Vec<usize>,
}

/// Geometry of one planned segment, from the previous surviving position
/// to the waypoint with the same index.
struct Segment {
    direction: Point2D,
    length: f64,
    accel: f64,
    cruise_cap: f64,
}

/// Compute feasible corner speeds for `path` starting from rest at
/// `start`.
///
/// Consecutive duplicate positions (including a first waypoint that
/// coincides with the start) are dropped here, so every surviving
/// segment has a well-defined direction.
pub(crate) fn solve(path: &[Waypoint], start: Point2D, limits: &AxisLimits) -> JunctionPlan {
    let (waypoints, input_indices) = dedup_path(path, start);
    let count = waypoints.len();
    if count == 0 {
        debug!("junction solve: path collapsed to the start position");
        return JunctionPlan {
            points: Vec::new(),
            degraded_at: Vec::new(),
        };
    }

    // Segment k runs from the previous surviving position to waypoint k.
    // The cruise cap combines the departure waypoint's desired speed with
    // the axis projection; the initial segment departs from `start` and
    // uses the first waypoint's desired speed.
    let segments: Vec<Segment> = (0..count)
        .map(|k| {
            let from = if k == 0 {
                start
            } else {
                waypoints[k - 1].position
            };
            let delta = waypoints[k].position - from;
            let length = delta.length();
            let direction = delta * (1.0 / length);
            let desired = if k == 0 {
                waypoints[0].speed
            } else {
                waypoints[k - 1].speed
            };
            Segment {
                direction,
                length,
                accel: limits.max_accel_along(direction),
                cruise_cap: desired.min(limits.max_speed_along(direction)),
            }
        })
        .collect();

    // Centripetal bound per corner; the tool must stop on the last one.
    let junction_bounds: Vec<f64> = (0..count)
        .map(|k| {
            if k == count - 1 {
                0.0
            } else {
                corner_speed(segments[k].direction, segments[k + 1].direction, limits)
            }
        })
        .collect();

    // Backward pass: propagate the stopping constraint. Speeds are capped
    // by the junction bound and by the cruise caps of both adjoining
    // segments, so the trapezoid synthesis never sees an entry or exit
    // speed above its cruise cap.
    let mut speeds = vec![0.0; count];
    for k in (0..count - 1).rev() {
        let outgoing = &segments[k + 1];
        let wanted = junction_bounds[k]
            .min(outgoing.cruise_cap)
            .min(segments[k].cruise_cap);
        let next_speed = speeds[k + 1];

        let reach = (sq(wanted) + 2.0 * outgoing.accel * outgoing.length).sqrt();
        let achievable = reach - wanted;
        speeds[k] = if approx_ge(achievable, (wanted - next_speed).abs()) {
            wanted
        } else if wanted >= next_speed {
            // Too fast to shed the difference over this segment: enter no
            // faster than the speed that decelerates exactly onto the
            // successor.
            wanted.min((sq(next_speed) + 2.0 * outgoing.accel * outgoing.length).sqrt())
        } else {
            // The successor wants more speed than full acceleration can
            // deliver; the forward pass below cuts the successor down.
            wanted
        };
        trace!(
            "junction {}: bound {:.3}, final {:.3}",
            input_indices[k],
            junction_bounds[k],
            speeds[k]
        );
    }

    // Forward pass: clamp to acceleration reach from the predecessor.
    let mut degraded_at = Vec::new();
    let mut previous = 0.0;
    for k in 0..count {
        let reach = (sq(previous) + 2.0 * segments[k].accel * segments[k].length).sqrt();
        if speeds[k] > reach && !approx_ge(reach, speeds[k]) {
            warn!(
                "junction {}: speed {:.3} unreachable, clamped to {:.3}",
                input_indices[k], speeds[k], reach
            );
            degraded_at.push(input_indices[k]);
            speeds[k] = reach;
        }
        previous = speeds[k];
    }

    debug!(
        "junction solve: {} waypoints ({} dropped), {} degraded",
        count,
        path.len() - count,
        degraded_at.len()
    );

    let points = (0..count)
        .map(|k| JunctionPoint {
            position: waypoints[k].position,
            max_junction_speed: junction_bounds[k],
            final_speed: speeds[k],
            max_speed: segments[k].cruise_cap,
        })
        .collect();

    JunctionPlan { points, degraded_at }
}

/// Drop consecutive duplicate positions, keeping each run's first
/// waypoint and its input index. A leading waypoint on the start
/// position is dropped too; its segment would have no direction.
fn dedup_path(path: &[Waypoint], start: Point2D) -> (Vec<Waypoint>, Vec<usize>) {
    let mut waypoints: Vec<Waypoint> = Vec::with_capacity(path.len());
    let mut indices = Vec::with_capacity(path.len());
    let mut previous = start;
    for (index, wp) in path.iter().enumerate() {
        if wp.position.distance(&previous) < EPSILON {
            continue;
        }
        previous = wp.position;
        waypoints.push(*wp);
        indices.push(index);
    }
    (waypoints, indices)
}

/// Centripetal speed bound for a corner between unit directions `u1`
/// (incoming) and `u2` (outgoing).
///
/// Uses the junction-deviation model: the corner is traversed on a
/// virtual arc tangent to both segments whose deviation from the true
/// corner is at most `junction_deviation`.
fn corner_speed(u1: Point2D, u2: Point2D, limits: &AxisLimits) -> f64 {
    let cos_theta = -u1.dot(&u2);

    if cos_theta > 1.0 - CORNER_COS_TOLERANCE {
        // Reversal or near-reversal: the machine must (almost) stop.
        return limits.min_junction_speed;
    }
    if cos_theta < -1.0 + CORNER_COS_TOLERANCE {
        // Collinear continuation: the segment cruise caps bound the speed.
        return LIMIT_SENTINEL;
    }

    let turn_direction = (u2 - u1).normalized();
    let junction_accel = limits.max_accel_along(turn_direction);
    let sin_half = (0.5 * (1.0 - cos_theta)).sqrt();
    let speed = (junction_accel * limits.junction_deviation * sin_half / (1.0 - sin_half)).sqrt();
    let speed = speed.max(limits.min_junction_speed);

    // Sub-epsilon speeds collapse to an exact stop.
    if is_zero(speed) {
        0.0
    } else {
        speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn limits() -> AxisLimits {
        AxisLimits {
            max_speed_x: 500.0,
            max_speed_y: 500.0,
            accel_x: 3000.0,
            accel_y: 3000.0,
            min_junction_speed: 0.0,
            junction_deviation: 0.01,
            ..AxisLimits::default()
        }
    }

    #[test]
    fn test_corner_speed_reversal_uses_floor() {
        let l = limits();
        let u = Point2D::new(1.0, 0.0);
        let back = Point2D::new(-1.0, 0.0);
        assert_eq!(corner_speed(u, back, &l), 0.0);

        let floored = AxisLimits {
            min_junction_speed: 3.0,
            ..l
        };
        assert_eq!(corner_speed(u, back, &floored), 3.0);
    }

    #[test]
    fn test_corner_speed_collinear_is_unbounded() {
        let l = limits();
        let u = Point2D::new(0.0, 1.0);
        assert_eq!(corner_speed(u, u, &l), LIMIT_SENTINEL);
    }

    #[test]
    fn test_corner_speed_right_angle() {
        // 90° corner with 3000 units/s² axes and 0.01 deviation:
        // a_j = 3000/cos45° ≈ 4242.64, sin(θ/2) = √0.5,
        // v = √(4242.64·0.01·2.41421) ≈ 10.1206
        let l = limits();
        let v = corner_speed(Point2D::new(0.0, 1.0), Point2D::new(1.0, 0.0), &l);
        assert_relative_eq!(v, 10.1206, epsilon = 1e-3);
    }

    #[test]
    fn test_solve_single_segment_stops_at_end() {
        let l = limits();
        let path = [Waypoint::new(Point2D::new(100.0, 0.0), 200.0)];
        let plan = solve(&path, Point2D::ZERO, &l);
        assert_eq!(plan.points.len(), 1);
        assert_eq!(plan.points[0].final_speed, 0.0);
        assert_eq!(plan.points[0].max_junction_speed, 0.0);
        assert_relative_eq!(plan.points[0].max_speed, 200.0, epsilon = 1e-12);
        assert!(plan.degraded_at.is_empty());
    }

    #[test]
    fn test_solve_collinear_capped_by_deceleration() {
        // Two 100-unit collinear segments at 500 units/s with 1000
        // units/s² acceleration: the midpoint junction is unbounded but
        // stopping at the end caps it at √(2·1000·100) ≈ 447.21.
        let l = AxisLimits {
            accel_x: 1000.0,
            accel_y: 1000.0,
            ..limits()
        };
        let path = [
            Waypoint::new(Point2D::new(100.0, 0.0), 500.0),
            Waypoint::new(Point2D::new(200.0, 0.0), 500.0),
        ];
        let plan = solve(&path, Point2D::ZERO, &l);
        assert_eq!(plan.points.len(), 2);
        assert_relative_eq!(plan.points[0].final_speed, 447.21360, epsilon = 1e-4);
        assert_eq!(plan.points[1].final_speed, 0.0);
        assert!(plan.degraded_at.is_empty());
    }

    #[test]
    fn test_solve_drops_duplicates() {
        let l = limits();
        let path = [
            Waypoint::new(Point2D::new(10.0, 10.0), 200.0),
            Waypoint::new(Point2D::new(10.0, 10.0), 200.0),
            Waypoint::new(Point2D::new(20.0, 20.0), 200.0),
        ];
        let plan = solve(&path, Point2D::ZERO, &l);
        assert_eq!(plan.points.len(), 2);
        assert_eq!(plan.points[0].position, Point2D::new(10.0, 10.0));
        assert_eq!(plan.points[1].position, Point2D::new(20.0, 20.0));
    }

    #[test]
    fn test_solve_flags_unreachable_corner() {
        // A slow 90° corner followed 0.1 units later by a collinear
        // junction that the deceleration pass sets near 447: full
        // acceleration over 0.1 units cannot get there, so the corner is
        // clamped and reported.
        let l = AxisLimits {
            accel_x: 1000.0,
            accel_y: 1000.0,
            ..limits()
        };
        let path = [
            Waypoint::new(Point2D::new(0.0, 0.0), 500.0),
            Waypoint::new(Point2D::new(0.1, 0.0), 500.0),
            Waypoint::new(Point2D::new(100.0, 0.0), 500.0),
        ];
        let plan = solve(&path, Point2D::new(0.0, -10.0), &l);
        assert_eq!(plan.degraded_at, vec![1]);
        // Clamped to √(v₀² + 2·a·d) from the corner speed at index 0
        let v0 = plan.points[0].final_speed;
        let expected = (sq(v0) + 2.0 * 1000.0 * 0.1).sqrt();
        assert_relative_eq!(plan.points[1].final_speed, expected, epsilon = 1e-9);
        // Still feasible: the long tail can stop from the clamped speed
        assert_eq!(plan.points[2].final_speed, 0.0);
    }

    #[test]
    fn test_final_speed_never_exceeds_caps() {
        let l = limits();
        let path = [
            Waypoint::new(Point2D::new(50.0, 0.0), 400.0),
            Waypoint::new(Point2D::new(50.0, 40.0), 400.0),
            Waypoint::new(Point2D::new(90.0, 40.0), 150.0),
            Waypoint::new(Point2D::new(90.0, 0.0), 400.0),
        ];
        let plan = solve(&path, Point2D::ZERO, &l);
        for point in &plan.points {
            assert!(point.final_speed <= point.max_junction_speed + 1e-9);
            assert!(point.final_speed <= point.max_speed + 1e-9);
            assert!(point.final_speed >= 0.0);
        }
    }
}
