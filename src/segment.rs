//! Trapezoid synthesis for a single planned segment.
//!
//! Given the entry state and the planned exit of one segment, this
//! module emits up to three constant-acceleration sub-segments: ramp up,
//! cruise, ramp down. When the segment is too short to reach the cruise
//! cap the profile degenerates to a truncated triangle, and when the
//! speed change is monotone over the whole length a single sub-segment
//! covers it.

use crate::config::AxisLimits;
use crate::core::math::{sq, EPSILON};
use crate::core::Point2D;
use crate::profile::SpeedPoint;

/// Where the tool is and how fast it is moving when a segment begins.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EntryState {
    pub position: Point2D,
    pub speed: f64,
}

/// Plan the sub-segments covering `entry.position -> target`, appending
/// them to `out`. Returns the cumulative time after the segment.
///
/// `exit_speed` is the planned speed at `target` and `cruise_speed` the
/// cruise cap of this segment; the junction solver guarantees both it
/// and `entry.speed` do not exceed `cruise_speed`, and that the speed
/// change fits the projected acceleration over the segment length.
/// Zero-length segments emit nothing and leave the time unchanged.
pub(crate) fn plan_segment(
    entry: EntryState,
    target: Point2D,
    exit_speed: f64,
    cruise_speed: f64,
    limits: &AxisLimits,
    start_time: f64,
    out: &mut Vec<SpeedPoint>,
) -> f64 {
    let delta = target - entry.position;
    let length = delta.length();
    if length < EPSILON {
        return start_time;
    }
    let direction = delta * (1.0 / length);
    let accel = limits.max_accel_along(direction);
    let v0 = entry.speed;
    let vf = exit_speed;
    let vc = cruise_speed;

    let accel_dist = (sq(vc) - sq(v0)) / (2.0 * accel);
    let decel_dist = (sq(vc) - sq(vf)) / (2.0 * accel);
    let mut time = start_time;
    let mut position = entry.position;

    // The epsilon keeps ramps that consume the whole segment (a monotone
    // speed change planned by the solver) out of the trapezoid branch,
    // where rounding would leave a vanishing cruise sliver.
    if accel_dist + decel_dist + EPSILON < length {
        // Full trapezoid. Ramps with no length to cover are skipped so
        // the profile carries no zero-length sub-segments.
        let cruise_end = target - direction * decel_dist;
        if accel_dist > EPSILON {
            let ramp_end = entry.position + direction * accel_dist;
            time += duration(accel_dist, v0, vc);
            out.push(SpeedPoint {
                start: position,
                target: ramp_end,
                direction,
                speed: v0,
                acceleration: accel,
                time,
            });
            position = ramp_end;
        }
        let cruise_len = position.distance(&cruise_end);
        if cruise_len > EPSILON || decel_dist <= EPSILON {
            time += cruise_len / vc;
            out.push(SpeedPoint {
                start: position,
                target: cruise_end,
                direction,
                speed: vc,
                acceleration: 0.0,
                time,
            });
            position = cruise_end;
        }
        if decel_dist > EPSILON {
            time += duration(decel_dist, vc, vf);
            out.push(SpeedPoint {
                start: position,
                target,
                direction,
                speed: vc,
                acceleration: -accel,
                time,
            });
        }
        return time;
    }

    // Cruise cannot be reached: truncated triangle around the peak.
    let peak = (accel * length + 0.5 * (sq(v0) + sq(vf))).sqrt();
    let peak_dist = (sq(peak) - sq(v0)) / (2.0 * accel);

    if peak_dist > EPSILON && length - peak_dist > EPSILON {
        let ramp_end = entry.position + direction * peak_dist;
        time += duration(peak_dist, v0, peak);
        out.push(SpeedPoint {
            start: position,
            target: ramp_end,
            direction,
            speed: v0,
            acceleration: accel,
            time,
        });
        time += duration(length - peak_dist, peak, vf);
        out.push(SpeedPoint {
            start: ramp_end,
            target,
            direction,
            speed: peak,
            acceleration: -accel,
            time,
        });
        return time;
    }

    // The peak falls on an endpoint: one monotone ramp.
    if v0 + vf < EPSILON {
        // Sub-tolerance crawl between two standstills; nothing to emit.
        return start_time;
    }
    let signed_accel = if v0 <= vf { accel } else { -accel };
    time += duration(length, v0, vf);
    out.push(SpeedPoint {
        start: position,
        target,
        direction,
        speed: v0,
        acceleration: signed_accel,
        time,
    });
    time
}

/// Duration of a constant-acceleration stretch of `length` whose entry
/// and exit speeds are `s0` and `s1` (not both zero).
#[inline]
fn duration(length: f64, s0: f64, s1: f64) -> f64 {
    2.0 * length / (s0 + s1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn limits() -> AxisLimits {
        AxisLimits {
            max_speed_x: 500.0,
            max_speed_y: 500.0,
            accel_x: 1000.0,
            accel_y: 1000.0,
            ..AxisLimits::default()
        }
    }

    fn plan(
        entry_speed: f64,
        target: Point2D,
        exit_speed: f64,
        cruise: f64,
    ) -> (Vec<SpeedPoint>, f64) {
        let mut out = Vec::new();
        let entry = EntryState {
            position: Point2D::ZERO,
            speed: entry_speed,
        };
        let t = plan_segment(entry, target, exit_speed, cruise, &limits(), 0.0, &mut out);
        (out, t)
    }

    #[test]
    fn test_full_trapezoid() {
        // 0 -> 100 -> 0 over 100 units at a = 1000: ramps of 5 units,
        // cruise of 90 units. Times: 0.1 + 0.9 + 0.1.
        let (points, total) = plan(0.0, Point2D::new(100.0, 0.0), 0.0, 100.0);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].acceleration, 1000.0);
        assert_eq!(points[1].acceleration, 0.0);
        assert_eq!(points[2].acceleration, -1000.0);
        assert_relative_eq!(points[0].time, 0.1, epsilon = 1e-9);
        assert_relative_eq!(points[1].time, 1.0, epsilon = 1e-9);
        assert_relative_eq!(total, 1.1, epsilon = 1e-9);
        assert_eq!(points[2].target, Point2D::new(100.0, 0.0));
        // Ramp joins cruise exactly at the cap
        assert_relative_eq!(points[0].exit_speed(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_triangle_when_too_short() {
        // 1 unit at a = 1000 from rest to rest: peak √1000 ≈ 31.62, no
        // cruise point.
        let (points, total) = plan(0.0, Point2D::new(1.0, 0.0), 0.0, 500.0);
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].exit_speed(), 1000.0_f64.sqrt(), epsilon = 1e-9);
        assert!(points.iter().all(|p| p.acceleration != 0.0));
        assert_relative_eq!(total, 4.0 * 0.5 / 1000.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_monotone_acceleration() {
        // Exit speed is exactly what full throttle reaches over the
        // length: 100 -> √(100² + 2·1000·10) ≈ 173.205. Single ramp.
        let vf = 30000.0_f64.sqrt();
        let (points, total) = plan(100.0, Point2D::new(10.0, 0.0), vf, vf);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].acceleration, 1000.0);
        assert_relative_eq!(points[0].exit_speed(), vf, epsilon = 1e-6);
        assert_relative_eq!(total, 20.0 / (100.0 + vf), epsilon = 1e-9);
    }

    #[test]
    fn test_monotone_deceleration() {
        // Mirror image: braking consumes the whole segment.
        let v0 = 30000.0_f64.sqrt();
        let (points, total) = plan(v0, Point2D::new(10.0, 0.0), 100.0, v0);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].acceleration, -1000.0);
        assert_relative_eq!(total, 20.0 / (100.0 + v0), epsilon = 1e-9);
    }

    #[test]
    fn test_cruise_only() {
        // Entry, exit, and cap all equal: a single cruise sub-segment.
        let (points, total) = plan(50.0, Point2D::new(25.0, 0.0), 50.0, 50.0);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].acceleration, 0.0);
        assert_relative_eq!(total, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_length_segment_dropped() {
        let mut out = Vec::new();
        let entry = EntryState {
            position: Point2D::new(10.0, 10.0),
            speed: 0.0,
        };
        let t = plan_segment(
            entry,
            Point2D::new(10.0, 10.0),
            0.0,
            100.0,
            &limits(),
            7.5,
            &mut out,
        );
        assert!(out.is_empty());
        assert_eq!(t, 7.5);
    }

    #[test]
    fn test_diagonal_direction_and_times() {
        // Diagonal move: acceleration projects to 1000/cos45° ≈ 1414.2.
        let target = Point2D::new(100.0, 100.0);
        let (points, _) = plan(0.0, target, 0.0, 100.0);
        assert_eq!(points.len(), 3);
        let dir = points[0].direction;
        assert_relative_eq!(dir.x, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(dir.y, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(points[0].acceleration, 1414.2135624, epsilon = 1e-6);
        // Sub-segments chain: each target is the next start
        assert_eq!(points[0].target, points[1].start);
        assert_eq!(points[1].target, points[2].start);
    }
}
