//! Planner entry point.
//!
//! [`plan`] is a pure function: it validates its input, bounds the corner
//! speeds, and synthesizes the trapezoidal profile in one call. The
//! returned [`Profile`] is immutable and safe to read from any thread.

use crate::config::AxisLimits;
use crate::core::Point2D;
use crate::error::{PlanError, Result};
use crate::junction;
use crate::profile::{Profile, Waypoint};
use crate::segment::{plan_segment, EntryState};
use log::debug;

/// Plan a velocity profile that starts at rest on `start_position`,
/// visits `path` in order, and ends at rest on the final waypoint.
///
/// Each waypoint's desired speed and the per-axis limits cap the cruise
/// speed of the segment it commands; corner speeds are bounded by the
/// junction-deviation model. Corners whose requested speed cannot be
/// reached within the acceleration limits are planned at the reachable
/// speed and reported through [`Profile::degraded_at`].
///
/// # Errors
///
/// Rejects an empty path, a waypoint with non-positive desired speed,
/// and out-of-range limits. Geometric degeneracies (duplicate points,
/// collinear corners) are handled, not rejected.
///
/// # Example
/// ```
/// use gati_plan::{plan, AxisLimits, Point2D, Waypoint};
///
/// let limits = AxisLimits::default();
/// let path = vec![
///     Waypoint::new(Point2D::new(100.0, 0.0), 200.0),
///     Waypoint::new(Point2D::new(100.0, 100.0), 200.0),
/// ];
/// let profile = plan(&path, &limits, Point2D::ZERO).unwrap();
/// assert!(profile.total_time() > 0.0);
/// assert_eq!(profile.end_position(), Point2D::new(100.0, 100.0));
/// ```
pub fn plan(path: &[Waypoint], limits: &AxisLimits, start_position: Point2D) -> Result<Profile> {
    if path.is_empty() {
        return Err(PlanError::EmptyPath);
    }
    for (index, waypoint) in path.iter().enumerate() {
        if waypoint.speed <= 0.0 {
            return Err(PlanError::NonPositiveSpeed {
                index,
                speed: waypoint.speed,
            });
        }
    }
    limits.validate()?;

    let junction_plan = junction::solve(path, start_position, limits);

    let mut points = Vec::with_capacity(junction_plan.points.len() * 3);
    let mut entry = EntryState {
        position: start_position,
        speed: 0.0,
    };
    let mut time = 0.0;
    for junction_point in &junction_plan.points {
        time = plan_segment(
            entry,
            junction_point.position,
            junction_point.final_speed,
            junction_point.max_speed,
            limits,
            time,
            &mut points,
        );
        entry = EntryState {
            position: junction_point.position,
            speed: junction_point.final_speed,
        };
    }

    debug!(
        "planned {} sub-segments over {} waypoints, total {:.3}s",
        points.len(),
        path.len(),
        time
    );

    Ok(Profile {
        points,
        start: start_position,
        degraded_at: junction_plan.degraded_at,
    })
}
