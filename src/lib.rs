//! # Gati-Plan: Two-Axis Trapezoidal Motion Planner
//!
//! Converts an ordered polyline of waypoints with desired cruise speeds
//! into a time-parameterized velocity profile for CNC/laser-style
//! machines. The profile respects per-axis speed and acceleration
//! limits, bounds corner speeds with the junction-deviation model, and
//! starts and ends at rest.
//!
//! ## Quick Start
//!
//! ```rust
//! use gati_plan::{plan, AxisLimits, Point2D, Waypoint};
//!
//! let limits = AxisLimits::default();
//! let path = vec![
//!     Waypoint::new(Point2D::new(100.0, 0.0), 200.0),
//!     Waypoint::new(Point2D::new(100.0, 100.0), 200.0),
//! ];
//!
//! let profile = plan(&path, &limits, Point2D::ZERO).unwrap();
//! println!("traversal takes {:.3}s", profile.total_time());
//!
//! // Sample the tool position at any time, e.g. for animation
//! let halfway = profile.position_at(profile.total_time() / 2.0);
//! println!("halfway: ({:.1}, {:.1})", halfway.x, halfway.y);
//! ```
//!
//! ## Data Flow
//!
//! ```text
//!  waypoints + start position + AxisLimits
//!                  │
//!                  ▼
//!        ┌──────────────────┐
//!        │     junction     │  corner speed bounds (virtual-arc
//!        │                  │  model), backward stop propagation,
//!        │                  │  forward reachability clamp
//!        └────────┬─────────┘
//!                 │ feasible speed + cruise cap per waypoint
//!                 ▼
//!        ┌──────────────────┐
//!        │     segment      │  per-segment trapezoid / truncated
//!        │                  │  triangle synthesis
//!        └────────┬─────────┘
//!                 │ 1-3 SpeedPoints per segment
//!                 ▼
//!        ┌──────────────────┐
//!        │     Profile      │──► total_time()
//!        │  (cumulative t)  │──► position_at(t)
//!        └──────────────────┘──► sample_positions(dt)
//! ```
//!
//! ## Units
//!
//! Positions are in device units (conventionally millimetres), speeds in
//! units/second, accelerations in units/second², time in seconds.
//!
//! ## Purity
//!
//! [`plan`] is a pure function: no shared state, no I/O, no dependence
//! on anything but its arguments. Identical inputs produce bit-identical
//! profiles, and a returned [`Profile`] may be read concurrently without
//! synchronization.

pub mod config;
pub mod core;
pub mod error;
pub mod planner;
pub mod profile;

mod junction;
mod segment;

// Re-export main types at crate root
pub use config::{AxisLimits, SpeedKind};
pub use core::Point2D;
pub use error::{PlanError, Result};
pub use planner::plan;
pub use profile::{Profile, SpeedPoint, Waypoint};
