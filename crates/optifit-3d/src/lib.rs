#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Optifit 3D
//!
//! Small geometry kernel used by the measurement engine. Everything works on
//! single precision [`glam`] types, matching the precision of the face
//! tracking data that feeds it.
//!
//! ## Example
//!
//! ```rust
//! use glam::Vec3;
//! use optifit_3d::segment::{oriented_segment, OrientedSegment};
//!
//! let left_eye = Vec3::new(-0.031, 0.0, 0.0);
//! let right_eye = Vec3::new(0.031, 0.0, 0.0);
//!
//! match oriented_segment(left_eye, right_eye) {
//!     OrientedSegment::Cylinder { length, .. } => assert!((length - 0.062).abs() < 1e-6),
//!     OrientedSegment::Point { .. } => unreachable!(),
//! }
//! ```

/// Millimeter calibration from projected reference spans.
pub mod calibration;

/// Pinhole camera model and world to screen projection.
pub mod camera;

/// Vector distances and normalization.
pub mod ops;

/// Oriented segments for drawing a line between two 3D points.
pub mod segment;

/// Number of millimeters in one meter of world space.
pub const MILLIMETERS_PER_METER: f32 = 1000.0;
