use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::ops::{euclidean_distance, normalize_or_zero};

/// Placement of a primitive connecting two 3D points.
///
/// A renderer draws a `Cylinder` as a unit cylinder aligned with +Y, scaled to
/// `length`, rotated by `rotation` and centered at `midpoint`. A `Point` is
/// drawn as a small sphere at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrientedSegment {
    /// The two endpoints coincide.
    Point {
        /// Location of both endpoints.
        position: Vec3,
    },
    /// A proper segment with a non-zero length.
    Cylinder {
        /// Distance between the endpoints.
        length: f32,
        /// Rotation taking the +Y axis onto the segment direction.
        rotation: Quat,
        /// Center of the segment.
        midpoint: Vec3,
    },
}

impl OrientedSegment {
    /// Model transform for the primitive.
    pub fn transform(&self) -> Mat4 {
        match *self {
            OrientedSegment::Point { position } => Mat4::from_translation(position),
            OrientedSegment::Cylinder {
                rotation, midpoint, ..
            } => Mat4::from_rotation_translation(rotation, midpoint),
        }
    }

    /// Length of the segment, zero for a point.
    pub fn length(&self) -> f32 {
        match *self {
            OrientedSegment::Point { .. } => 0.0,
            OrientedSegment::Cylinder { length, .. } => length,
        }
    }
}

/// Orient a +Y aligned cylinder so that it connects `from` and `to`.
///
/// The cylinder's half axis `(0, l/2, 0)` and the half segment `(to - from) / 2`
/// have the same length, so a rotation of 180 degrees about their normalized
/// average maps one onto the other. The quaternion is therefore
/// `(axis.x, axis.y, axis.z, 0)`. This only holds because the source vector is
/// the fixed up axis; it is not a general two vector rotation.
///
/// Coincident endpoints never reach the quaternion construction and yield
/// [`OrientedSegment::Point`]. A segment pointing straight down has a zero
/// bisector, in which case the half turn is taken about +X.
///
/// Example:
/// ```
/// use glam::Vec3;
/// use optifit_3d::segment::{oriented_segment, OrientedSegment};
///
/// let p = Vec3::new(0.1, 0.2, 0.3);
/// assert_eq!(oriented_segment(p, p), OrientedSegment::Point { position: p });
/// ```
pub fn oriented_segment(from: Vec3, to: Vec3) -> OrientedSegment {
    let length = euclidean_distance(from, to);

    if length == 0.0 {
        return OrientedSegment::Point { position: from };
    }

    // half axis of the cylinder above the origin
    let original = Vec3::new(0.0, length / 2.0, 0.0);
    // half segment, in the same frame
    let target = (to - from) / 2.0;
    // bisector between the two
    let axis = normalize_or_zero((original + target) / 2.0);

    let rotation = if axis == Vec3::ZERO {
        Quat::from_xyzw(1.0, 0.0, 0.0, 0.0)
    } else {
        // cos(180 / 2) = 0, sin(180 / 2) = 1
        Quat::from_xyzw(axis.x, axis.y, axis.z, 0.0)
    };

    OrientedSegment::Cylinder {
        length,
        rotation,
        midpoint: (from + to) / 2.0,
    }
}
