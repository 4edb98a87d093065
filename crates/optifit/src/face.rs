//! Per-frame face geometry delivered by the tracking session.

use glam::{Affine3A, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Face mesh vertex pairs spanning the vertical extent of each eye.
///
/// Left eye pairs come first. Indices refer to the canonical 1220 vertex face
/// tracking mesh.
pub const REFERENCE_SPAN_VERTICES: [(usize, usize); 4] =
    [(1107, 1094), (1108, 1095), (1062, 1075), (1063, 1076)];

/// Eye gaze blend shape coefficients, each in `[0, 1]`.
///
/// Coefficients the tracker does not report default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeState {
    /// Left eye looking up.
    pub look_up_left: f32,
    /// Right eye looking up.
    pub look_up_right: f32,
    /// Left eye looking down.
    pub look_down_left: f32,
    /// Right eye looking down.
    pub look_down_right: f32,
}

/// Two face-frame points with a known real-world separation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSpan {
    /// First endpoint, face frame, meters.
    pub start: Vec3,
    /// Second endpoint, face frame, meters.
    pub end: Vec3,
}

/// One tracking update for the tracked face.
///
/// Produced and consumed within a single update; nothing keeps it around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceGeometrySample {
    /// Vertical eye extents, two per eye, left first.
    pub spans: [ReferenceSpan; 4],
    /// Left eye transform in the face frame.
    pub left_eye: Mat4,
    /// Right eye transform in the face frame.
    pub right_eye: Mat4,
    /// Pose of the face in world coordinates.
    pub world_from_face: Affine3A,
    /// Gaze coefficients reported with this update.
    pub gaze: GazeState,
}

impl FaceGeometrySample {
    /// Build a sample from the raw face mesh.
    ///
    /// Returns `None` if the mesh does not contain the reference vertices.
    pub fn from_mesh(
        vertices: &[Vec3],
        world_from_face: Affine3A,
        left_eye: Mat4,
        right_eye: Mat4,
        gaze: GazeState,
    ) -> Option<Self> {
        let span = |(start, end): (usize, usize)| -> Option<ReferenceSpan> {
            Some(ReferenceSpan {
                start: *vertices.get(start)?,
                end: *vertices.get(end)?,
            })
        };

        Some(Self {
            spans: [
                span(REFERENCE_SPAN_VERTICES[0])?,
                span(REFERENCE_SPAN_VERTICES[1])?,
                span(REFERENCE_SPAN_VERTICES[2])?,
                span(REFERENCE_SPAN_VERTICES[3])?,
            ],
            left_eye,
            right_eye,
            world_from_face,
            gaze,
        })
    }

    /// Left eye center in the face frame.
    pub fn left_eye_position(&self) -> Vec3 {
        self.left_eye.w_axis.truncate()
    }

    /// Right eye center in the face frame.
    pub fn right_eye_position(&self) -> Vec3 {
        self.right_eye.w_axis.truncate()
    }

    /// Position of the world origin expressed in the face frame.
    pub fn world_origin_in_face(&self) -> Vec3 {
        self.world_from_face.inverse().transform_point3(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mesh() {
        let mut vertices = vec![Vec3::ZERO; 1220];
        for (i, (start, end)) in REFERENCE_SPAN_VERTICES.iter().enumerate() {
            vertices[*start] = Vec3::new(i as f32, 1.0, 0.0);
            vertices[*end] = Vec3::new(i as f32, -1.0, 0.0);
        }

        let sample = FaceGeometrySample::from_mesh(
            &vertices,
            Affine3A::IDENTITY,
            Mat4::from_translation(Vec3::new(-0.03, 0.0, 0.01)),
            Mat4::from_translation(Vec3::new(0.03, 0.0, 0.02)),
            GazeState::default(),
        )
        .unwrap();

        assert_eq!(sample.spans[2].start, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(sample.spans[2].end, Vec3::new(2.0, -1.0, 0.0));
        assert_eq!(sample.left_eye_position(), Vec3::new(-0.03, 0.0, 0.01));
        assert_eq!(sample.right_eye_position(), Vec3::new(0.03, 0.0, 0.02));
    }

    #[test]
    fn test_from_mesh_too_short() {
        let vertices = vec![Vec3::ZERO; 1100];
        let sample = FaceGeometrySample::from_mesh(
            &vertices,
            Affine3A::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            GazeState::default(),
        );
        assert!(sample.is_none());
    }

    #[test]
    fn test_world_origin_in_face() {
        let sample = FaceGeometrySample::from_mesh(
            &[Vec3::ZERO; 1220],
            Affine3A::from_translation(Vec3::new(0.1, 0.0, -0.4)),
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            GazeState::default(),
        )
        .unwrap();
        let origin = sample.world_origin_in_face();
        assert!((origin - Vec3::new(-0.1, 0.0, 0.4)).length() < 1e-6);
    }
}
