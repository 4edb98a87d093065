//! Landmark detector output and its conversion into view coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use optifit_3d::ops::planar_distance;

/// Index of the nose landmark used as segment height reference.
pub const NOSE_REFERENCE_INDEX: usize = 1;

/// Axis aligned rectangle in normalized image coordinates, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// One face reported by the landmark detector.
///
/// Landmark points are normalized to the face bounding box, origin bottom-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    /// Face bounding box, normalized to the image.
    pub bounding_box: NormalizedRect,
    /// Left pupil, if detected.
    pub left_pupil: Option<Vec2>,
    /// Right pupil, if detected.
    pub right_pupil: Option<Vec2>,
    /// Nose contour points.
    pub nose: Vec<Vec2>,
}

/// Pupil and nose reference points of one frame, in view coordinates
/// (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PupilObservation {
    /// Left pupil center.
    pub left_pupil: Vec2,
    /// Right pupil center.
    pub right_pupil: Vec2,
    /// Nose reference point.
    pub nose: Vec2,
}

impl PupilObservation {
    /// Distance between the pupils, in view points.
    pub fn pupil_distance(&self) -> f32 {
        planar_distance(self.left_pupil, self.right_pupil)
    }
}

impl FaceLandmarks {
    /// Map the landmarks into a view of the given size.
    ///
    /// Returns `None` if either pupil or the nose reference point is missing.
    ///
    /// Example:
    /// ```
    /// use glam::Vec2;
    /// use optifit::landmarks::{FaceLandmarks, NormalizedRect};
    ///
    /// let face = FaceLandmarks {
    ///     bounding_box: NormalizedRect { x: 0.25, y: 0.25, width: 0.5, height: 0.5 },
    ///     left_pupil: Some(Vec2::new(0.25, 0.5)),
    ///     right_pupil: Some(Vec2::new(0.75, 0.5)),
    ///     nose: vec![Vec2::new(0.5, 0.5), Vec2::new(0.5, 0.4)],
    /// };
    /// let observation = face.to_view(Vec2::new(400.0, 800.0)).unwrap();
    /// assert_eq!(observation.left_pupil, Vec2::new(150.0, 400.0));
    /// ```
    pub fn to_view(&self, view_size: Vec2) -> Option<PupilObservation> {
        let left = self.left_pupil?;
        let right = self.right_pupil?;
        let nose = *self.nose.get(NOSE_REFERENCE_INDEX)?;

        let origin = Vec2::new(
            self.bounding_box.x * view_size.x,
            self.bounding_box.y * view_size.y,
        );
        let size = Vec2::new(
            self.bounding_box.width * view_size.x,
            self.bounding_box.height * view_size.y,
        );

        let to_view = |point: Vec2| -> Vec2 {
            let p = origin + point * size;
            // flip to a top-left origin
            Vec2::new(p.x, view_size.y - p.y)
        };

        Some(PupilObservation {
            left_pupil: to_view(left),
            right_pupil: to_view(right),
            nose: to_view(nose),
        })
    }
}
