use optifit_3d::calibration::project_and_calibrate;
use optifit_3d::camera::ViewCamera;
use optifit_3d::MILLIMETERS_PER_METER;

use crate::face::FaceGeometrySample;

/// Calibration derived from the latest tracking update.
///
/// Holds no history: each update overwrites the previous values, except that
/// a frame whose reference spans cannot be projected leaves the previous
/// ratio in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationState {
    /// Millimeters covered by one view point at the depth of the eyes.
    pub millimeters_per_pixel: Option<f32>,
    /// Head yaw in degrees, 0 is frontal. `None` when it cannot be derived.
    pub head_yaw_degrees: Option<f32>,
    /// Depth difference between the two eye centers, in millimeters.
    pub depth_correction_mm: f32,
}

impl CalibrationState {
    /// Recompute the calibration from a tracking update.
    ///
    /// # Arguments
    ///
    /// * `sample` - Face geometry of the current frame.
    /// * `camera` - Camera rendering the view for the current frame.
    pub fn update(&mut self, sample: &FaceGeometrySample, camera: &ViewCamera) {
        match mean_span_ratio(sample, camera) {
            Some(ratio) => self.millimeters_per_pixel = Some(ratio),
            None => log::debug!("reference span projection degenerate, keeping previous ratio"),
        }

        self.head_yaw_degrees = head_yaw_degrees(sample);
        self.depth_correction_mm = depth_correction_mm(sample);

        log::trace!(
            "calibration: ratio={:?} yaw={:?} depth={:.2}",
            self.millimeters_per_pixel,
            self.head_yaw_degrees,
            self.depth_correction_mm
        );
    }

    /// Convert a view distance to millimeters.
    pub fn to_millimeters(&self, pixels: f32) -> Option<f32> {
        self.millimeters_per_pixel.map(|ratio| pixels * ratio)
    }

    /// Clear everything, as if no update had been received.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Mean ratio over the four reference spans, all of which must project.
fn mean_span_ratio(sample: &FaceGeometrySample, camera: &ViewCamera) -> Option<f32> {
    let mut sum = 0.0;
    for span in &sample.spans {
        sum += project_and_calibrate(camera, &sample.world_from_face, span.start, span.end)?;
    }
    Some(sum / sample.spans.len() as f32)
}

/// Yaw of the face relative to the world origin.
///
/// The world origin expressed in the face frame has a horizontal direction;
/// the arcsine of its normalized x component is the yaw.
fn head_yaw_degrees(sample: &FaceGeometrySample) -> Option<f32> {
    let origin = sample.world_origin_in_face();
    let magnitude = (origin.x * origin.x + origin.z * origin.z).sqrt();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return None;
    }

    let sine = (origin.x / magnitude).clamp(-1.0, 1.0);
    Some(sine.asin().to_degrees())
}

fn depth_correction_mm(sample: &FaceGeometrySample) -> f32 {
    (sample.left_eye_position().z - sample.right_eye_position().z).abs() * MILLIMETERS_PER_METER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{GazeState, ReferenceSpan};
    use approx::assert_relative_eq;
    use glam::{Affine3A, Mat4, Quat, Vec3};
    use optifit_3d::camera::CameraIntrinsic;

    fn camera() -> ViewCamera {
        ViewCamera::new(
            CameraIntrinsic {
                fx: 1000.0,
                fy: 1000.0,
                cx: 200.0,
                cy: 400.0,
            },
            Affine3A::IDENTITY,
        )
    }

    fn span(x: f32) -> ReferenceSpan {
        // 8mm vertical extent
        ReferenceSpan {
            start: Vec3::new(x, 0.004, 0.0),
            end: Vec3::new(x, -0.004, 0.0),
        }
    }

    fn sample(world_from_face: Affine3A) -> FaceGeometrySample {
        FaceGeometrySample {
            spans: [span(-0.032), span(-0.030), span(0.030), span(0.032)],
            left_eye: Mat4::from_translation(Vec3::new(-0.031, 0.0, 0.002)),
            right_eye: Mat4::from_translation(Vec3::new(0.031, 0.0, -0.001)),
            world_from_face,
            gaze: GazeState::default(),
        }
    }

    #[test]
    fn test_update_frontal_face() {
        let mut state = CalibrationState::default();
        // face 40cm in front of the camera, facing it
        let pose = Affine3A::from_translation(Vec3::new(0.0, 0.0, 0.4));
        state.update(&sample(pose), &camera());

        // 8mm project to 1000 * 0.008 / 0.4 = 20 points
        assert_relative_eq!(state.millimeters_per_pixel.unwrap(), 0.4, epsilon = 1e-4);
        assert_relative_eq!(state.head_yaw_degrees.unwrap(), 0.0, epsilon = 1e-4);
        assert_relative_eq!(state.depth_correction_mm, 3.0, epsilon = 1e-3);
        assert_relative_eq!(state.to_millimeters(155.0).unwrap(), 62.0, epsilon = 1e-2);
    }

    #[test]
    fn test_update_turned_face() {
        let mut state = CalibrationState::default();
        let pose = Affine3A::from_rotation_translation(
            Quat::from_rotation_y(10f32.to_radians()),
            Vec3::new(0.0, 0.0, 0.4),
        );
        state.update(&sample(pose), &camera());

        let yaw = state.head_yaw_degrees.unwrap();
        assert_relative_eq!(yaw.abs(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_degenerate_projection_keeps_previous_ratio() {
        let mut state = CalibrationState::default();
        state.update(
            &sample(Affine3A::from_translation(Vec3::new(0.0, 0.0, 0.4))),
            &camera(),
        );
        let previous = state.millimeters_per_pixel;
        assert!(previous.is_some());

        // face behind the camera, nothing projects
        state.update(
            &sample(Affine3A::from_translation(Vec3::new(0.0, 0.0, -0.4))),
            &camera(),
        );
        assert_eq!(state.millimeters_per_pixel, previous);
    }

    #[test]
    fn test_yaw_unknown_when_origin_on_vertical_axis() {
        let mut state = CalibrationState::default();
        state.update(
            &sample(Affine3A::from_translation(Vec3::new(0.0, 0.3, 0.0))),
            &camera(),
        );
        assert_eq!(state.head_yaw_degrees, None);
    }

    #[test]
    fn test_reset() {
        let mut state = CalibrationState::default();
        state.update(
            &sample(Affine3A::from_translation(Vec3::new(0.0, 0.0, 0.4))),
            &camera(),
        );
        state.reset();
        assert_eq!(state, CalibrationState::default());
        assert_eq!(state.to_millimeters(10.0), None);
    }
}
