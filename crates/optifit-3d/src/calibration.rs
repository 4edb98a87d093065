use glam::{Affine3A, Vec2, Vec3};

use crate::camera::ViewCamera;
use crate::ops::{euclidean_distance, planar_distance};
use crate::MILLIMETERS_PER_METER;

/// Ratio between a known world span and its projection on the view.
///
/// # Arguments
///
/// * `world_start` - First endpoint of the reference span, in meters.
/// * `world_end` - Second endpoint of the reference span, in meters.
/// * `screen_start` - Projection of `world_start` in view coordinates.
/// * `screen_end` - Projection of `world_end` in view coordinates.
///
/// # Returns
///
/// How many millimeters one view point covers at the depth of the span, or
/// `None` when the projected endpoints coincide (or the ratio is otherwise not
/// finite). Multiplying a view distance by this ratio yields millimeters.
///
/// Example:
/// ```
/// use glam::{Vec2, Vec3};
/// use optifit_3d::calibration::millimeters_per_pixel;
///
/// let ratio = millimeters_per_pixel(
///     Vec3::new(0.0, 0.0, 0.3),
///     Vec3::new(0.01, 0.0, 0.3),
///     Vec2::new(100.0, 100.0),
///     Vec2::new(120.0, 100.0),
/// );
/// assert!((ratio.unwrap() - 0.5).abs() < 1e-5);
/// ```
pub fn millimeters_per_pixel(
    world_start: Vec3,
    world_end: Vec3,
    screen_start: Vec2,
    screen_end: Vec2,
) -> Option<f32> {
    let pixels = planar_distance(screen_end, screen_start);
    if pixels.is_nan() || pixels <= f32::EPSILON {
        return None;
    }

    let millimeters = euclidean_distance(world_start, world_end) * MILLIMETERS_PER_METER;
    let ratio = millimeters / pixels;
    ratio.is_finite().then_some(ratio)
}

/// Lift a reference span from the face frame to the world, project it and
/// compute its millimeter per pixel ratio.
///
/// # Arguments
///
/// * `camera` - The camera rendering the view.
/// * `world_from_face` - Pose of the tracked face in world coordinates.
/// * `start` - First endpoint in the face frame.
/// * `end` - Second endpoint in the face frame.
///
/// # Returns
///
/// `None` if either endpoint fails to project or the projection is degenerate.
pub fn project_and_calibrate(
    camera: &ViewCamera,
    world_from_face: &Affine3A,
    start: Vec3,
    end: Vec3,
) -> Option<f32> {
    let start_world = world_from_face.transform_point3(start);
    let end_world = world_from_face.transform_point3(end);

    let start_screen = camera.project_point(start_world)?;
    let end_screen = camera.project_point(end_world)?;

    millimeters_per_pixel(start_world, end_world, start_screen, end_screen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraIntrinsic;
    use approx::assert_relative_eq;

    #[test]
    fn test_millimeters_per_pixel() {
        // a 10mm span covering 20 points
        let ratio = millimeters_per_pixel(
            Vec3::new(0.0, 0.0, 0.3),
            Vec3::new(0.0, 0.01, 0.3),
            Vec2::new(50.0, 50.0),
            Vec2::new(50.0, 70.0),
        )
        .unwrap();
        assert_relative_eq!(ratio, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_millimeters_per_pixel_coincident_projection() {
        let ratio = millimeters_per_pixel(
            Vec3::new(0.0, 0.0, 0.3),
            Vec3::new(0.0, 0.0, 0.31),
            Vec2::new(50.0, 50.0),
            Vec2::new(50.0, 50.0),
        );
        assert!(ratio.is_none());
    }

    #[test]
    fn test_millimeters_per_pixel_nan_projection() {
        let ratio = millimeters_per_pixel(
            Vec3::ZERO,
            Vec3::X,
            Vec2::new(f32::NAN, 0.0),
            Vec2::new(10.0, 0.0),
        );
        assert!(ratio.is_none());
    }

    #[test]
    fn test_project_and_calibrate() {
        let camera = ViewCamera::new(
            CameraIntrinsic {
                fx: 600.0,
                fy: 600.0,
                cx: 200.0,
                cy: 400.0,
            },
            Affine3A::IDENTITY,
        );
        // face 30cm in front of the camera
        let world_from_face = Affine3A::from_translation(Vec3::new(0.0, 0.0, 0.3));

        // 6mm vertical span: 600 * 0.006 / 0.3 = 12 points
        let ratio = project_and_calibrate(
            &camera,
            &world_from_face,
            Vec3::new(0.03, 0.003, 0.0),
            Vec3::new(0.03, -0.003, 0.0),
        )
        .unwrap();
        assert_relative_eq!(ratio, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_project_and_calibrate_behind_camera() {
        let camera = ViewCamera::new(
            CameraIntrinsic {
                fx: 600.0,
                fy: 600.0,
                cx: 200.0,
                cy: 400.0,
            },
            Affine3A::IDENTITY,
        );
        let world_from_face = Affine3A::from_translation(Vec3::new(0.0, 0.0, -0.3));

        let ratio = project_and_calibrate(
            &camera,
            &world_from_face,
            Vec3::new(0.0, 0.003, 0.0),
            Vec3::new(0.0, -0.003, 0.0),
        );
        assert!(ratio.is_none());
    }
}
