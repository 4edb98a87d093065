use glam::{Affine3A, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Represents the intrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsic {
    /// The focal length in the x direction
    pub fx: f32,
    /// The focal length in the y direction
    pub fy: f32,
    /// The x coordinate of the principal point
    pub cx: f32,
    /// The y coordinate of the principal point
    pub cy: f32,
}

/// The camera that renders the live view, in view (screen point) units.
///
/// The camera looks down its +Z axis and image y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewCamera {
    /// Intrinsic parameters expressed in view points.
    pub intrinsic: CameraIntrinsic,
    /// Rigid transform taking world coordinates into the camera frame.
    pub camera_from_world: Affine3A,
}

impl ViewCamera {
    /// Creates a camera from its intrinsics and world to camera transform.
    pub fn new(intrinsic: CameraIntrinsic, camera_from_world: Affine3A) -> Self {
        Self {
            intrinsic,
            camera_from_world,
        }
    }

    /// Project a world point onto the view.
    ///
    /// # Returns
    ///
    /// The `[u, v]` view coordinates, or `None` if the point is behind the
    /// camera (z <= 0) or the projection is not finite.
    ///
    /// Example:
    /// ```
    /// use glam::{Affine3A, Vec3};
    /// use optifit_3d::camera::{CameraIntrinsic, ViewCamera};
    ///
    /// let camera = ViewCamera::new(
    ///     CameraIntrinsic { fx: 1450.0, fy: 1450.0, cx: 207.0, cy: 448.0 },
    ///     Affine3A::IDENTITY,
    /// );
    /// let nose = camera.project_point(Vec3::new(0.0, 0.0, 0.35)).unwrap();
    /// assert_eq!(nose.x, 207.0);
    /// assert!(camera.project_point(Vec3::new(0.0, 0.0, -0.35)).is_none());
    /// ```
    pub fn project_point(&self, point_world: Vec3) -> Option<Vec2> {
        let pc = self.camera_from_world.transform_point3(point_world);

        if pc.z <= 0.0 {
            return None;
        }

        let inv_z = 1.0 / pc.z;
        let u = self.intrinsic.fx * pc.x * inv_z + self.intrinsic.cx;
        let v = self.intrinsic.fy * pc.y * inv_z + self.intrinsic.cy;

        let uv = Vec2::new(u, v);
        uv.is_finite().then_some(uv)
    }
}
