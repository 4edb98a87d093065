use glam::{Vec2, Vec3};

/// Compute the Euclidean distance between two points.
///
/// # Arguments
///
/// * `a` - A point in 3D space.
/// * `b` - Another point in 3D space.
///
/// # Returns
///
/// The Euclidean distance between the two points. NaN inputs propagate.
///
/// Example:
/// ```
/// use glam::Vec3;
/// use optifit_3d::ops::euclidean_distance;
///
/// let a = Vec3::new(1.0, 2.0, 3.0);
/// let b = Vec3::new(4.0, 5.0, 6.0);
/// let dst = euclidean_distance(a, b);
/// ```
pub fn euclidean_distance(a: Vec3, b: Vec3) -> f32 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

/// Compute the Euclidean distance between two points on a plane.
///
/// Used for distances measured in view (screen) coordinates.
pub fn planar_distance(a: Vec2, b: Vec2) -> f32 {
    planar_distance_squared(a, b).sqrt()
}

/// Squared planar distance, without the square root.
pub fn planar_distance_squared(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x) * (a.x - b.x) + (a.y - b.y) * (a.y - b.y)
}

/// Normalize a vector to unit length.
///
/// A vector whose magnitude is exactly zero maps to the zero vector instead of
/// producing NaN components.
///
/// Example:
/// ```
/// use glam::Vec3;
/// use optifit_3d::ops::normalize_or_zero;
///
/// assert_eq!(normalize_or_zero(Vec3::ZERO), Vec3::ZERO);
/// ```
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length = (v.x * v.x + v.y * v.y + v.z * v.z).sqrt();
    if length == 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(v.x / length, v.y / length, v.z / length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean_distance() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_relative_eq!(euclidean_distance(a, b), 5.196152, epsilon = 1e-5);
    }

    #[test]
    fn test_euclidean_distance_symmetric() {
        let points = [
            Vec3::new(0.012, -0.034, 0.5),
            Vec3::new(-1.0, 2.5, 0.25),
            Vec3::new(3.0, 0.0, -7.0),
        ];
        for a in points {
            for b in points {
                assert_eq!(euclidean_distance(a, b), euclidean_distance(b, a));
            }
            assert_eq!(euclidean_distance(a, a), 0.0);
        }
    }

    #[test]
    fn test_euclidean_distance_nan_propagates() {
        let a = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(euclidean_distance(a, Vec3::ZERO).is_nan());
    }

    #[test]
    fn test_planar_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_relative_eq!(planar_distance(a, b), 5.0);
        assert_relative_eq!(planar_distance_squared(a, b), 25.0);
        assert_eq!(planar_distance(b, b), 0.0);
    }

    #[test]
    fn test_normalize_zero() {
        let n = normalize_or_zero(Vec3::ZERO);
        assert_eq!(n, Vec3::ZERO);
        assert!(!n.is_nan());
    }

    #[test]
    fn test_normalize_unit_length() {
        let vectors = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.3, -4.0, 12.0),
            Vec3::new(1e-3, 2e-3, -5e-4),
        ];
        for v in vectors {
            assert_relative_eq!(normalize_or_zero(v).length(), 1.0, epsilon = 1e-6);
        }
    }
}
