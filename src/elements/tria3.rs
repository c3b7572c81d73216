//! Geometry of the 3-node triangle

use crate::error::KernelResult;
use crate::math::{CoordinateSystem, Vec3};

/// The representative point doubles as the centroid
pub(super) fn centroid(coords: &Vec3) -> Vec3 {
    *coords
}

/// X along `P1-P2`, Z normal to the triangle
pub(super) fn local_csys(origin: &Vec3, corners: &[Vec3]) -> KernelResult<CoordinateSystem> {
    let (p1, p2, p3) = (&corners[0], &corners[1], &corners[2]);
    let x = p2 - p1;
    let z = x.cross(&(p3 - p2));
    CoordinateSystem::from_x_and_normal(*origin, &x, &z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_in_xz_plane() {
        let corners = [Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0)];
        let origin = Vec3::new(2.0 / 3.0, 0.0, 2.0 / 3.0);
        let csys = local_csys(&origin, &corners).unwrap();
        assert_relative_eq!(csys.x_axis(), Vec3::x(), epsilon = 1e-12);
        assert_relative_eq!(csys.z_axis(), -Vec3::y(), epsilon = 1e-12);
        assert_relative_eq!(csys.y_axis(), Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(csys.origin(), origin);
    }

    #[test]
    fn test_collinear_corners_rejected() {
        let corners = [Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0];
        assert!(local_csys(&Vec3::zeros(), &corners).is_err());
    }
}
