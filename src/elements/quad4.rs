//! Geometry of the 4-node quadrilateral

use crate::error::KernelResult;
use crate::geometry::SharedKernel;
use crate::math::{bisector_base_intersection, CoordinateSystem, Vec3};

/// Intersection of the diagonals `P1-P3` and `P2-P4`
///
/// Anything but a single intersection point means the quad is degenerate
/// or non-planar.
pub(super) fn centroid(corners: &[Vec3], kernel: &SharedKernel) -> KernelResult<Vec3> {
    let (p1, p2, p3, p4) = (&corners[0], &corners[1], &corners[2], &corners[3]);
    kernel.intersect_segments(p1, p3, p2, p4)?.single_point()
}

/// Element frame anchored at `origin`
///
/// X points from the centroid to where the bisector of the angle `P2-C-P3`
/// meets the edge `P2-P3`; Z follows the cross product of the diagonals.
pub(super) fn local_csys(
    origin: &Vec3,
    corners: &[Vec3],
    centroid: &Vec3,
    tolerance: f64,
) -> KernelResult<CoordinateSystem> {
    let (p1, p2, p3, p4) = (&corners[0], &corners[1], &corners[2], &corners[3]);

    let foot = bisector_base_intersection(centroid, p2, p3, tolerance)?;
    let x = foot - centroid;
    let z = (p3 - p1).cross(&(p4 - p2));

    CoordinateSystem::from_x_and_normal(*origin, &x, &z)
}
