//! Linear shape function of the 3-node triangle
//!
//! Basis: `N1 = u`, `N2 = 1 - u - v`, `N3 = v`, defined on the simplex
//! `u >= 0, v >= 0, u + v <= 1`.

use super::ShapeFunction;
use crate::elements::ElementKind;
use crate::error::{KernelError, KernelResult};
use crate::math::{is_natural_point, Vec3};

/// Round-off allowance on the simplex boundary
const SIMPLEX_SLACK: f64 = 1e-9;

/// Tri-3 shape function
#[derive(Debug, Clone, Copy, Default)]
pub struct Tria3Shape;

pub static TRIA3: Tria3Shape = Tria3Shape;

/// Triangle area from its side lengths
fn heron_area(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    let ab = (b - a).norm();
    let bc = (c - b).norm();
    let ca = (a - c).norm();
    let s = 0.5 * (ab + bc + ca);
    (s * (s - ab) * (s - bc) * (s - ca)).max(0.0).sqrt()
}

impl ShapeFunction for Tria3Shape {
    fn kind(&self) -> ElementKind {
        ElementKind::Tria3
    }

    fn size(&self) -> usize {
        3
    }

    fn space_dimension(&self) -> usize {
        2
    }

    fn is_in_domain(&self, uvw: &Vec3) -> bool {
        is_natural_point(uvw)
            && uvw.x >= -SIMPLEX_SLACK
            && uvw.y >= -SIMPLEX_SLACK
            && uvw.x + uvw.y <= 1.0 + SIMPLEX_SLACK
    }

    fn basis(&self, index: usize, uvw: &Vec3) -> f64 {
        if !self.is_in_domain(uvw) {
            return f64::NAN;
        }
        match index {
            0 => uvw.x,
            1 => 1.0 - uvw.x - uvw.y,
            2 => uvw.y,
            _ => f64::NAN,
        }
    }

    /// Barycentric coordinates from sub-triangle areas
    ///
    /// Returns the weights of nodes 1, 3 and 2, in that order, so `u` and `v`
    /// feed the basis directly and the three components sum to one.
    fn find_natural(&self, point: &Vec3, nodal: &[Vec3], _max_iterations: usize) -> KernelResult<Vec3> {
        self.check_len(nodal.len())?;
        let (p1, p2, p3) = (&nodal[0], &nodal[1], &nodal[2]);

        let area = heron_area(p1, p2, p3);
        if area <= f64::EPSILON {
            return Err(KernelError::InvalidGeometry(
                "triangle has zero area".to_string(),
            ));
        }

        let u = heron_area(p2, p3, point) / area;
        let v = heron_area(p1, p2, point) / area;
        let w = heron_area(p1, p3, point) / area;
        Ok(Vec3::new(u, v, w))
    }

    /// Drop negative weights and rescale the rest to sum to one
    fn clamp_to_domain(&self, uvw: &Vec3) -> Vec3 {
        let weights = uvw.map(|c| c.max(0.0));
        let sum = weights.sum();
        if sum > 0.0 && sum.is_finite() {
            weights / sum
        } else {
            Vec3::new(1.0, 0.0, 0.0)
        }
    }
}
