//! Bilinear shape function of the 4-node quadrilateral
//!
//! Corner order in natural coordinates:
//!
//! ```text
//!   v
//!   ^
//!   4 ------- 3
//!   |         |
//!   |    +----|--> u
//!   |         |
//!   1 ------- 2
//! ```

use nalgebra::{Matrix2, Vector2};

use super::ShapeFunction;
use crate::elements::ElementKind;
use crate::error::KernelResult;
use crate::math::optimize::nelder_mead_2d;
use crate::math::{is_natural_point, Vec3};

/// Natural coordinates of the four corners
const CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Newton step below which the inversion is considered converged
const STEP_TOLERANCE: f64 = 1e-12;

const MIN_SIMPLEX_ITERATIONS: usize = 400;

/// Quad-4 shape function
#[derive(Debug, Clone, Copy, Default)]
pub struct Quad4Shape;

pub static QUAD4: Quad4Shape = Quad4Shape;

impl Quad4Shape {
    /// `¼(1 ± u)(1 ± v)` without the domain check
    fn raw_basis(index: usize, u: f64, v: f64) -> f64 {
        let (ui, vi) = CORNERS[index];
        0.25 * (1.0 + ui * u) * (1.0 + vi * v)
    }

    /// Partial derivatives of basis `index` with respect to `u` and `v`
    fn raw_derivatives(index: usize, u: f64, v: f64) -> (f64, f64) {
        let (ui, vi) = CORNERS[index];
        (0.25 * ui * (1.0 + vi * v), 0.25 * vi * (1.0 + ui * u))
    }

    fn raw_point(u: f64, v: f64, nodal: &[Vec3]) -> Vec3 {
        nodal
            .iter()
            .enumerate()
            .fold(Vec3::zeros(), |acc, (i, x)| acc + x * Self::raw_basis(i, u, v))
    }

    /// Gauss-Newton on the bilinear map; `None` if it fails to converge
    fn newton(point: &Vec3, nodal: &[Vec3], max_iterations: usize) -> Option<Vector2<f64>> {
        let mut uv = Vector2::zeros();
        for _ in 0..max_iterations {
            let residual = point - Self::raw_point(uv.x, uv.y, nodal);

            let (mut du, mut dv) = (Vec3::zeros(), Vec3::zeros());
            for (i, x) in nodal.iter().enumerate() {
                let (nu, nv) = Self::raw_derivatives(i, uv.x, uv.y);
                du += x * nu;
                dv += x * nv;
            }

            // Normal equations (JᵀJ) δ = Jᵀ r
            let jtj = Matrix2::new(du.dot(&du), du.dot(&dv), dv.dot(&du), dv.dot(&dv));
            let jtr = Vector2::new(du.dot(&residual), dv.dot(&residual));
            let step = jtj.try_inverse()? * jtr;
            uv += step;

            if !uv.iter().all(|c| c.is_finite()) {
                return None;
            }
            if step.norm() < STEP_TOLERANCE {
                return Some(uv);
            }
        }
        None
    }
}

impl ShapeFunction for Quad4Shape {
    fn kind(&self) -> ElementKind {
        ElementKind::Quad4
    }

    fn size(&self) -> usize {
        4
    }

    fn space_dimension(&self) -> usize {
        2
    }

    fn is_in_domain(&self, uvw: &Vec3) -> bool {
        is_natural_point(uvw)
    }

    fn basis(&self, index: usize, uvw: &Vec3) -> f64 {
        if index >= self.size() || !self.is_in_domain(uvw) {
            return f64::NAN;
        }
        Self::raw_basis(index, uvw.x, uvw.y)
    }

    fn find_natural(&self, point: &Vec3, nodal: &[Vec3], max_iterations: usize) -> KernelResult<Vec3> {
        self.check_len(nodal.len())?;

        if let Some(uv) = Self::newton(point, nodal, max_iterations) {
            return Ok(Vec3::new(uv.x, uv.y, 0.0));
        }

        log::debug!("quad-4 Newton inversion did not converge, falling back to simplex search");
        let distance = |uv: [f64; 2]| (Self::raw_point(uv[0], uv[1], nodal) - point).norm_squared();
        let budget = (max_iterations * 20).max(MIN_SIMPLEX_ITERATIONS);
        let min = nelder_mead_2d(distance, [0.0, 0.0], 0.5, 1e-24, budget);
        Ok(Vec3::new(min.point[0], min.point[1], 0.0))
    }

    fn clamp_to_domain(&self, uvw: &Vec3) -> Vec3 {
        Vec3::new(uvw.x.clamp(-1.0, 1.0), uvw.y.clamp(-1.0, 1.0), 0.0)
    }
}
