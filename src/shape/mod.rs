//! Shape functions
//!
//! Each element type has one stateless shape function mapping natural
//! coordinates `(u, v, w)` to world coordinates and back. Basis functions
//! return NaN outside their domain; callers are expected to check.

pub mod quad4;
pub mod tria3;

use crate::elements::ElementKind;
use crate::error::{KernelError, KernelResult};
use crate::math::{StressTensor, Vec3};

pub use quad4::{Quad4Shape, QUAD4};
pub use tria3::{Tria3Shape, TRIA3};

/// Interpolation contract of an element type
pub trait ShapeFunction: Send + Sync {
    /// Element type this shape function belongs to
    fn kind(&self) -> ElementKind;

    /// Number of basis functions (equals the number of corner nodes)
    fn size(&self) -> usize;

    /// Number of natural coordinates actually used
    fn space_dimension(&self) -> usize;

    /// True if `uvw` lies in the natural domain
    fn is_in_domain(&self, uvw: &Vec3) -> bool;

    /// Value of basis function `index` at `uvw`
    ///
    /// NaN outside the domain or for an index past `size()`.
    fn basis(&self, index: usize, uvw: &Vec3) -> f64;

    /// Natural coordinates of `point` given the corner coordinates
    ///
    /// The result is not guaranteed to reproduce `point`; callers validate the
    /// round trip with [`ShapeFunction::point_at`].
    fn find_natural(&self, point: &Vec3, nodal: &[Vec3], max_iterations: usize) -> KernelResult<Vec3>;

    /// Nearest point of the natural domain to `uvw`
    ///
    /// Points already in the domain are returned unchanged.
    fn clamp_to_domain(&self, uvw: &Vec3) -> Vec3;

    fn basis_values(&self, uvw: &Vec3) -> Vec<f64> {
        (0..self.size()).map(|i| self.basis(i, uvw)).collect()
    }

    /// World coordinates at `uvw`
    fn point_at(&self, uvw: &Vec3, nodal: &[Vec3]) -> KernelResult<Vec3> {
        self.check_len(nodal.len())?;
        Ok(self
            .basis_values(uvw)
            .iter()
            .zip(nodal)
            .fold(Vec3::zeros(), |acc, (n, x)| acc + x * *n))
    }

    /// Interpolate nodal tensors at `uvw`
    ///
    /// Outside the domain the result contains NaN.
    fn interpolate_tensor(&self, uvw: &Vec3, nodal: &[StressTensor]) -> KernelResult<StressTensor> {
        self.check_len(nodal.len())?;
        Ok(self
            .basis_values(uvw)
            .iter()
            .zip(nodal)
            .fold(StressTensor::zero(), |acc, (n, t)| acc + *t * *n))
    }

    fn check_len(&self, actual: usize) -> KernelResult<()> {
        if actual != self.size() {
            return Err(KernelError::ShapeFunctionMismatch {
                expected: self.size(),
                actual,
            });
        }
        Ok(())
    }
}
