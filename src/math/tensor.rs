//! Symmetric second-rank stress tensor

use std::ops::{Add, Mul};

use nalgebra::SymmetricEigen;
use serde::{Deserialize, Serialize};

use super::{Mat3, Vec3};

/// A symmetric 3x3 stress tensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressTensor {
    matrix: Mat3,
}

impl Default for StressTensor {
    fn default() -> Self {
        Self::zero()
    }
}

impl StressTensor {
    /// Build from the six independent components
    pub fn new(xx: f64, yy: f64, zz: f64, xy: f64, yz: f64, zx: f64) -> Self {
        #[rustfmt::skip]
        let matrix = Mat3::new(
            xx, xy, zx,
            xy, yy, yz,
            zx, yz, zz,
        );
        Self { matrix }
    }

    /// Build from `[XX, YY, ZZ, XY, YZ, ZX]`
    pub fn from_components(c: &[f64; 6]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4], c[5])
    }

    pub fn zero() -> Self {
        Self {
            matrix: Mat3::zeros(),
        }
    }

    /// Components as `[XX, YY, ZZ, XY, YZ, ZX]`
    pub fn components(&self) -> [f64; 6] {
        [self.xx(), self.yy(), self.zz(), self.xy(), self.yz(), self.zx()]
    }

    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    pub fn xx(&self) -> f64 {
        self.matrix[(0, 0)]
    }
    pub fn yy(&self) -> f64 {
        self.matrix[(1, 1)]
    }
    pub fn zz(&self) -> f64 {
        self.matrix[(2, 2)]
    }
    pub fn xy(&self) -> f64 {
        self.matrix[(0, 1)]
    }
    pub fn yz(&self) -> f64 {
        self.matrix[(1, 2)]
    }
    pub fn zx(&self) -> f64 {
        self.matrix[(0, 2)]
    }

    pub fn contains_nan(&self) -> bool {
        self.matrix.iter().any(|c| c.is_nan())
    }

    pub fn is_zero(&self) -> bool {
        self.matrix.iter().all(|&c| c == 0.0)
    }

    /// Principal invariants (I1, I2, I3)
    pub fn principal_invariants(&self) -> Vec3 {
        let i1 = self.matrix.trace();
        let square_trace = (self.matrix * self.matrix).trace();
        let i2 = 0.5 * (i1 * i1 - square_trace);
        let i3 = self.matrix.determinant();
        Vec3::new(i1, i2, i3)
    }

    /// Main invariants (J1, J2, J3) derived from the principal ones
    pub fn main_invariants(&self) -> Vec3 {
        let i = self.principal_invariants();
        let (i1, i2, i3) = (i.x, i.y, i.z);
        Vec3::new(
            i1,
            i1 * i1 - 2.0 * i2,
            i1 * i1 * i1 - 3.0 * i1 * i2 + 3.0 * i3,
        )
    }

    /// Stress invariants in the engineering sign convention
    ///
    /// The second invariant carries `+ (xy² + yz² + zx²)`.
    pub fn stress_invariants(&self) -> Vec3 {
        let (sxx, syy, szz) = (self.xx(), self.yy(), self.zz());
        let (sxy, syz, szx) = (self.xy(), self.yz(), self.zx());

        let i1 = sxx + syy + szz;
        let i2 = sxx * syy + syy * szz + szz * sxx + (sxy * sxy + syz * syz + szx * szx);
        let i3 = sxx * syy * szz - sxx * syz * syz - syy * szx * szx - szz * sxy * sxy
            + 2.0 * sxy * syz * szx;
        Vec3::new(i1, i2, i3)
    }

    /// Principal stresses, sorted descending
    pub fn principal_stresses(&self) -> Vec3 {
        let eigen = SymmetricEigen::new(self.matrix);
        let mut values = [
            eigen.eigenvalues[0],
            eigen.eigenvalues[1],
            eigen.eigenvalues[2],
        ];
        values.sort_by(|a, b| b.total_cmp(a));
        Vec3::new(values[0], values[1], values[2])
    }

    /// Von Mises equivalent stress
    pub fn von_mises(&self) -> f64 {
        let (sxx, syy, szz) = (self.xx(), self.yy(), self.zz());
        let (sxy, syz, szx) = (self.xy(), self.yz(), self.zx());
        (0.5 * ((sxx - syy).powi(2) + (syy - szz).powi(2) + (szz - sxx).powi(2))
            + 3.0 * (sxy * sxy + syz * syz + szx * szx))
            .sqrt()
    }
}

impl Add for StressTensor {
    type Output = StressTensor;

    fn add(self, rhs: StressTensor) -> StressTensor {
        StressTensor {
            matrix: self.matrix + rhs.matrix,
        }
    }
}

impl Mul<f64> for StressTensor {
    type Output = StressTensor;

    fn mul(self, rhs: f64) -> StressTensor {
        StressTensor {
            matrix: self.matrix * rhs,
        }
    }
}
