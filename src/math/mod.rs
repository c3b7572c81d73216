//! Mathematical utilities for geometric queries

pub mod affine;
pub mod bbox;
pub mod csys;
pub mod optimize;
pub mod tensor;

use nalgebra::{Matrix3, Vector3};

use crate::error::{KernelError, KernelResult};

pub use affine::AffineMap;
pub use bbox::{BoundingBox, BoundingBoxKind};
pub use csys::CoordinateSystem;
pub use tensor::StressTensor;

pub type Vec3 = Vector3<f64>;
pub type Mat3 = Matrix3<f64>;

/// Global linear tolerance
pub const LINEAR_TOLERANCE: f64 = 1e-6;

/// Check that a single parameter lies in the natural interval [-1, 1]
#[inline]
pub fn is_natural_coordinate(u: f64) -> bool {
    (-1.0..=1.0).contains(&u)
}

/// Check that every component of `uvw` lies in [-1, 1]
pub fn is_natural_point(uvw: &Vec3) -> bool {
    uvw.iter().all(|&c| is_natural_coordinate(c))
}

/// True if any component is NaN or infinite
pub fn is_invalid(v: &Vec3) -> bool {
    v.iter().any(|c| !c.is_finite())
}

/// Normalize a vector, rejecting zero length
pub fn unit(v: &Vec3, what: &str) -> KernelResult<Vec3> {
    let n = v.norm();
    if n < LINEAR_TOLERANCE || !n.is_finite() {
        return Err(KernelError::InvalidGeometry(format!(
            "{what} has zero length"
        )));
    }
    Ok(v / n)
}

/// Intersection of the angle bisector from `vertex` with the base `[b, c]`
///
/// ```text
///            (A)
///           / | \
///          /  |  \
///        (B)-(D)-(C)
/// ```
///
/// D splits BC in the ratio AB : AC.
pub fn bisector_base_intersection(
    vertex: &Vec3,
    b: &Vec3,
    c: &Vec3,
    tolerance: f64,
) -> KernelResult<Vec3> {
    let ab = (b - vertex).norm();
    let ac = (c - vertex).norm();
    let cb = (c - b).norm();

    if ab < tolerance || cb < tolerance {
        return Err(KernelError::InvalidGeometry(
            "bisector base or side has zero length".to_string(),
        ));
    }

    let k = 1.0 + ac / ab;
    let bd = cb / k;
    let cd = bd * ac / ab;

    if (cb - (bd + cd)).abs() > tolerance {
        return Err(KernelError::InvalidGeometry(
            "bisector does not split the base".to_string(),
        ));
    }

    let weight = bd / cb;
    if !(0.0..=1.0).contains(&weight) {
        return Err(KernelError::InvalidGeometry(format!(
            "bisector weight {weight} outside the base"
        )));
    }

    Ok(b * (1.0 - weight) + c * weight)
}
