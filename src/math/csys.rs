//! Coordinate systems

use serde::{Deserialize, Serialize};

use super::{unit, AffineMap, Vec3};
use crate::error::KernelResult;

/// A Cartesian reference frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// The world frame
    Global,
    /// An orthonormal frame given in world coordinates
    Local {
        origin: Vec3,
        x_axis: Vec3,
        y_axis: Vec3,
        z_axis: Vec3,
    },
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        CoordinateSystem::Global
    }
}

impl CoordinateSystem {
    /// Build a local frame; axes are normalized
    pub fn local(origin: Vec3, x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> KernelResult<Self> {
        Ok(CoordinateSystem::Local {
            origin,
            x_axis: unit(&x_axis, "x-axis")?,
            y_axis: unit(&y_axis, "y-axis")?,
            z_axis: unit(&z_axis, "z-axis")?,
        })
    }

    /// Right-handed orthonormal frame from an approximate x-axis and a normal
    ///
    /// `y = z × x`, then `x = y × z` so the result is orthonormal even when the
    /// inputs are not quite perpendicular.
    pub fn from_x_and_normal(origin: Vec3, x_hint: &Vec3, normal: &Vec3) -> KernelResult<Self> {
        let z = unit(normal, "z-axis")?;
        let x = unit(x_hint, "x-axis")?;
        let y = unit(&z.cross(&x), "y-axis")?;
        let x = y.cross(&z);
        Self::local(origin, x, y, z)
    }

    pub fn origin(&self) -> Vec3 {
        match self {
            CoordinateSystem::Global => Vec3::zeros(),
            CoordinateSystem::Local { origin, .. } => *origin,
        }
    }

    pub fn x_axis(&self) -> Vec3 {
        match self {
            CoordinateSystem::Global => Vec3::x(),
            CoordinateSystem::Local { x_axis, .. } => *x_axis,
        }
    }

    pub fn y_axis(&self) -> Vec3 {
        match self {
            CoordinateSystem::Global => Vec3::y(),
            CoordinateSystem::Local { y_axis, .. } => *y_axis,
        }
    }

    pub fn z_axis(&self) -> Vec3 {
        match self {
            CoordinateSystem::Global => Vec3::z(),
            CoordinateSystem::Local { z_axis, .. } => *z_axis,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, CoordinateSystem::Global)
    }

    /// Map from this frame's coordinates to world coordinates
    pub fn map_to_global(&self) -> AffineMap {
        match self {
            CoordinateSystem::Global => AffineMap::identity(),
            CoordinateSystem::Local {
                origin,
                x_axis,
                y_axis,
                z_axis,
            } => AffineMap::from_columns(x_axis, y_axis, z_axis, *origin),
        }
    }

    /// Map from world coordinates to this frame's coordinates
    pub fn map_to_local(&self) -> AffineMap {
        match self {
            CoordinateSystem::Global => AffineMap::identity(),
            CoordinateSystem::Local {
                origin,
                x_axis,
                y_axis,
                z_axis,
            } => {
                // R^T (p - o) for orthonormal R
                let rot = AffineMap::from_rows(x_axis, y_axis, z_axis, Vec3::zeros());
                let shift = -rot.transform_vector(origin);
                AffineMap::new(rot.matrix, shift)
            }
        }
    }

    /// Map from this frame's coordinates to `other`'s coordinates
    pub fn map_to(&self, other: &CoordinateSystem) -> AffineMap {
        if self == other {
            return AffineMap::identity();
        }
        self.map_to_global().then(&other.map_to_local())
    }
}
