//! Bounding boxes

use serde::{Deserialize, Serialize};

use super::{CoordinateSystem, Vec3};
use crate::error::{KernelError, KernelResult};

/// Type of bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundingBoxKind {
    /// Axis-aligned bounding box
    AxisAligned,
    /// Optimal oriented bounding box
    Oriented,
}

/// A box enclosing a set of points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundingBox {
    /// Box aligned with the world axes
    Aabb { min: Vec3, max: Vec3 },
    /// Box aligned with `frame`; `min`/`max` are in frame coordinates
    Oriented {
        frame: CoordinateSystem,
        min: Vec3,
        max: Vec3,
    },
}

impl BoundingBox {
    /// Axis-aligned box from its defining corners
    ///
    /// Fails if any component of `min` exceeds `max` or is not finite.
    pub fn aabb(min: Vec3, max: Vec3) -> KernelResult<Self> {
        check_corners(&min, &max)?;
        Ok(BoundingBox::Aabb { min, max })
    }

    pub fn oriented(frame: CoordinateSystem, min: Vec3, max: Vec3) -> KernelResult<Self> {
        check_corners(&min, &max)?;
        Ok(BoundingBox::Oriented { frame, min, max })
    }

    pub fn kind(&self) -> BoundingBoxKind {
        match self {
            BoundingBox::Aabb { .. } => BoundingBoxKind::AxisAligned,
            BoundingBox::Oriented { .. } => BoundingBoxKind::Oriented,
        }
    }

    /// Closed containment test, boundary included
    pub fn contains(&self, point: &Vec3) -> bool {
        self.contains_within(point, 0.0)
    }

    /// Containment in the box grown by `tolerance` on every side
    pub fn contains_within(&self, point: &Vec3, tolerance: f64) -> bool {
        match self {
            BoundingBox::Aabb { min, max } => within(point, min, max, tolerance),
            BoundingBox::Oriented { frame, min, max } => {
                let local = frame.map_to_local().transform_point(point);
                within(&local, min, max, tolerance)
            }
        }
    }

    /// A box collapsed onto a single point
    pub fn is_singular(&self) -> bool {
        let (min, max) = self.corners();
        min == max
    }

    /// Defining corners, in the box's own frame
    pub fn corners(&self) -> (Vec3, Vec3) {
        match self {
            BoundingBox::Aabb { min, max } | BoundingBox::Oriented { min, max, .. } => (*min, *max),
        }
    }

    pub fn extents(&self) -> Vec3 {
        let (min, max) = self.corners();
        max - min
    }
}

fn within(p: &Vec3, min: &Vec3, max: &Vec3, tolerance: f64) -> bool {
    (0..3).all(|i| p[i] >= min[i] - tolerance && p[i] <= max[i] + tolerance)
}

fn check_corners(min: &Vec3, max: &Vec3) -> KernelResult<()> {
    let finite = min.iter().chain(max.iter()).all(|c| c.is_finite());
    if !finite || (0..3).any(|i| min[i] > max[i]) {
        return Err(KernelError::GeometryKernelFailure(format!(
            "malformed bounding box: min {:?}, max {:?}",
            min.as_slice(),
            max.as_slice()
        )));
    }
    Ok(())
}
