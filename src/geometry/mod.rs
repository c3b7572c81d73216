//! Geometry kernel capability
//!
//! Exact geometric predicates are delegated to a [`GeometryKernel`]. Elements
//! and the model only ever talk to the trait; [`NativeKernel`] is the bundled
//! tolerance-based implementation.

pub mod native;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};
use crate::math::{is_invalid, BoundingBox, BoundingBoxKind, CoordinateSystem, Vec3};

pub use native::NativeKernel;

/// Location of a point relative to a point grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    /// Coincides with a grid point
    Vertex,
    /// On a hull edge
    Edge,
    /// On a hull facet (or inside a planar hull)
    Facet,
    /// Strictly inside a solid hull
    Cell,
    /// In the affine hull of the grid but outside its convex hull
    OutsideConvexHull,
    /// Outside the affine hull of the grid
    OutsideAffineHull,
}

impl LocationType {
    /// True for every location on or inside the convex hull
    pub fn is_inside(&self) -> bool {
        matches!(
            self,
            LocationType::Vertex | LocationType::Edge | LocationType::Facet | LocationType::Cell
        )
    }
}

/// Shape of an intersection result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectionKind {
    Null,
    Point,
    Segment,
    Line,
}

impl IntersectionKind {
    /// Number of points a well-formed result of this kind carries
    pub fn point_count(&self) -> usize {
        match self {
            IntersectionKind::Null => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Segment | IntersectionKind::Line => 2,
        }
    }
}

/// Result of a segment or line intersection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub kind: IntersectionKind,
    pub points: Vec<Vec3>,
}

impl Intersection {
    pub fn null() -> Self {
        Self {
            kind: IntersectionKind::Null,
            points: Vec::new(),
        }
    }

    pub fn point(p: Vec3) -> Self {
        Self {
            kind: IntersectionKind::Point,
            points: vec![p],
        }
    }

    pub fn segment(a: Vec3, b: Vec3) -> Self {
        Self {
            kind: IntersectionKind::Segment,
            points: vec![a, b],
        }
    }

    pub fn line(a: Vec3, b: Vec3) -> Self {
        Self {
            kind: IntersectionKind::Line,
            points: vec![a, b],
        }
    }

    /// Check the point count matches the kind and every point is finite
    pub fn validate(&self) -> KernelResult<()> {
        if self.points.len() != self.kind.point_count() {
            return Err(KernelError::GeometryKernelFailure(format!(
                "{:?} intersection with {} points",
                self.kind,
                self.points.len()
            )));
        }
        if self.points.iter().any(is_invalid) {
            return Err(KernelError::GeometryKernelFailure(
                "intersection point is not finite".to_string(),
            ));
        }
        Ok(())
    }

    /// The intersection point, if the result is exactly one point
    ///
    /// A malformed result is a kernel failure; a well-formed result that is not
    /// a single point is reported as invalid geometry.
    pub fn single_point(&self) -> KernelResult<Vec3> {
        self.validate()?;
        match (self.kind, self.points.first()) {
            (IntersectionKind::Point, Some(p)) => Ok(*p),
            (kind, _) => Err(KernelError::InvalidGeometry(format!(
                "expected a single intersection point, got {kind:?}"
            ))),
        }
    }
}

/// Computational-geometry primitives consumed by the kernel
///
/// Every operation is fallible; implementations return
/// [`KernelError::GeometryKernelFailure`] for empty or non-finite input.
pub trait GeometryKernel: fmt::Debug + Send + Sync {
    /// Axis-aligned box over `points`
    fn aabb(&self, points: &[Vec3]) -> KernelResult<BoundingBox>;

    /// Tight oriented box over `points`
    fn oriented_box(&self, points: &[Vec3]) -> KernelResult<BoundingBox>;

    /// Classify `point` against the convex hull of `grid`
    fn classify_point(&self, point: &Vec3, grid: &[Vec3]) -> KernelResult<LocationType>;

    /// Intersect segments `[a1, a2]` and `[b1, b2]`
    fn intersect_segments(&self, a1: &Vec3, a2: &Vec3, b1: &Vec3, b2: &Vec3)
        -> KernelResult<Intersection>;

    /// Intersect the infinite lines through `a1, a2` and `b1, b2`
    fn intersect_lines(&self, a1: &Vec3, a2: &Vec3, b1: &Vec3, b2: &Vec3)
        -> KernelResult<Intersection>;

    /// Express `point`, given in `source`, in `target`
    fn transform_point(
        &self,
        point: &Vec3,
        source: &CoordinateSystem,
        target: &CoordinateSystem,
    ) -> KernelResult<Vec3>;

    /// Box of the requested kind
    fn bounding_box(&self, kind: BoundingBoxKind, points: &[Vec3]) -> KernelResult<BoundingBox> {
        match kind {
            BoundingBoxKind::AxisAligned => self.aabb(points),
            BoundingBoxKind::Oriented => self.oriented_box(points),
        }
    }
}

/// Kernel handle shared by every element of a model
pub type SharedKernel = Arc<dyn GeometryKernel>;

/// The bundled kernel with default tolerance
pub fn default_kernel() -> SharedKernel {
    Arc::new(NativeKernel::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_point() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Intersection::point(p).single_point().unwrap(), p);
    }

    #[test]
    fn test_non_point_is_invalid_geometry() {
        let err = Intersection::null().single_point().unwrap_err();
        assert!(matches!(err, KernelError::InvalidGeometry(_)));

        let seg = Intersection::segment(Vec3::zeros(), Vec3::x());
        assert!(matches!(
            seg.single_point(),
            Err(KernelError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_malformed_is_kernel_failure() {
        let bad = Intersection {
            kind: IntersectionKind::Point,
            points: vec![Vec3::zeros(), Vec3::x()],
        };
        assert!(matches!(
            bad.single_point(),
            Err(KernelError::GeometryKernelFailure(_))
        ));

        let nan = Intersection::point(Vec3::new(f64::NAN, 0.0, 0.0));
        assert!(matches!(
            nan.single_point(),
            Err(KernelError::GeometryKernelFailure(_))
        ));
    }

    #[test]
    fn test_inside_locations() {
        assert!(LocationType::Facet.is_inside());
        assert!(LocationType::Vertex.is_inside());
        assert!(!LocationType::OutsideConvexHull.is_inside());
        assert!(!LocationType::OutsideAffineHull.is_inside());
    }
}
