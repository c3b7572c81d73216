//! Pure-Rust geometry kernel
//!
//! Tolerance-based predicates, adequate for well-shaped shell meshes. Exact
//! arithmetic is not attempted.

use nalgebra::{SymmetricEigen, Vector2};

use super::{GeometryKernel, Intersection, LocationType};
use crate::error::{KernelError, KernelResult};
use crate::math::{is_invalid, BoundingBox, CoordinateSystem, Mat3, Vec3, LINEAR_TOLERANCE};

type Vec2 = Vector2<f64>;

/// In-process geometry kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeKernel {
    /// Absolute distance below which two points coincide
    pub tolerance: f64,
}

impl Default for NativeKernel {
    fn default() -> Self {
        Self {
            tolerance: LINEAR_TOLERANCE,
        }
    }
}

impl NativeKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn check_points(points: &[Vec3], what: &str) -> KernelResult<()> {
        if points.is_empty() {
            return Err(KernelError::GeometryKernelFailure(format!(
                "{what}: empty point set"
            )));
        }
        if points.iter().any(is_invalid) {
            return Err(KernelError::GeometryKernelFailure(format!(
                "{what}: non-finite coordinate"
            )));
        }
        Ok(())
    }

    /// Orthonormal basis of the affine hull of `points` around `points[0]`
    fn affine_basis(&self, points: &[Vec3]) -> Vec<Vec3> {
        let origin = points[0];
        let mut basis: Vec<Vec3> = Vec::with_capacity(3);
        for p in &points[1..] {
            let mut v = p - origin;
            for e in &basis {
                v -= e * e.dot(&v);
            }
            let n = v.norm();
            if n > self.tolerance {
                basis.push(v / n);
                if basis.len() == 3 {
                    break;
                }
            }
        }
        basis
    }

    fn classify_on_line(&self, point: &Vec3, grid: &[Vec3], axis: &Vec3) -> LocationType {
        let origin = grid[0];
        let d = point - origin;
        let t = axis.dot(&d);
        if (d - axis * t).norm() > self.tolerance {
            return LocationType::OutsideAffineHull;
        }

        let (lo, hi) = grid
            .iter()
            .map(|g| axis.dot(&(g - origin)))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s), hi.max(s))
            });

        if t >= lo - self.tolerance && t <= hi + self.tolerance {
            LocationType::Edge
        } else {
            LocationType::OutsideConvexHull
        }
    }

    fn classify_on_plane(
        &self,
        point: &Vec3,
        grid: &[Vec3],
        e1: &Vec3,
        e2: &Vec3,
    ) -> KernelResult<LocationType> {
        let origin = grid[0];
        let normal = e1.cross(e2);
        let d = point - origin;
        if normal.dot(&d).abs() > self.tolerance {
            return Ok(LocationType::OutsideAffineHull);
        }

        let project = |q: &Vec3| {
            let r = q - origin;
            Vec2::new(e1.dot(&r), e2.dot(&r))
        };
        let p = project(point);
        let planar: Vec<Vec2> = grid.iter().map(project).collect();
        let hull = convex_hull_2d(planar);
        if hull.len() < 3 {
            return Err(KernelError::GeometryKernelFailure(
                "planar hull has fewer than three vertices".to_string(),
            ));
        }

        let mut inside = true;
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            if distance_to_segment_2d(&p, &a, &b) <= self.tolerance {
                return Ok(LocationType::Edge);
            }
            let edge = b - a;
            let signed = cross_2d(&edge, &(p - a)) / edge.norm();
            if signed < 0.0 {
                inside = false;
            }
        }

        Ok(if inside {
            LocationType::Facet
        } else {
            LocationType::OutsideConvexHull
        })
    }

    fn classify_in_space(&self, point: &Vec3, grid: &[Vec3]) -> LocationType {
        // Supporting planes of the hull, normals pointing outward
        let mut planes: Vec<(Vec3, f64)> = Vec::new();
        let n = grid.len();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let normal = (grid[j] - grid[i]).cross(&(grid[k] - grid[i]));
                    let len = normal.norm();
                    if len <= self.tolerance {
                        continue;
                    }
                    let mut normal = normal / len;
                    let mut offset = normal.dot(&grid[i]);

                    let above = grid.iter().any(|g| normal.dot(g) - offset > self.tolerance);
                    let below = grid.iter().any(|g| normal.dot(g) - offset < -self.tolerance);
                    if above && below {
                        continue;
                    }
                    if above {
                        normal = -normal;
                        offset = -offset;
                    }
                    let duplicate = planes.iter().any(|(m, o)| {
                        m.dot(&normal) > 1.0 - self.tolerance
                            && (o - offset).abs() <= self.tolerance
                    });
                    if !duplicate {
                        planes.push((normal, offset));
                    }
                }
            }
        }

        let mut touching = 0;
        for (normal, offset) in &planes {
            let distance = normal.dot(point) - offset;
            if distance > self.tolerance {
                return LocationType::OutsideConvexHull;
            }
            if distance.abs() <= self.tolerance {
                touching += 1;
            }
        }

        match touching {
            0 => LocationType::Cell,
            1 => LocationType::Facet,
            _ => LocationType::Edge,
        }
    }
}

impl GeometryKernel for NativeKernel {
    fn aabb(&self, points: &[Vec3]) -> KernelResult<BoundingBox> {
        Self::check_points(points, "aabb")?;
        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        BoundingBox::aabb(min, max)
    }

    fn oriented_box(&self, points: &[Vec3]) -> KernelResult<BoundingBox> {
        Self::check_points(points, "oriented box")?;

        let centroid = points.iter().sum::<Vec3>() / points.len() as f64;
        let mut cov = Mat3::zeros();
        for p in points {
            let d = p - centroid;
            cov += d * d.transpose();
        }

        // Principal axes, largest spread first, right-handed
        let eigen = SymmetricEigen::new(cov);
        let mut order = [0usize, 1, 2];
        order.sort_by(|&i, &j| eigen.eigenvalues[j].total_cmp(&eigen.eigenvalues[i]));
        let x: Vec3 = eigen.eigenvectors.column(order[0]).into_owned();
        let y: Vec3 = eigen.eigenvectors.column(order[1]).into_owned();
        let z = x.cross(&y);

        let frame = CoordinateSystem::local(centroid, x, y, z)?;
        let to_local = frame.map_to_local();
        let local = to_local.transform_points(points);

        let mut min = local[0];
        let mut max = local[0];
        for p in &local[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        BoundingBox::oriented(frame, min, max)
    }

    fn classify_point(&self, point: &Vec3, grid: &[Vec3]) -> KernelResult<LocationType> {
        Self::check_points(grid, "classify point")?;
        if is_invalid(point) {
            return Err(KernelError::GeometryKernelFailure(
                "classify point: non-finite query point".to_string(),
            ));
        }

        let basis = self.affine_basis(grid);
        let on_vertex = || grid.iter().any(|g| (g - point).norm() <= self.tolerance);

        let location = match basis.len() {
            0 => {
                if on_vertex() {
                    LocationType::Vertex
                } else {
                    LocationType::OutsideAffineHull
                }
            }
            1 => match self.classify_on_line(point, grid, &basis[0]) {
                LocationType::Edge if on_vertex() => LocationType::Vertex,
                other => other,
            },
            2 => match self.classify_on_plane(point, grid, &basis[0], &basis[1])? {
                loc if loc.is_inside() && on_vertex() => LocationType::Vertex,
                other => other,
            },
            _ => match self.classify_in_space(point, grid) {
                loc if loc.is_inside() && on_vertex() => LocationType::Vertex,
                other => other,
            },
        };
        Ok(location)
    }

    fn intersect_segments(
        &self,
        a1: &Vec3,
        a2: &Vec3,
        b1: &Vec3,
        b2: &Vec3,
    ) -> KernelResult<Intersection> {
        Self::check_points(&[*a1, *a2, *b1, *b2], "intersect segments")?;
        let tol = self.tolerance;

        let d1 = a2 - a1;
        let d2 = b2 - b1;
        let r = a1 - b1;
        let a = d1.dot(&d1);
        let e = d2.dot(&d2);
        let f = d2.dot(&r);

        // Degenerate segments
        if a <= tol * tol && e <= tol * tol {
            return Ok(if r.norm() <= tol {
                Intersection::point(*a1)
            } else {
                Intersection::null()
            });
        }
        if a <= tol * tol {
            let t = (f / e).clamp(0.0, 1.0);
            let q = b1 + d2 * t;
            return Ok(if (q - a1).norm() <= tol {
                Intersection::point(*a1)
            } else {
                Intersection::null()
            });
        }
        if e <= tol * tol {
            let s = ((b1 - a1).dot(&d1) / a).clamp(0.0, 1.0);
            let q = a1 + d1 * s;
            return Ok(if (q - b1).norm() <= tol {
                Intersection::point(*b1)
            } else {
                Intersection::null()
            });
        }

        // Parallel segments: overlap along the shared line, if any
        if d1.cross(&d2).norm() <= tol * a.sqrt() * e.sqrt() {
            let offset = (b1 - a1).cross(&d1).norm() / a.sqrt();
            if offset > tol {
                return Ok(Intersection::null());
            }
            let t1 = (b1 - a1).dot(&d1) / a;
            let t2 = (b2 - a1).dot(&d1) / a;
            let lo = t1.min(t2).max(0.0);
            let hi = t1.max(t2).min(1.0);
            let length = a.sqrt();
            if (lo - hi) * length > tol {
                return Ok(Intersection::null());
            }
            if (hi - lo) * length <= tol {
                return Ok(Intersection::point(a1 + d1 * lo));
            }
            return Ok(Intersection::segment(a1 + d1 * lo, a1 + d1 * hi));
        }

        // Closest approach of two non-parallel segments
        let b = d1.dot(&d2);
        let c = d1.dot(&r);
        let denom = a * e - b * b;
        let mut s = ((b * f - c * e) / denom).clamp(0.0, 1.0);
        let mut t = (b * s + f) / e;
        if t < 0.0 {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else if t > 1.0 {
            t = 1.0;
            s = ((b - c) / a).clamp(0.0, 1.0);
        }

        let p = a1 + d1 * s;
        let q = b1 + d2 * t;
        Ok(if (p - q).norm() <= tol {
            Intersection::point((p + q) * 0.5)
        } else {
            Intersection::null()
        })
    }

    fn intersect_lines(
        &self,
        a1: &Vec3,
        a2: &Vec3,
        b1: &Vec3,
        b2: &Vec3,
    ) -> KernelResult<Intersection> {
        Self::check_points(&[*a1, *a2, *b1, *b2], "intersect lines")?;
        let tol = self.tolerance;

        let d1 = a2 - a1;
        let d2 = b2 - b1;
        let a = d1.dot(&d1);
        let e = d2.dot(&d2);
        if a <= tol * tol || e <= tol * tol {
            return Err(KernelError::InvalidGeometry(
                "line through coincident points".to_string(),
            ));
        }

        let r = a1 - b1;
        if d1.cross(&d2).norm() <= tol * a.sqrt() * e.sqrt() {
            let offset = (b1 - a1).cross(&d1).norm() / a.sqrt();
            return Ok(if offset <= tol {
                Intersection::line(*a1, *a2)
            } else {
                Intersection::null()
            });
        }

        let b = d1.dot(&d2);
        let c = d1.dot(&r);
        let f = d2.dot(&r);
        let denom = a * e - b * b;
        let s = (b * f - c * e) / denom;
        let t = (a * f - b * c) / denom;

        let p = a1 + d1 * s;
        let q = b1 + d2 * t;
        Ok(if (p - q).norm() <= tol {
            Intersection::point((p + q) * 0.5)
        } else {
            Intersection::null()
        })
    }

    fn transform_point(
        &self,
        point: &Vec3,
        source: &CoordinateSystem,
        target: &CoordinateSystem,
    ) -> KernelResult<Vec3> {
        let mapped = source.map_to(target).transform_point(point);
        if is_invalid(&mapped) {
            return Err(KernelError::GeometryKernelFailure(
                "transform produced a non-finite point".to_string(),
            ));
        }
        Ok(mapped)
    }
}

fn cross_2d(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

fn distance_to_segment_2d(p: &Vec2, a: &Vec2, b: &Vec2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Counter-clockwise convex hull (monotone chain)
fn convex_hull_2d(mut points: Vec<Vec2>) -> Vec<Vec2> {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut lower = Vec::with_capacity(points.len());
    for p in &points {
        push_hull_vertex(&mut lower, *p);
    }
    let mut upper = Vec::with_capacity(points.len());
    for p in points.iter().rev() {
        push_hull_vertex(&mut upper, *p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn push_hull_vertex(chain: &mut Vec<Vec2>, p: Vec2) {
    while chain.len() >= 2 {
        let a = chain[chain.len() - 2];
        let b = chain[chain.len() - 1];
        if cross_2d(&(b - a), &(p - a)) <= 0.0 {
            chain.pop();
        } else {
            break;
        }
    }
    chain.push(p);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(4.0, 4.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
        ]
    }

    #[test]
    fn test_aabb() {
        let k = NativeKernel::new();
        let bb = k.aabb(&square()).unwrap();
        let (min, max) = bb.corners();
        assert_eq!(min, Vec3::zeros());
        assert_eq!(max, Vec3::new(4.0, 4.0, 0.0));
        assert!(k.aabb(&[]).is_err());
    }

    #[test]
    fn test_oriented_box_contains_inputs() {
        let k = NativeKernel::new();
        let pts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 3.0, 0.0),
            Vec3::new(2.0, 4.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        let obb = k.oriented_box(&pts).unwrap();
        let grown = match obb {
            BoundingBox::Oriented { frame, min, max } => {
                let pad = Vec3::repeat(1e-9);
                BoundingBox::oriented(frame, min - pad, max + pad).unwrap()
            }
            BoundingBox::Aabb { .. } => panic!("expected an oriented box"),
        };
        for p in &pts {
            assert!(grown.contains(p));
        }
    }

    #[test]
    fn test_diagonals_cross_at_center() {
        let k = NativeKernel::new();
        let s = square();
        let hit = k.intersect_segments(&s[0], &s[2], &s[1], &s[3]).unwrap();
        assert_relative_eq!(hit.single_point().unwrap(), Vec3::new(2.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_disjoint_and_overlapping_segments() {
        let k = NativeKernel::new();
        let miss = k
            .intersect_segments(
                &Vec3::zeros(),
                &Vec3::x(),
                &Vec3::new(0.0, 1.0, 0.0),
                &Vec3::new(1.0, 1.0, 0.0),
            )
            .unwrap();
        assert_eq!(miss.kind, crate::geometry::IntersectionKind::Null);

        let overlap = k
            .intersect_segments(
                &Vec3::zeros(),
                &Vec3::new(2.0, 0.0, 0.0),
                &Vec3::new(1.0, 0.0, 0.0),
                &Vec3::new(3.0, 0.0, 0.0),
            )
            .unwrap();
        assert_eq!(overlap.kind, crate::geometry::IntersectionKind::Segment);
        assert_relative_eq!(overlap.points[0], Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(overlap.points[1], Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_skew_lines_do_not_meet() {
        let k = NativeKernel::new();
        let res = k
            .intersect_lines(
                &Vec3::zeros(),
                &Vec3::x(),
                &Vec3::new(0.0, 0.0, 1.0),
                &Vec3::new(0.0, 1.0, 1.0),
            )
            .unwrap();
        assert_eq!(res.kind, crate::geometry::IntersectionKind::Null);

        let hit = k
            .intersect_lines(
                &Vec3::zeros(),
                &Vec3::x(),
                &Vec3::new(5.0, -1.0, 0.0),
                &Vec3::new(5.0, 1.0, 0.0),
            )
            .unwrap();
        assert_relative_eq!(hit.single_point().unwrap(), Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_classify_against_square() {
        let k = NativeKernel::new();
        let s = square();
        assert_eq!(k.classify_point(&Vec3::new(2.0, 2.0, 0.0), &s).unwrap(), LocationType::Facet);
        assert_eq!(k.classify_point(&Vec3::new(4.0, 2.0, 0.0), &s).unwrap(), LocationType::Edge);
        assert_eq!(k.classify_point(&Vec3::new(4.0, 4.0, 0.0), &s).unwrap(), LocationType::Vertex);
        assert_eq!(
            k.classify_point(&Vec3::new(10.0, 10.0, 0.0), &s).unwrap(),
            LocationType::OutsideConvexHull
        );
        assert_eq!(
            k.classify_point(&Vec3::new(2.0, 2.0, 1.0), &s).unwrap(),
            LocationType::OutsideAffineHull
        );
    }

    #[test]
    fn test_classify_against_triangle_outside_hypotenuse() {
        let k = NativeKernel::new();
        let tri = vec![Vec3::zeros(), Vec3::x(), Vec3::y()];
        assert_eq!(
            k.classify_point(&Vec3::new(0.9, 0.9, 0.0), &tri).unwrap(),
            LocationType::OutsideConvexHull
        );
        assert_eq!(
            k.classify_point(&Vec3::new(0.2, 0.2, 0.0), &tri).unwrap(),
            LocationType::Facet
        );
    }

    #[test]
    fn test_classify_degenerate_grids() {
        let k = NativeKernel::new();
        let seg = vec![Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0)];
        assert_eq!(k.classify_point(&Vec3::x(), &seg).unwrap(), LocationType::Edge);
        assert_eq!(
            k.classify_point(&Vec3::new(3.0, 0.0, 0.0), &seg).unwrap(),
            LocationType::OutsideConvexHull
        );
        assert_eq!(k.classify_point(&Vec3::y(), &seg).unwrap(), LocationType::OutsideAffineHull);
        assert!(k.classify_point(&Vec3::zeros(), &[]).is_err());
    }

    #[test]
    fn test_classify_in_unit_cube() {
        let k = NativeKernel::new();
        let mut cube = Vec::new();
        for &x in &[0.0, 1.0] {
            for &y in &[0.0, 1.0] {
                for &z in &[0.0, 1.0] {
                    cube.push(Vec3::new(x, y, z));
                }
            }
        }
        assert_eq!(k.classify_point(&Vec3::repeat(0.5), &cube).unwrap(), LocationType::Cell);
        assert_eq!(
            k.classify_point(&Vec3::new(0.5, 0.5, 1.0), &cube).unwrap(),
            LocationType::Facet
        );
        assert_eq!(
            k.classify_point(&Vec3::new(0.5, 1.0, 1.0), &cube).unwrap(),
            LocationType::Edge
        );
        assert_eq!(
            k.classify_point(&Vec3::new(1.5, 0.5, 0.5), &cube).unwrap(),
            LocationType::OutsideConvexHull
        );
    }

    #[test]
    fn test_transform_point_between_frames() {
        let k = NativeKernel::new();
        let frame = CoordinateSystem::local(Vec3::new(1.0, 0.0, 0.0), Vec3::x(), Vec3::y(), Vec3::z())
            .unwrap();
        let p = k
            .transform_point(&Vec3::new(3.0, 2.0, 1.0), &CoordinateSystem::Global, &frame)
            .unwrap();
        assert_relative_eq!(p, Vec3::new(2.0, 2.0, 1.0), epsilon = 1e-12);
    }
}
