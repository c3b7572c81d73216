//! Affine maps in three-dimensional space

use serde::{Deserialize, Serialize};

use super::{Mat3, Vec3, LINEAR_TOLERANCE};

/// Affine map `p -> M * p + t`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMap {
    /// Linear part
    pub matrix: Mat3,
    /// Translation
    pub translation: Vec3,
}

impl Default for AffineMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMap {
    pub fn new(matrix: Mat3, translation: Vec3) -> Self {
        Self {
            matrix,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Mat3::identity(), Vec3::zeros())
    }

    /// Map whose linear part has the given vectors as rows
    ///
    /// With orthonormal axes this projects global vectors onto the local axes.
    pub fn from_rows(i: &Vec3, j: &Vec3, k: &Vec3, translation: Vec3) -> Self {
        let matrix = Mat3::from_rows(&[i.transpose(), j.transpose(), k.transpose()]);
        Self::new(matrix, translation)
    }

    /// Map whose linear part has the given vectors as columns
    pub fn from_columns(i: &Vec3, j: &Vec3, k: &Vec3, translation: Vec3) -> Self {
        Self::new(Mat3::from_columns(&[*i, *j, *k]), translation)
    }

    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.matrix * point + self.translation
    }

    pub fn transform_points(&self, points: &[Vec3]) -> Vec<Vec3> {
        points.iter().map(|p| self.transform_point(p)).collect()
    }

    /// Transform a direction (translation ignored)
    pub fn transform_vector(&self, vector: &Vec3) -> Vec3 {
        self.matrix * vector
    }

    pub fn is_degenerate(&self) -> bool {
        self.matrix.determinant().abs() < LINEAR_TOLERANCE
    }

    /// Inverse map, `None` if the linear part is singular
    pub fn inverse(&self) -> Option<Self> {
        if self.is_degenerate() {
            return None;
        }
        let inv = self.matrix.try_inverse()?;
        Some(Self::new(inv, -(inv * self.translation)))
    }

    /// Composition: apply `self` first, then `next`
    pub fn then(&self, next: &AffineMap) -> Self {
        Self::new(
            next.matrix * self.matrix,
            next.matrix * self.translation + next.translation,
        )
    }
}
