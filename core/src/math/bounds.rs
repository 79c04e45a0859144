//! Axis-aligned bounding boxes.

use super::{Mat4, Vec3, mat4_transform_point};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Vec3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Box center.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Box extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, ordered by (x, y, z) bit pattern.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut out = [Vec3::zeros(); 8];
        for (i, corner) in out.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
        }
        out
    }

    /// Bounds of this box after transformation by `m`.
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        let corners = self.corners().map(|c| mat4_transform_point(m, &c));
        // Non-empty by construction.
        Aabb::from_points(corners.iter()).unwrap_or(*self)
    }

    /// Whether `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mat4_from_translation;

    #[test]
    fn from_points_and_corners() {
        let pts = [Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 3.0, 5.0)];
        let b = Aabb::from_points(pts.iter()).unwrap();
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 5.0));
        assert_eq!(b.corners()[0], b.min);
        assert_eq!(b.corners()[7], b.max);
        assert!(Aabb::from_points([].iter()).is_none());
    }

    #[test]
    fn transform_translates() {
        let b = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let t = b.transformed(&mat4_from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(t.min, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(t.center(), Vec3::new(2.5, 0.5, 0.5));
    }
}
