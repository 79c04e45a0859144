//! View frustum extraction and culling tests.
//!
//! Planes are extracted from a combined projection-view matrix with the
//! Gribb/Hartmann method and normalized so that `normal · p + d` is a signed
//! distance, positive inside the frustum.

use super::{Aabb, Mat4, Vec3, Vec4};

/// A plane `normal · p + d = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Plane normal, pointing into the frustum.
    pub normal: Vec3,
    /// Signed distance term.
    pub d: f32,
}

impl Plane {
    /// Create a plane from its equation coefficients.
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self {
            normal: Vec3::new(a, b, c),
            d,
        }
    }

    fn from_row(row: Vec4) -> Self {
        Self::new(row.x, row.y, row.z, row.w)
    }

    /// Plane scaled so its normal has unit length. A zero normal is kept as is.
    pub fn normalized(&self) -> Self {
        let len = self.normal.norm();
        if len == 0.0 {
            return *self;
        }
        Self {
            normal: self.normal / len,
            d: self.d / len,
        }
    }

    /// Signed distance from the plane to `p`.
    pub fn distance(&self, p: &Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    /// Coefficients as `[a, b, c, d]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }
}

/// Frustum plane order.
const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// Six clip planes: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// The planes, in `left, right, bottom, top, near, far` order.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract the frustum of a projection-view matrix (WebGL clip space).
    pub fn from_matrix(m: &Mat4) -> Self {
        let r0 = m.row(0).transpose();
        let r1 = m.row(1).transpose();
        let r2 = m.row(2).transpose();
        let r3 = m.row(3).transpose();
        let planes = [
            Plane::from_row(r3 + r0).normalized(),
            Plane::from_row(r3 - r0).normalized(),
            Plane::from_row(r3 + r1).normalized(),
            Plane::from_row(r3 - r1).normalized(),
            Plane::from_row(r3 + r2).normalized(),
            Plane::from_row(r3 - r2).normalized(),
        ];
        Self { planes }
    }

    /// Whether a point lies inside or on the frustum.
    pub fn has_point(&self, p: &Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance(p) >= 0.0)
    }

    /// Whether a sphere touches the frustum.
    pub fn has_sphere(&self, center: &Vec3, radius: f32) -> bool {
        if radius < 0.0 {
            return false;
        }
        self.planes
            .iter()
            .all(|plane| plane.distance(center) >= -radius)
    }

    /// Whether an axis-aligned box touches the frustum.
    ///
    /// Two passes: the positive-vertex test against each frustum plane
    /// rejects boxes fully outside one plane; the frustum's own corners are
    /// then tested against each box face, which rejects boxes beside an
    /// edge or corner of the frustum that no single plane separates.
    pub fn has_box(&self, bounds: &Aabb) -> bool {
        for plane in &self.planes {
            let n = &plane.normal;
            let positive = Vec3::new(
                if n.x >= 0.0 { bounds.max.x } else { bounds.min.x },
                if n.y >= 0.0 { bounds.max.y } else { bounds.min.y },
                if n.z >= 0.0 { bounds.max.z } else { bounds.min.z },
            );
            if plane.distance(&positive) < 0.0 {
                return false;
            }
        }
        let Some(corners) = self.corners() else {
            return true;
        };
        for axis in 0..3 {
            if corners.iter().all(|c| c[axis] > bounds.max[axis]) {
                return false;
            }
            if corners.iter().all(|c| c[axis] < bounds.min[axis]) {
                return false;
            }
        }
        true
    }

    /// The eight frustum corners from plane-triple intersections, or `None`
    /// when a triple of planes does not meet in a single point.
    pub fn corners(&self) -> Option<[Vec3; 8]> {
        let mut out = [Vec3::zeros(); 8];
        for (i, corner) in out.iter_mut().enumerate() {
            let x = if i & 1 == 0 { LEFT } else { RIGHT };
            let y = if i & 2 == 0 { BOTTOM } else { TOP };
            let z = if i & 4 == 0 { NEAR } else { FAR };
            *corner = intersect_planes(&self.planes[x], &self.planes[y], &self.planes[z])?;
        }
        Some(out)
    }
}

fn intersect_planes(a: &Plane, b: &Plane, c: &Plane) -> Option<Vec3> {
    let bc = b.normal.cross(&c.normal);
    let denom = a.normal.dot(&bc);
    if denom.abs() < 1.0e-12 {
        return None;
    }
    let ca = c.normal.cross(&a.normal);
    let ab = a.normal.cross(&b.normal);
    Some(-(bc * a.d + ca * b.d + ab * c.d) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{mat4_look_at, mat4_ortho, mat4_perspective};

    fn ortho_frustum() -> Frustum {
        Frustum::from_matrix(&mat4_ortho(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0))
    }

    #[test]
    fn box_matching_bounds_is_inside() {
        let f = ortho_frustum();
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -10.0), Vec3::new(1.0, 1.0, -1.0));
        assert!(f.has_box(&b));
    }

    #[test]
    fn far_away_box_is_outside() {
        let f = ortho_frustum();
        let b = Aabb::new(
            Vec3::new(100.0, 100.0, 100.0),
            Vec3::new(101.0, 101.0, 101.0),
        );
        assert!(!f.has_box(&b));
    }

    #[test]
    fn corner_pass_rejects_box_beside_edge() {
        // 90 degree frustum: right plane is x = -z, far plane is z = -10.
        let f = Frustum::from_matrix(&mat4_perspective(90.0, 1.0, 1.0, 10.0));
        let b = Aabb::new(Vec3::new(10.5, -1.0, -20.0), Vec3::new(20.0, 1.0, -9.5));
        // Each plane alone accepts this box.
        for plane in &f.planes {
            let n = plane.normal;
            let p = Vec3::new(
                if n.x >= 0.0 { b.max.x } else { b.min.x },
                if n.y >= 0.0 { b.max.y } else { b.min.y },
                if n.z >= 0.0 { b.max.z } else { b.min.z },
            );
            assert!(plane.distance(&p) >= 0.0);
        }
        assert!(!f.has_box(&b));
    }

    #[test]
    fn perspective_corners() {
        let f = Frustum::from_matrix(&mat4_perspective(90.0, 1.0, 1.0, 10.0));
        let corners = f.corners().unwrap();
        assert!((corners[0] - Vec3::new(-1.0, -1.0, -1.0)).norm() < 1e-4);
        assert!((corners[7] - Vec3::new(10.0, 10.0, -10.0)).norm() < 1e-3);
    }

    #[test]
    fn points_and_spheres() {
        let view = mat4_look_at(
            &Vec3::new(0.0, 0.0, 5.0),
            &Vec3::zeros(),
            &Vec3::new(0.0, 1.0, 0.0),
        );
        let f = Frustum::from_matrix(&(mat4_perspective(60.0, 1.0, 0.1, 100.0) * view));
        assert!(f.has_point(&Vec3::zeros()));
        assert!(!f.has_point(&Vec3::new(0.0, 0.0, 10.0)));
        assert!(f.has_sphere(&Vec3::new(0.0, 0.0, 5.5), 1.0));
        assert!(!f.has_sphere(&Vec3::new(0.0, 0.0, 10.0), 1.0));
        assert!(!f.has_sphere(&Vec3::zeros(), -1.0));
    }

    #[test]
    fn planes_are_normalized() {
        let f = Frustum::from_matrix(&mat4_perspective(45.0, 1.5, 0.5, 50.0));
        for p in &f.planes {
            assert!((p.normal.norm() - 1.0).abs() < 1e-5);
        }
    }
}
