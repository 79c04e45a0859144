//! Math type aliases and helper functions.
//!
//! Rendering math is always `f32` and built on nalgebra. Projection helpers
//! follow the WebGL clip-space convention (depth range `[-1, 1]`), which is
//! also what [`Frustum::from_matrix`] expects.
//!
//! Where a helper has both a copying and a mutating form, the mutating one is
//! suffixed `_in_place` and takes `&mut` to its first argument.

mod bounds;
mod frustum;

pub use bounds::Aabb;
pub use frustum::{Frustum, Plane};

pub use nalgebra;

// ===== Rendering math (always f32) =====

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
pub type Quat = nalgebra::Quaternion<f32>;

// ===== Vector helpers =====

/// Return `v` scaled to unit length.
///
/// A zero-length vector is returned unchanged instead of becoming NaN.
pub fn vec3_normalize(v: Vec3) -> Vec3 {
    let mut out = v;
    vec3_normalize_in_place(&mut out);
    out
}

/// Scale `v` to unit length in place. Zero-length vectors are left alone.
pub fn vec3_normalize_in_place(v: &mut Vec3) {
    let len = v.norm();
    if len != 0.0 && len.is_finite() {
        *v /= len;
    }
}

/// Return `v` scaled to unit length, leaving a zero vector unchanged.
pub fn vec4_normalize(v: Vec4) -> Vec4 {
    let len = v.norm();
    if len != 0.0 && len.is_finite() {
        v / len
    } else {
        v
    }
}

/// Scalar triple product `a · (b × c)`.
///
/// All three arguments take part; this is not `a · b` with `c` ignored.
pub fn vec3_triple(a: &Vec3, b: &Vec3, c: &Vec3) -> f32 {
    a.dot(&b.cross(c))
}

/// Linear interpolation between two vectors.
pub fn vec3_lerp(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Build a vector from the first three entries of a slice, zero-padding
/// missing components.
pub fn vec3_from_slice(s: &[f32]) -> Vec3 {
    Vec3::new(
        s.first().copied().unwrap_or(0.0),
        s.get(1).copied().unwrap_or(0.0),
        s.get(2).copied().unwrap_or(0.0),
    )
}

// ===== Matrix helpers =====

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    let r = nalgebra::UnitQuaternion::new_normalize(rotation);
    let rm = r.to_rotation_matrix().into_inner();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Build a translation-only 4x4 matrix.
pub fn mat4_from_translation(t: Vec3) -> Mat4 {
    Mat4::new_translation(&t)
}

/// Perspective projection with a vertical field of view in degrees.
///
/// Maps view-space depth `[-near, -far]` to clip depth `[-1, 1]`.
pub fn mat4_perspective(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fovy_degrees.to_radians() * 0.5).tan();
    let nf = 1.0 / (near - far);
    #[rustfmt::skip]
    let result = Mat4::new(
        f / aspect, 0.0, 0.0,               0.0,
        0.0,        f,   0.0,               0.0,
        0.0,        0.0, (far + near) * nf, 2.0 * far * near * nf,
        0.0,        0.0, -1.0,              0.0,
    );
    result
}

/// Perspective projection from the six clip bounds at the near plane.
pub fn mat4_frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rml = right - left;
    let tmb = top - bottom;
    let fmn = far - near;
    #[rustfmt::skip]
    let result = Mat4::new(
        2.0 * near / rml, 0.0,              (right + left) / rml, 0.0,
        0.0,              2.0 * near / tmb, (top + bottom) / tmb, 0.0,
        0.0,              0.0,              -(far + near) / fmn,  -2.0 * far * near / fmn,
        0.0,              0.0,              -1.0,                 0.0,
    );
    result
}

/// Orthographic projection mapping depth `[-near, -far]` to `[-1, 1]`.
pub fn mat4_ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rml = right - left;
    let tmb = top - bottom;
    let fmn = far - near;
    #[rustfmt::skip]
    let result = Mat4::new(
        2.0 / rml, 0.0,       0.0,        -(right + left) / rml,
        0.0,       2.0 / tmb, 0.0,        -(top + bottom) / tmb,
        0.0,       0.0,       -2.0 / fmn, -(far + near) / fmn,
        0.0,       0.0,       0.0,        1.0,
    );
    result
}

/// Right-handed look-at view matrix.
pub fn mat4_look_at(eye: &Vec3, center: &Vec3, up: &Vec3) -> Mat4 {
    let eye_point = nalgebra::Point3::from(*eye);
    let target_point = nalgebra::Point3::from(*center);
    nalgebra::Isometry3::look_at_rh(&eye_point, &target_point, up).to_homogeneous()
}

/// Inverse of a 4x4 matrix, or identity when the matrix is singular.
pub fn mat4_inverse(m: &Mat4) -> Mat4 {
    m.try_inverse().unwrap_or_else(Mat4::identity)
}

/// Inverse-transpose of the upper-left 3x3 part (the "normal matrix").
///
/// Returns identity when that 3x3 part is singular.
pub fn mat4_inverse_transpose3(m: &Mat4) -> Mat3 {
    let upper: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
    upper
        .try_inverse()
        .map(|inv| inv.transpose())
        .unwrap_or_else(Mat3::identity)
}

/// Whether the bottom row is `[0, 0, 0, 1]`.
pub fn mat4_is_affine(m: &Mat4) -> bool {
    m[(3, 0)] == 0.0 && m[(3, 1)] == 0.0 && m[(3, 2)] == 0.0 && m[(3, 3)] == 1.0
}

/// Whether the matrix is a pure translation (identity apart from the last column).
pub fn mat4_is_translation_only(m: &Mat4) -> bool {
    let upper: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
    upper == Mat3::identity() && mat4_is_affine(m)
}

/// Transform a point, dividing by the resulting `w` when it is nonzero.
pub fn mat4_transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
    let v = m * Vec4::new(p.x, p.y, p.z, 1.0);
    if v.w != 0.0 && v.w != 1.0 {
        Vec3::new(v.x / v.w, v.y / v.w, v.z / v.w)
    } else {
        v.xyz()
    }
}

/// Transform a direction by the upper-left 3x3 part of the matrix.
pub fn mat4_transform_vector(m: &Mat4, v: &Vec3) -> Vec3 {
    let upper: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
    upper * v
}

/// Column-major `[f32; 16]` copy of a 4x4 matrix, the layout uniform uploads use.
pub fn mat4_to_array(m: &Mat4) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

/// Column-major `[f32; 9]` copy of a 3x3 matrix.
pub fn mat3_to_array(m: &Mat3) -> [f32; 9] {
    let mut out = [0.0; 9];
    out.copy_from_slice(m.as_slice());
    out
}

// ===== Quaternion helpers =====

/// Create a quaternion from x, y, z, w components.
pub fn quat_from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quat {
    nalgebra::Quaternion::new(w, x, y, z)
}

/// Rotation of `angle_degrees` around `axis`. A zero axis gives identity.
pub fn quat_from_axis_angle(angle_degrees: f32, axis: &Vec3) -> Quat {
    match nalgebra::Unit::try_new(*axis, 0.0) {
        Some(unit) => {
            nalgebra::UnitQuaternion::from_axis_angle(&unit, angle_degrees.to_radians())
                .into_inner()
        }
        None => Quat::identity(),
    }
}

/// Rotation matrix equivalent of a quaternion (normalized first).
pub fn quat_to_mat4(q: &Quat) -> Mat4 {
    nalgebra::UnitQuaternion::new_normalize(*q).to_homogeneous()
}

/// Spherical interpolation between two rotations.
pub fn quat_slerp(a: &Quat, b: &Quat, t: f32) -> Quat {
    let ua = nalgebra::UnitQuaternion::new_normalize(*a);
    let ub = nalgebra::UnitQuaternion::new_normalize(*b);
    ua.try_slerp(&ub, t, 1.0e-6)
        .unwrap_or(ua)
        .into_inner()
}

/// Rotate a vector by a quaternion.
pub fn quat_rotate_vec3(q: &Quat, v: &Vec3) -> Vec3 {
    nalgebra::UnitQuaternion::new_normalize(*q) * v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_leaves_zero_vector() {
        let v = vec3_normalize(Vec3::zeros());
        assert_eq!(v, Vec3::zeros());
        assert!(!v.x.is_nan());
    }

    #[test]
    fn normalize_in_place_matches_copy() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        let mut w = v;
        vec3_normalize_in_place(&mut w);
        assert_eq!(w, vec3_normalize(v));
        assert!((w.norm() - 1.0).abs() < 1e-6);
        // Original is untouched by the copying form.
        assert_eq!(v, Vec3::new(3.0, 0.0, 4.0));
    }

    #[test]
    fn triple_product_of_basis() {
        let t = vec3_triple(&Vec3::x(), &Vec3::y(), &Vec3::z());
        assert!((t - 1.0).abs() < 1e-6);
        let t = vec3_triple(&Vec3::y(), &Vec3::x(), &Vec3::z());
        assert!((t + 1.0).abs() < 1e-6);
        // Coplanar arguments give zero even when `a · b` does not.
        assert_eq!(vec3_triple(&Vec3::x(), &Vec3::x(), &Vec3::y()), 0.0);
    }

    #[test]
    fn perspective_maps_near_and_far() {
        let m = mat4_perspective(90.0, 1.0, 1.0, 10.0);
        let near = mat4_transform_point(&m, &Vec3::new(0.0, 0.0, -1.0));
        let far = mat4_transform_point(&m, &Vec3::new(0.0, 0.0, -10.0));
        assert!((near.z + 1.0).abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ortho_maps_bounds() {
        let m = mat4_ortho(-2.0, 2.0, -1.0, 1.0, 0.5, 5.0);
        let p = mat4_transform_point(&m, &Vec3::new(2.0, -1.0, -5.0));
        assert!((p - Vec3::new(1.0, -1.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn translation_detection() {
        let t = mat4_from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert!(mat4_is_translation_only(&t));
        let r = quat_to_mat4(&quat_from_axis_angle(30.0, &Vec3::y()));
        assert!(!mat4_is_translation_only(&r));
        assert!(mat4_is_affine(&r));
    }

    #[test]
    fn singular_inverse_falls_back_to_identity() {
        let m = Mat4::zeros();
        assert_eq!(mat4_inverse(&m), Mat4::identity());
        assert_eq!(mat4_inverse_transpose3(&m), Mat3::identity());
    }

    #[test]
    fn normal_matrix_of_scale() {
        let m = mat4_from_scale_rotation_translation(
            Vec3::new(2.0, 4.0, 1.0),
            Quat::identity(),
            Vec3::new(5.0, 0.0, 0.0),
        );
        let n = mat4_inverse_transpose3(&m);
        assert!((n[(0, 0)] - 0.5).abs() < 1e-6);
        assert!((n[(1, 1)] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn axis_angle_rotation() {
        let q = quat_from_axis_angle(90.0, &Vec3::z());
        let v = quat_rotate_vec3(&q, &Vec3::x());
        assert!((v - Vec3::y()).norm() < 1e-5);
        let zero_axis = quat_from_axis_angle(45.0, &Vec3::zeros());
        assert_eq!(zero_axis, Quat::identity());
    }

    #[test]
    fn slerp_halfway() {
        let a = Quat::identity();
        let b = quat_from_axis_angle(90.0, &Vec3::z());
        let h = quat_slerp(&a, &b, 0.5);
        let v = quat_rotate_vec3(&h, &Vec3::x());
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((v - expected).norm() < 1e-5);
    }

    #[test]
    fn matrix_arrays_are_column_major() {
        let m = mat4_from_translation(Vec3::new(7.0, 8.0, 9.0));
        let a = mat4_to_array(&m);
        assert_eq!(&a[12..15], &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn slice_conversion_pads() {
        assert_eq!(vec3_from_slice(&[1.0]), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(vec3_from_slice(&[1.0, 2.0, 3.0, 4.0]), Vec3::new(1.0, 2.0, 3.0));
    }
}
