//! Normal and tangent-space reconstruction for triangle meshes.

use std::collections::HashMap;

use crate::math::{Vec2, Vec3, vec3_normalize_in_place};

use super::builder::MeshBuilder;
use super::error::MeshError;
use super::format::AttributeBits;
use super::mode::PrimitiveType;

impl MeshBuilder {
    /// Give every primitive its own copy of each vertex it uses.
    pub fn make_redundant(&mut self) -> &mut Self {
        let stride = self.format().stride();
        let mut vertices = Vec::with_capacity(self.indices().len() * stride);
        for &i in self.indices() {
            vertices.extend_from_slice(self.vertex_data(i as usize));
        }
        let indices = (0..self.indices().len() as u32).collect();
        self.replace_geometry(vertices, indices);
        self
    }

    /// Recompute vertex normals from triangle winding.
    ///
    /// With `flat`, each triangle gets its own vertices carrying its face
    /// normal. Otherwise face normals are accumulated per vertex and shared
    /// between vertices at the same position. `inward` negates the result.
    /// Degenerate normals stay zero. Line and point meshes are unchanged.
    pub fn recalc_normals(&mut self, flat: bool, inward: bool) -> &mut Self {
        crate::profile_function!();
        if self.primitive_type() != PrimitiveType::Triangles {
            return self;
        }
        if flat {
            self.make_redundant();
        }
        self.enable(AttributeBits::NORMAL);
        let Some(offset) = self.format().offset(AttributeBits::NORMAL) else {
            return self;
        };

        let count = self.vertex_count();
        let mut normals = vec![Vec3::zeros(); count];
        let indices = self.indices().to_vec();
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| self.position_unchecked(i as usize));
            let mut face = (b - a).cross(&(c - a));
            vec3_normalize_in_place(&mut face);
            if inward {
                face = -face;
            }
            for &i in tri {
                normals[i as usize] += face;
            }
        }

        if !flat {
            let mut groups: HashMap<[u32; 3], Vec<usize>> = HashMap::new();
            for i in 0..count {
                let p = self.position_unchecked(i);
                groups
                    .entry([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
                    .or_default()
                    .push(i);
            }
            for members in groups.values().filter(|m| m.len() > 1) {
                let sum = members
                    .iter()
                    .fold(Vec3::zeros(), |acc, &i| acc + normals[i]);
                for &i in members {
                    normals[i] = sum;
                }
            }
        }

        for (i, mut n) in normals.into_iter().enumerate() {
            vec3_normalize_in_place(&mut n);
            self.vertex_data_mut(i)[offset..offset + 3].copy_from_slice(n.as_slice());
        }
        self
    }

    /// Compute per-triangle tangents and bitangents from texture coordinates.
    ///
    /// The mesh is made redundant first. Each vector is orthogonalized
    /// against the vertex normal; triangles with a degenerate UV mapping get
    /// zero vectors.
    pub fn recalc_tangents(&mut self) -> Result<&mut Self, MeshError> {
        crate::profile_function!();
        if self.primitive_type() != PrimitiveType::Triangles {
            return Ok(self);
        }
        if !self
            .format()
            .has(AttributeBits::NORMAL | AttributeBits::TEXCOORD)
        {
            return Err(MeshError::MissingAttributes(
                "tangents need normals and texture coordinates",
            ));
        }
        self.make_redundant();
        self.enable(AttributeBits::TANGENT | AttributeBits::BITANGENT);
        let format = self.format();
        let (Some(normal), Some(uv), Some(tangent), Some(bitangent)) = (
            format.offset(AttributeBits::NORMAL),
            format.offset(AttributeBits::TEXCOORD),
            format.offset(AttributeBits::TANGENT),
            format.offset(AttributeBits::BITANGENT),
        ) else {
            return Ok(self);
        };

        for first in (0..self.vertex_count()).step_by(3) {
            if first + 3 > self.vertex_count() {
                break;
            }
            let p: [Vec3; 3] = std::array::from_fn(|k| self.position_unchecked(first + k));
            let t: [Vec2; 3] = std::array::from_fn(|k| {
                let v = self.vertex_data(first + k);
                Vec2::new(v[uv], v[uv + 1])
            });
            let (face_tangent, face_bitangent) = uv_jacobian(&p, &t);
            for k in 0..3 {
                let v = self.vertex_data_mut(first + k);
                let n = Vec3::new(v[normal], v[normal + 1], v[normal + 2]);
                let mut tan = face_tangent - n * n.dot(&face_tangent);
                vec3_normalize_in_place(&mut tan);
                let mut bit =
                    face_bitangent - n * n.dot(&face_bitangent) - tan * tan.dot(&face_bitangent);
                vec3_normalize_in_place(&mut bit);
                v[tangent..tangent + 3].copy_from_slice(tan.as_slice());
                v[bitangent..bitangent + 3].copy_from_slice(bit.as_slice());
            }
        }
        Ok(self)
    }

    fn position_unchecked(&self, i: usize) -> Vec3 {
        let v = self.vertex_data(i);
        Vec3::new(v[0], v[1], v[2])
    }
}

/// Tangent and bitangent of a triangle from its position/UV Jacobian.
fn uv_jacobian(p: &[Vec3; 3], t: &[Vec2; 3]) -> (Vec3, Vec3) {
    let e1 = p[1] - p[0];
    let e2 = p[2] - p[0];
    let d1 = t[1] - t[0];
    let d2 = t[2] - t[0];
    let det = d1.x * d2.y - d2.x * d1.y;
    if det == 0.0 || !det.is_finite() {
        return (Vec3::zeros(), Vec3::zeros());
    }
    let r = 1.0 / det;
    let tangent = (e1 * d2.y - e2 * d1.y) * r;
    let bitangent = (e2 * d1.x - e1 * d2.x) * r;
    (tangent, bitangent)
}
