//! Incremental primitive assembler.
//!
//! [`MeshBuilder`] turns a stream of "set current attribute, emit vertex"
//! calls into an indexed triangle, line or point list. The primitive family
//! is fixed by the first [`MeshBuilder::mode`] call (or the first vertex, which
//! implies [`PrimitiveMode::Triangles`]); later calls may only switch between
//! modes of the same family and start a new primitive run.
//!
//! # Example
//!
//! ```
//! use prism_core::mesh::{MeshBuilder, PrimitiveMode};
//!
//! let mut mesh = MeshBuilder::new();
//! mesh.mode(PrimitiveMode::TriangleFan).unwrap();
//! mesh.normal3(0.0, 0.0, 1.0);
//! for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
//!     mesh.vertex2(x, y);
//! }
//! assert_eq!(mesh.primitive_count(), 2);
//! ```

use crate::math::{
    Aabb, Mat4, Vec3, mat4_inverse_transpose3, mat4_transform_point, vec3_normalize_in_place,
};

use super::error::MeshError;
use super::format::{AttributeBits, POSITION_COMPONENTS, VertexFormat};
use super::mode::{PrimitiveMode, PrimitiveType};

/// Number of most recent vertices scanned for an identical vertex before a
/// new one is appended.
///
/// The scan is a heuristic: duplicates further back than the window are not
/// merged.
pub const DEDUP_WINDOW: usize = 16;

/// Attribute values applied to the next emitted vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CurrentAttributes {
    normal: [f32; 3],
    color: [f32; 3],
    tex_coord: [f32; 2],
    tangent: [f32; 3],
    bitangent: [f32; 3],
}

impl CurrentAttributes {
    fn get(&self, attribute: AttributeBits) -> &[f32] {
        if attribute == AttributeBits::NORMAL {
            &self.normal
        } else if attribute == AttributeBits::COLOR {
            &self.color
        } else if attribute == AttributeBits::TEXCOORD {
            &self.tex_coord
        } else if attribute == AttributeBits::TANGENT {
            &self.tangent
        } else {
            &self.bitangent
        }
    }
}

/// Builder-level mesh: flat vertex data, indices, and the assembly state.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    format: VertexFormat,
    primitive_type: PrimitiveType,
    family_fixed: bool,
    mode: PrimitiveMode,
    run: Vec<u32>,
    current: CurrentAttributes,
    dedup_window: usize,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            format: VertexFormat::position_only(),
            primitive_type: PrimitiveType::Triangles,
            family_fixed: false,
            mode: PrimitiveMode::Triangles,
            run: Vec::new(),
            current: CurrentAttributes::default(),
            dedup_window: DEDUP_WINDOW,
        }
    }

    /// Create a mesh from raw interleaved vertex data and indices.
    pub fn from_raw(
        vertices: Vec<f32>,
        indices: Vec<u32>,
        format: VertexFormat,
        primitive_type: PrimitiveType,
    ) -> Result<Self, MeshError> {
        let vertex_count = vertices.len() / format.stride();
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::InvalidIndex {
                index,
                vertex_count,
            });
        }
        let mode = match primitive_type {
            PrimitiveType::Triangles => PrimitiveMode::Triangles,
            PrimitiveType::Lines => PrimitiveMode::Lines,
            PrimitiveType::Points => PrimitiveMode::Points,
        };
        let mut indices = indices;
        indices.truncate(indices.len() - indices.len() % primitive_type.indices_per_primitive());
        Ok(Self {
            vertices,
            indices,
            format,
            primitive_type,
            family_fixed: true,
            mode,
            ..Self::new()
        })
    }

    /// Set how many recent vertices are scanned for duplicates.
    ///
    /// Zero disables de-duplication.
    pub fn with_dedup_window(mut self, window: usize) -> Self {
        self.dedup_window = window;
        self
    }

    // ===== Mode =====

    /// Switch the assembly mode and start a new primitive run.
    ///
    /// Fails without changing the mesh if `mode` belongs to a different
    /// primitive family than the mesh already has.
    pub fn mode(&mut self, mode: PrimitiveMode) -> Result<&mut Self, MeshError> {
        let requested = mode.primitive_type();
        if self.family_fixed && requested != self.primitive_type {
            return Err(MeshError::IncompatibleMode {
                current: self.primitive_type,
                requested,
            });
        }
        self.primitive_type = requested;
        self.family_fixed = true;
        self.mode = mode;
        self.run.clear();
        Ok(self)
    }

    /// Current assembly mode.
    pub fn current_mode(&self) -> PrimitiveMode {
        self.mode
    }

    // ===== Current attributes =====

    /// Set the normal of subsequent vertices.
    pub fn normal3(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.enable(AttributeBits::NORMAL);
        self.current.normal = [x, y, z];
        self
    }

    /// Set the color of subsequent vertices.
    pub fn color3(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        self.enable(AttributeBits::COLOR);
        self.current.color = [r, g, b];
        self
    }

    /// Set the texture coordinate of subsequent vertices.
    pub fn tex_coord2(&mut self, u: f32, v: f32) -> &mut Self {
        self.enable(AttributeBits::TEXCOORD);
        self.current.tex_coord = [u, v];
        self
    }

    /// Set the tangent of subsequent vertices.
    pub fn tangent3(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.enable(AttributeBits::TANGENT);
        self.current.tangent = [x, y, z];
        self
    }

    /// Set the bitangent of subsequent vertices.
    pub fn bitangent3(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.enable(AttributeBits::BITANGENT);
        self.current.bitangent = [x, y, z];
        self
    }

    /// Add attributes to the mesh format, zero-padding existing vertices.
    pub fn enable(&mut self, bits: AttributeBits) -> &mut Self {
        let widened = self.format.widen(bits);
        if widened != self.format {
            self.vertices = self.format.relayout(&self.vertices, &widened);
            self.format = widened;
        }
        self
    }

    /// Set the color of every existing vertex and of subsequent vertices.
    pub fn set_color3(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        self.color3(r, g, b);
        let stride = self.format.stride();
        if let Some(offset) = self.format.offset(AttributeBits::COLOR) {
            for v in self.vertices.chunks_exact_mut(stride) {
                v[offset..offset + 3].copy_from_slice(&[r, g, b]);
            }
        }
        self
    }

    // ===== Vertex emission =====

    /// Emit a vertex at `(x, y, 0)`.
    pub fn vertex2(&mut self, x: f32, y: f32) -> &mut Self {
        self.vertex3(x, y, 0.0)
    }

    /// Emit a vertex with the current attributes and assemble primitives.
    pub fn vertex3(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.family_fixed = true;
        let tuple = self.vertex_tuple([x, y, z]);
        let index = self.find_or_push(&tuple);
        self.run.push(index);
        self.assemble();
        self
    }

    fn vertex_tuple(&self, position: [f32; 3]) -> Vec<f32> {
        let mut tuple = Vec::with_capacity(self.format.stride());
        tuple.extend_from_slice(&position);
        for a in AttributeBits::ORDER {
            if self.format.has(a) {
                tuple.extend_from_slice(self.current.get(a));
            }
        }
        tuple
    }

    fn find_or_push(&mut self, tuple: &[f32]) -> u32 {
        let stride = self.format.stride();
        let count = self.vertex_count();
        let start = count.saturating_sub(self.dedup_window);
        for i in (start..count).rev() {
            if bitwise_eq(&self.vertices[i * stride..(i + 1) * stride], tuple) {
                return i as u32;
            }
        }
        self.vertices.extend_from_slice(tuple);
        count as u32
    }

    fn assemble(&mut self) {
        let n = self.run.len();
        let r = &self.run;
        match self.mode {
            PrimitiveMode::Triangles => {
                if n % 3 == 0 {
                    let (a, b, c) = (r[n - 3], r[n - 2], r[n - 1]);
                    self.add_triangle(a, b, c);
                }
            }
            PrimitiveMode::TriangleStrip => {
                if n >= 3 {
                    let k = n - 3;
                    let (a, b, c) = if k % 2 == 0 {
                        (r[k], r[k + 1], r[k + 2])
                    } else {
                        (r[k + 1], r[k], r[k + 2])
                    };
                    self.add_triangle(a, b, c);
                }
            }
            PrimitiveMode::TriangleFan => {
                if n >= 3 {
                    let (a, b, c) = (r[0], r[n - 2], r[n - 1]);
                    self.add_triangle(a, b, c);
                }
            }
            PrimitiveMode::Quads => {
                if n % 4 == 0 {
                    let (a, b, c, d) = (r[n - 4], r[n - 3], r[n - 2], r[n - 1]);
                    self.add_triangle(a, b, c);
                    self.add_triangle(a, c, d);
                }
            }
            PrimitiveMode::QuadStrip => {
                if n >= 4 && n % 2 == 0 {
                    let (a, b, c, d) = (r[n - 4], r[n - 3], r[n - 2], r[n - 1]);
                    self.add_triangle(a, b, c);
                    self.add_triangle(c, b, d);
                }
            }
            PrimitiveMode::Lines => {
                if n % 2 == 0 {
                    let (a, b) = (r[n - 2], r[n - 1]);
                    self.add_line(a, b);
                }
            }
            PrimitiveMode::LineStrip => {
                if n >= 2 {
                    let (a, b) = (r[n - 2], r[n - 1]);
                    self.add_line(a, b);
                }
            }
            PrimitiveMode::Points => {
                let a = r[n - 1];
                self.indices.push(a);
            }
        }
    }

    fn same_vertex(&self, a: u32, b: u32) -> bool {
        a == b || bitwise_eq(self.vertex_data(a as usize), self.vertex_data(b as usize))
    }

    fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        if self.same_vertex(a, b) || self.same_vertex(b, c) || self.same_vertex(a, c) {
            return;
        }
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn add_line(&mut self, a: u32, b: u32) {
        if self.same_vertex(a, b) {
            return;
        }
        self.indices.extend_from_slice(&[a, b]);
    }

    // ===== Composition =====

    /// Append another mesh's vertices and primitives.
    ///
    /// The attribute sets of both meshes are widened to their union. Fails
    /// if the meshes hold different primitive families.
    pub fn merge(&mut self, other: &MeshBuilder) -> Result<&mut Self, MeshError> {
        crate::profile_function!();
        if other.indices.is_empty() && other.vertices.is_empty() {
            return Ok(self);
        }
        if self.is_empty() && !self.family_fixed {
            self.primitive_type = other.primitive_type;
            self.mode = other.mode;
            self.family_fixed = other.family_fixed;
        } else if other.family_fixed && other.primitive_type != self.primitive_type {
            return Err(MeshError::IncompatibleMerge {
                target: self.primitive_type,
                source: other.primitive_type,
            });
        }
        self.enable(other.format.bits());
        let offset = self.vertex_count() as u32;
        if other.format == self.format {
            self.vertices.extend_from_slice(&other.vertices);
        } else {
            let widened = other.format.relayout(&other.vertices, &self.format);
            self.vertices.extend_from_slice(&widened);
        }
        self.indices.extend(other.indices.iter().map(|i| i + offset));
        self.run.clear();
        Ok(self)
    }

    /// Transform positions by `m` and directions by its normal matrix.
    ///
    /// Normals use the inverse transpose of the upper 3x3; tangents and
    /// bitangents use the upper 3x3 itself. Directions are renormalized.
    pub fn transform(&mut self, m: &Mat4) -> &mut Self {
        let normal_matrix = mat4_inverse_transpose3(m);
        let linear = m.fixed_view::<3, 3>(0, 0).into_owned();
        let stride = self.format.stride();
        let normal = self.format.offset(AttributeBits::NORMAL);
        let tangent = self.format.offset(AttributeBits::TANGENT);
        let bitangent = self.format.offset(AttributeBits::BITANGENT);
        for v in self.vertices.chunks_exact_mut(stride) {
            let p = mat4_transform_point(m, &Vec3::new(v[0], v[1], v[2]));
            v[..POSITION_COMPONENTS].copy_from_slice(p.as_slice());
            if let Some(o) = normal {
                let mut n = normal_matrix * Vec3::new(v[o], v[o + 1], v[o + 2]);
                vec3_normalize_in_place(&mut n);
                v[o..o + 3].copy_from_slice(n.as_slice());
            }
            for o in [tangent, bitangent].into_iter().flatten() {
                let mut t = linear * Vec3::new(v[o], v[o + 1], v[o + 2]);
                vec3_normalize_in_place(&mut t);
                v[o..o + 3].copy_from_slice(t.as_slice());
            }
        }
        self
    }

    /// Reverse the winding order of every triangle.
    pub fn reverse_winding(&mut self) -> &mut Self {
        if self.primitive_type == PrimitiveType::Triangles {
            for tri in self.indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }
        self
    }

    /// Negate every vertex normal.
    pub fn reverse_normals(&mut self) -> &mut Self {
        let stride = self.format.stride();
        if let Some(o) = self.format.offset(AttributeBits::NORMAL) {
            for v in self.vertices.chunks_exact_mut(stride) {
                for c in &mut v[o..o + 3] {
                    *c = -*c;
                }
            }
        }
        self.current.normal = self.current.normal.map(|c| -c);
        self
    }

    /// A lines mesh holding every distinct edge of this mesh's triangles.
    ///
    /// Line and point meshes are returned unchanged.
    pub fn to_wireframe(&self) -> MeshBuilder {
        if self.primitive_type != PrimitiveType::Triangles {
            return self.clone();
        }
        let mut seen = std::collections::HashSet::new();
        let mut indices = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if seen.insert((a.min(b), a.max(b))) {
                    indices.extend_from_slice(&[a, b]);
                }
            }
        }
        MeshBuilder {
            vertices: self.vertices.clone(),
            indices,
            format: self.format,
            primitive_type: PrimitiveType::Lines,
            family_fixed: true,
            mode: PrimitiveMode::Lines,
            run: Vec::new(),
            current: self.current,
            dedup_window: self.dedup_window,
        }
    }

    // ===== Accessors =====

    /// Whether the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.format.stride()
    }

    /// Number of triangles, lines or points.
    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.primitive_type.indices_per_primitive()
    }

    /// Primitive family.
    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    /// Vertex format.
    pub fn format(&self) -> VertexFormat {
        self.format
    }

    /// Optional attributes present.
    pub fn attribute_bits(&self) -> AttributeBits {
        self.format.bits()
    }

    /// Raw interleaved vertex data.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Raw index data.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Window used for vertex de-duplication.
    pub fn dedup_window(&self) -> usize {
        self.dedup_window
    }

    /// Position of vertex `i`.
    pub fn position(&self, i: usize) -> Option<Vec3> {
        (i < self.vertex_count()).then(|| {
            let v = self.vertex_data(i);
            Vec3::new(v[0], v[1], v[2])
        })
    }

    /// Normal of vertex `i`, if the mesh has normals.
    pub fn normal(&self, i: usize) -> Option<Vec3> {
        self.attribute3(i, AttributeBits::NORMAL)
    }

    /// A three-component attribute of vertex `i`.
    pub fn attribute3(&self, i: usize, attribute: AttributeBits) -> Option<Vec3> {
        let o = self.format.offset(attribute)?;
        if i >= self.vertex_count() || attribute.components() != 3 {
            return None;
        }
        let v = self.vertex_data(i);
        Some(Vec3::new(v[o], v[o + 1], v[o + 2]))
    }

    /// Texture coordinate of vertex `i`, if the mesh has them.
    pub fn tex_coord(&self, i: usize) -> Option<[f32; 2]> {
        let o = self.format.offset(AttributeBits::TEXCOORD)?;
        if i >= self.vertex_count() {
            return None;
        }
        let v = self.vertex_data(i);
        Some([v[o], v[o + 1]])
    }

    /// Bounds of every vertex referenced by an index.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        for &i in &self.indices {
            let p = self.position(i as usize)?;
            match bounds.as_mut() {
                Some(b) => b.include(&p),
                None => bounds = Some(Aabb::new(p, p)),
            }
        }
        bounds
    }

    pub(crate) fn vertex_data(&self, i: usize) -> &[f32] {
        let stride = self.format.stride();
        &self.vertices[i * stride..(i + 1) * stride]
    }

    pub(crate) fn vertex_data_mut(&mut self, i: usize) -> &mut [f32] {
        let stride = self.format.stride();
        &mut self.vertices[i * stride..(i + 1) * stride]
    }

    pub(crate) fn replace_geometry(&mut self, vertices: Vec<f32>, indices: Vec<u32>) {
        self.vertices = vertices;
        self.indices = indices;
        self.run.clear();
    }
}

fn bitwise_eq(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

static_assertions::assert_impl_all!(MeshBuilder: Send, Sync);
