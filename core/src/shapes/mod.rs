//! Procedural shape generators.
//!
//! Every generator is a pure function from dimensions, subdivision counts
//! and [`ShapeOptions`] to a [`MeshBuilder`] holding a triangle mesh with
//! normals and texture coordinates.
//!
//! Shared rules:
//!
//! - Angular subdivisions must be at least 3, linear subdivisions at least
//!   1; fewer fail with [`MeshError::TooFewSubdivisions`].
//! - Negative sizes fail with [`MeshError::NegativeDimension`]. A size of
//!   exactly zero yields an empty mesh.
//! - `U` wraps the azimuth with a duplicated seam (`U = 0` and `U = 1`);
//!   `V` runs along the shape's lengthwise parameter from 0 to 1. Flat
//!   shapes (disks, planes, stars) use planar coordinates.
//! - Cylinders and lathes run along +Z from `z = 0`; spheres, capsules and
//!   tori are centered on the origin around the Z axis; disks, planes and
//!   stars lie in the XY plane facing +Z.

mod cuboid;
mod cylinder;
mod disk;
mod lathe;
mod plane;
mod sphere;
mod star;
mod torus;

pub use cuboid::{create_box, create_box_from_corners};
pub use cylinder::{create_closed_cylinder, create_cone, create_cylinder};
pub use disk::{create_disk, create_partial_disk};
pub use lathe::create_lathe;
pub use plane::create_plane;
pub use sphere::{create_capsule, create_sphere};
pub use star::create_pointed_star;
pub use torus::create_torus;

use crate::math::Vec3;
use crate::mesh::{MeshBuilder, MeshError, PrimitiveMode};

/// Orientation and shading options shared by all generators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ShapeOptions {
    /// Replace smooth normals with per-face normals.
    pub flat: bool,
    /// Face the inside of the shape: normals point inward and winding is
    /// reversed.
    pub inward: bool,
}

impl ShapeOptions {
    /// Smooth, outward-facing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set flat shading.
    pub fn with_flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    /// Set inward facing.
    pub fn with_inward(mut self, inward: bool) -> Self {
        self.inward = inward;
        self
    }
}

/// One grid sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GridVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: [f32; 2],
}

impl GridVertex {
    /// Negative zeros are folded into positive zeros so that equal samples
    /// compare bitwise equal.
    pub fn new(position: Vec3, normal: Vec3, u: f32, v: f32) -> Self {
        Self {
            position: position.map(|c| c + 0.0),
            normal: normal.map(|c| c + 0.0),
            uv: [u + 0.0, v + 0.0],
        }
    }
}

/// Emit one quad per grid cell as two triangles.
///
/// `rows[i][j]` is the sample at column `j` of row `i`. The front face is
/// the side where `cross(d/dcolumn, d/drow)` points. Triangles whose corners
/// share a position (poles, cone apexes, disk centers) are left out.
pub(crate) fn emit_grid(
    mesh: &mut MeshBuilder,
    rows: &[Vec<GridVertex>],
) -> Result<(), MeshError> {
    mesh.mode(PrimitiveMode::Triangles)?;
    for band in rows.windows(2) {
        let (lower, upper) = (&band[0], &band[1]);
        for j in 0..lower.len().min(upper.len()).saturating_sub(1) {
            let (a, b) = (&lower[j], &lower[j + 1]);
            let (d, c) = (&upper[j], &upper[j + 1]);
            emit_triangle(mesh, d, a, c);
            emit_triangle(mesh, c, a, b);
        }
    }
    Ok(())
}

pub(crate) fn emit_triangle(
    mesh: &mut MeshBuilder,
    a: &GridVertex,
    b: &GridVertex,
    c: &GridVertex,
) {
    if a.position == b.position || b.position == c.position || a.position == c.position {
        return;
    }
    for v in [a, b, c] {
        emit_vertex(mesh, v);
    }
}

pub(crate) fn emit_vertex(mesh: &mut MeshBuilder, v: &GridVertex) {
    mesh.normal3(v.normal.x, v.normal.y, v.normal.z)
        .tex_coord2(v.uv[0], v.uv[1])
        .vertex3(v.position.x, v.position.y, v.position.z);
}

/// Apply flat shading and inward facing to an outward, smooth mesh.
pub(crate) fn finish(mut mesh: MeshBuilder, options: ShapeOptions) -> MeshBuilder {
    if options.flat {
        mesh.recalc_normals(true, options.inward);
    } else if options.inward {
        mesh.reverse_normals();
    }
    if options.inward {
        mesh.reverse_winding();
    }
    mesh
}

/// Empty triangle mesh returned for zero-sized shapes.
pub(crate) fn empty() -> MeshBuilder {
    let mut mesh = MeshBuilder::new();
    // A fresh mesh accepts any mode.
    let _ = mesh.mode(PrimitiveMode::Triangles);
    mesh
}

/// `(sin, cos)` of `2π · i / n`, exact at quarter turns.
pub(crate) fn turn_sin_cos(i: u32, n: u32) -> (f32, f32) {
    if n > 0 && (4 * i) % n == 0 {
        match (4 * i / n) % 4 {
            0 => return (0.0, 1.0),
            1 => return (1.0, 0.0),
            2 => return (0.0, -1.0),
            _ => return (-1.0, 0.0),
        }
    }
    let angle = std::f64::consts::TAU * i as f64 / n as f64;
    let (s, c) = angle.sin_cos();
    (s as f32, c as f32)
}
