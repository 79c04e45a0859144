//! Subdivided rectangles in the XY plane.

use crate::math::Vec3;
use crate::mesh::{MeshBuilder, MeshError, check_dimension, check_subdivisions};

use super::{GridVertex, ShapeOptions, emit_grid, empty, finish};

/// Rectangle centered on the origin facing +Z, split into a grid of
/// `width_divisions` by `height_divisions` cells.
pub fn create_plane(
    width: f32,
    height: f32,
    width_divisions: u32,
    height_divisions: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    check_subdivisions("width_divisions", width_divisions, 1)?;
    check_subdivisions("height_divisions", height_divisions, 1)?;
    check_dimension("width", width)?;
    check_dimension("height", height)?;
    if width == 0.0 || height == 0.0 {
        return Ok(empty());
    }

    let normal = Vec3::new(0.0, 0.0, 1.0);
    let rows: Vec<Vec<GridVertex>> = (0..=height_divisions)
        .map(|i| {
            let v = i as f32 / height_divisions as f32;
            (0..=width_divisions)
                .map(|j| {
                    let u = j as f32 / width_divisions as f32;
                    let p = Vec3::new(width * (u - 0.5), height * (v - 0.5), 0.0);
                    GridVertex::new(p, normal, u, v)
                })
                .collect()
        })
        .collect();
    let mut mesh = MeshBuilder::new();
    emit_grid(&mut mesh, &rows)?;
    Ok(finish(mesh, options))
}
