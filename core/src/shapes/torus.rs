//! Tori around the Z axis.

use crate::math::Vec3;
use crate::mesh::{MeshBuilder, MeshError, check_dimension, check_subdivisions};

use super::{GridVertex, ShapeOptions, emit_grid, empty, finish, turn_sin_cos};

/// Torus centered on the origin, its tube circling the Z axis.
///
/// `slices` splits the turn around the Z axis and `stacks` the turn around
/// the tube. `U` follows the first, `V` the second.
pub fn create_torus(
    tube_radius: f32,
    center_radius: f32,
    slices: u32,
    stacks: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    check_subdivisions("slices", slices, 3)?;
    check_subdivisions("stacks", stacks, 3)?;
    check_dimension("tube_radius", tube_radius)?;
    check_dimension("center_radius", center_radius)?;
    if tube_radius == 0.0 {
        return Ok(empty());
    }

    let rows: Vec<Vec<GridVertex>> = (0..=stacks)
        .map(|i| {
            let (sin_psi, cos_psi) = turn_sin_cos(i, stacks);
            let ring = center_radius + tube_radius * cos_psi;
            (0..=slices)
                .map(|j| {
                    let (s, c) = turn_sin_cos(j, slices);
                    GridVertex::new(
                        Vec3::new(ring * c, ring * s, tube_radius * sin_psi),
                        Vec3::new(cos_psi * c, cos_psi * s, sin_psi),
                        j as f32 / slices as f32,
                        i as f32 / stacks as f32,
                    )
                })
                .collect()
        })
        .collect();
    let mut mesh = MeshBuilder::new();
    emit_grid(&mut mesh, &rows)?;
    Ok(finish(mesh, options))
}
