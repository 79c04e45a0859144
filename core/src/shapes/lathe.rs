//! Surfaces of revolution around the Z axis.

use nalgebra::Vector2;

use crate::math::Vec3;
use crate::mesh::{MeshBuilder, MeshError, check_dimension, check_subdivisions};

use super::{GridVertex, ShapeOptions, emit_grid, empty, finish, turn_sin_cos};

/// Revolve a profile of `[radius, z]` points around the Z axis.
///
/// Normals face the right-hand side of the profile as it is walked, which
/// is outward for a profile running toward +Z. `V` runs from the first
/// profile point to the last.
pub fn create_lathe(
    profile: &[[f32; 2]],
    slices: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    check_subdivisions("slices", slices, 3)?;
    check_subdivisions("points", profile.len() as u32, 2)?;
    for &[radius, _] in profile {
        check_dimension("radius", radius)?;
    }
    if profile.iter().all(|&[radius, _]| radius == 0.0) {
        return Ok(empty());
    }

    let normals = profile_normals(profile);
    let last = (profile.len() - 1) as f32;
    let rows: Vec<Vec<GridVertex>> = profile
        .iter()
        .zip(&normals)
        .enumerate()
        .map(|(k, (&[radius, z], normal))| {
            (0..=slices)
                .map(|j| {
                    let (s, c) = turn_sin_cos(j, slices);
                    GridVertex::new(
                        Vec3::new(radius * c, radius * s, z),
                        Vec3::new(normal.x * c, normal.x * s, normal.y),
                        j as f32 / slices as f32,
                        k as f32 / last,
                    )
                })
                .collect()
        })
        .collect();
    let mut mesh = MeshBuilder::new();
    emit_grid(&mut mesh, &rows)?;
    Ok(finish(mesh, options))
}

/// Per-point `(radial, z)` normals averaged from the adjacent segments.
fn profile_normals(profile: &[[f32; 2]]) -> Vec<Vector2<f32>> {
    let segments: Vec<Vector2<f32>> = profile
        .windows(2)
        .map(|w| {
            let (dr, dz) = (w[1][0] - w[0][0], w[1][1] - w[0][1]);
            Vector2::new(dz, -dr)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector2::zeros)
        })
        .collect();
    (0..profile.len())
        .map(|k| {
            let before = k.checked_sub(1).map(|s| segments[s]).unwrap_or_else(Vector2::zeros);
            let after = segments.get(k).copied().unwrap_or_else(Vector2::zeros);
            (before + after)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(|| Vector2::new(1.0, 0.0))
        })
        .collect()
}
