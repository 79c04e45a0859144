//! Spheres and capsules centered on the origin around the Z axis.

use crate::math::Vec3;
use crate::mesh::{MeshBuilder, MeshError, check_dimension, check_subdivisions};

use super::{GridVertex, ShapeOptions, emit_grid, empty, finish, turn_sin_cos};

/// `(sin, cos)` of the latitude at row `i` when `bands` bands span the
/// south pole to the north pole.
fn latitude(i: u32, bands: u32) -> (f32, f32) {
    // Angle from the south pole: half a turn in `bands` steps.
    let (s, c) = turn_sin_cos(i, 2 * bands);
    (-c, s)
}

fn ring(
    radius: f32,
    sin_lat: f32,
    cos_lat: f32,
    z: f32,
    v: f32,
    slices: u32,
) -> Vec<GridVertex> {
    (0..=slices)
        .map(|j| {
            let (s, c) = turn_sin_cos(j, slices);
            let normal = Vec3::new(cos_lat * c, cos_lat * s, sin_lat);
            GridVertex::new(
                Vec3::new(radius * normal.x, radius * normal.y, z),
                normal,
                j as f32 / slices as f32,
                v,
            )
        })
        .collect()
}

/// Sphere with `slices` meridians and `stacks` bands from pole to pole.
///
/// `V` is 0 at the south pole (`-Z`) and 1 at the north pole.
pub fn create_sphere(
    radius: f32,
    slices: u32,
    stacks: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    check_subdivisions("slices", slices, 3)?;
    check_subdivisions("stacks", stacks, 2)?;
    check_dimension("radius", radius)?;
    if radius == 0.0 {
        return Ok(empty());
    }
    let rows: Vec<Vec<GridVertex>> = (0..=stacks)
        .map(|i| {
            let (sin_lat, cos_lat) = latitude(i, stacks);
            let v = i as f32 / stacks as f32;
            ring(radius, sin_lat, cos_lat, radius * sin_lat, v, slices)
        })
        .collect();
    let mut mesh = MeshBuilder::new();
    emit_grid(&mut mesh, &rows)?;
    Ok(finish(mesh, options))
}

/// Capsule: a cylinder of `length` capped by two hemispheres of `radius`.
///
/// `stacks` is the number of bands in each hemisphere and `middle_stacks`
/// the number of bands along the cylinder. `V` follows `z` from the bottom
/// of the capsule to its top.
pub fn create_capsule(
    radius: f32,
    length: f32,
    slices: u32,
    stacks: u32,
    middle_stacks: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    check_subdivisions("slices", slices, 3)?;
    check_subdivisions("stacks", stacks, 1)?;
    check_subdivisions("middle_stacks", middle_stacks, 1)?;
    check_dimension("radius", radius)?;
    check_dimension("length", length)?;
    if radius == 0.0 {
        return Ok(empty());
    }
    let half_length = length * 0.5;
    let total = length + 2.0 * radius;
    let v_of = |z: f32| (z + half_length + radius) / total;

    let mut rows = Vec::with_capacity((2 * stacks + middle_stacks + 1) as usize);
    for i in 0..=stacks {
        let (sin_lat, cos_lat) = latitude(i, 2 * stacks);
        let z = radius * sin_lat - half_length;
        rows.push(ring(radius, sin_lat, cos_lat, z, v_of(z), slices));
    }
    for k in 1..=middle_stacks {
        let z = -half_length + length * k as f32 / middle_stacks as f32;
        rows.push(ring(radius, 0.0, 1.0, z, v_of(z), slices));
    }
    for i in stacks + 1..=2 * stacks {
        let (sin_lat, cos_lat) = latitude(i, 2 * stacks);
        let z = radius * sin_lat + half_length;
        rows.push(ring(radius, sin_lat, cos_lat, z, v_of(z), slices));
    }
    let mut mesh = MeshBuilder::new();
    emit_grid(&mut mesh, &rows)?;
    Ok(finish(mesh, options))
}
