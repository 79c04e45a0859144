//! Flat pointed stars.

use crate::mesh::{MeshBuilder, MeshError, PrimitiveMode, check_dimension, check_subdivisions};

use super::{ShapeOptions, empty, finish, turn_sin_cos};

/// Star facing +Z with `points` tips.
///
/// The outline alternates between `first_radius` and `second_radius`,
/// starting with a `first_radius` tip on +Y and running counterclockwise.
/// The star is a triangle fan around the origin.
pub fn create_pointed_star(
    points: u32,
    first_radius: f32,
    second_radius: f32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    check_subdivisions("points", points, 2)?;
    check_dimension("first_radius", first_radius)?;
    check_dimension("second_radius", second_radius)?;
    let extent = first_radius.max(second_radius);
    if extent == 0.0 {
        return Ok(empty());
    }

    let mut mesh = MeshBuilder::new();
    mesh.mode(PrimitiveMode::TriangleFan)?;
    mesh.normal3(0.0, 0.0, 1.0).tex_coord2(0.5, 0.5).vertex2(0.0, 0.0);
    let corners = 2 * points;
    for k in 0..=corners {
        let radius = if k % 2 == 0 { first_radius } else { second_radius };
        let (s, c) = turn_sin_cos(k, corners);
        let (x, y) = (-radius * s + 0.0, radius * c + 0.0);
        mesh.tex_coord2((x / extent + 1.0) * 0.5, (y / extent + 1.0) * 0.5)
            .vertex2(x, y);
    }
    Ok(finish(mesh, options))
}
