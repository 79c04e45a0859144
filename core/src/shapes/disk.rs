//! Disks, rings and disk sectors in the XY plane.

use crate::math::Vec3;
use crate::mesh::{MeshBuilder, MeshError, check_dimension, check_subdivisions};

use super::{GridVertex, ShapeOptions, emit_grid, empty, finish};

/// Disk or ring facing +Z, with `loops` concentric bands between the radii.
pub fn create_disk(
    inner_radius: f32,
    outer_radius: f32,
    slices: u32,
    loops: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    create_partial_disk(inner_radius, outer_radius, slices, loops, 0.0, 360.0, options)
}

/// Disk sector facing +Z.
///
/// Angles are in degrees, measured from +Y toward +X. A negative sweep
/// covers the same sector from the other end; sweeps beyond a full turn are
/// clamped.
pub fn create_partial_disk(
    inner_radius: f32,
    outer_radius: f32,
    slices: u32,
    loops: u32,
    start_degrees: f32,
    sweep_degrees: f32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    let mesh = disk_outward(
        inner_radius,
        outer_radius,
        slices,
        loops,
        start_degrees,
        sweep_degrees,
    )?;
    Ok(finish(mesh, options))
}

pub(super) fn disk_outward(
    inner_radius: f32,
    outer_radius: f32,
    slices: u32,
    loops: u32,
    start_degrees: f32,
    sweep_degrees: f32,
) -> Result<MeshBuilder, MeshError> {
    check_subdivisions("slices", slices, 3)?;
    check_subdivisions("loops", loops, 1)?;
    check_dimension("inner_radius", inner_radius)?;
    check_dimension("outer_radius", outer_radius)?;
    check_dimension("outer_radius - inner_radius", outer_radius - inner_radius)?;
    let (start, sweep) = if sweep_degrees < 0.0 {
        (start_degrees + sweep_degrees, -sweep_degrees)
    } else {
        (start_degrees, sweep_degrees)
    };
    let sweep = sweep.min(360.0);
    if outer_radius == 0.0 || inner_radius == outer_radius || sweep == 0.0 {
        return Ok(empty());
    }

    let full_turn = sweep == 360.0;
    let mut directions: Vec<(f32, f32)> = (0..=slices)
        .map(|j| {
            let degrees = start as f64 + sweep as f64 * j as f64 / slices as f64;
            let (s, c) = degrees.to_radians().sin_cos();
            (s as f32, c as f32)
        })
        .collect();
    if full_turn {
        directions[slices as usize] = directions[0];
    }

    let normal = Vec3::new(0.0, 0.0, 1.0);
    let rows: Vec<Vec<GridVertex>> = (0..=loops)
        .map(|i| {
            let radius = inner_radius + (outer_radius - inner_radius) * i as f32 / loops as f32;
            directions
                .iter()
                .map(|&(s, c)| {
                    let p = Vec3::new(radius * s, radius * c, 0.0);
                    GridVertex::new(
                        p,
                        normal,
                        (p.x / outer_radius + 1.0) * 0.5,
                        (p.y / outer_radius + 1.0) * 0.5,
                    )
                })
                .collect()
        })
        .collect();
    let mut mesh = MeshBuilder::new();
    emit_grid(&mut mesh, &rows)?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::test_util::assert_winding_matches_normals;

    #[test]
    fn full_disk_is_a_fan() {
        let mesh = create_disk(0.0, 1.0, 8, 1, ShapeOptions::new()).unwrap();
        assert_eq!(mesh.primitive_count(), 8);
        // Center merged into one vertex, seam shared.
        assert_eq!(mesh.vertex_count(), 9);
        assert_winding_matches_normals(&mesh);
        for i in 0..mesh.vertex_count() {
            assert_eq!(mesh.normal(i), Some(Vec3::new(0.0, 0.0, 1.0)));
            let [u, v] = mesh.tex_coord(i).unwrap();
            assert!((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn ring_with_loops() {
        let mesh = create_disk(0.5, 1.0, 6, 2, ShapeOptions::new()).unwrap();
        assert_eq!(mesh.primitive_count(), 6 * 2 * 2);
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn partial_disk_angles_start_at_y() {
        let mesh = create_partial_disk(0.0, 1.0, 3, 1, 0.0, 90.0, ShapeOptions::new()).unwrap();
        let bounds = mesh.bounding_box().unwrap();
        assert!(bounds.min.x > -1e-6 && bounds.min.y > -1e-6);
        assert!((bounds.max.x - 1.0).abs() < 1e-6);
        assert!((bounds.max.y - 1.0).abs() < 1e-6);

        let reversed =
            create_partial_disk(0.0, 1.0, 3, 1, 90.0, -90.0, ShapeOptions::new()).unwrap();
        assert_eq!(reversed.bounding_box(), mesh.bounding_box());
    }

    #[test]
    fn inward_disk_faces_down() {
        let mesh = create_disk(0.0, 1.0, 4, 1, ShapeOptions::new().with_inward(true)).unwrap();
        assert_eq!(mesh.normal(0), Some(Vec3::new(0.0, 0.0, -1.0)));
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn degenerate_disks() {
        assert!(create_disk(0.0, 0.0, 8, 1, ShapeOptions::new()).unwrap().is_empty());
        assert!(create_disk(1.0, 1.0, 8, 1, ShapeOptions::new()).unwrap().is_empty());
        assert!(create_disk(2.0, 1.0, 8, 1, ShapeOptions::new()).is_err());
        assert!(create_disk(0.0, 1.0, 8, 0, ShapeOptions::new()).is_err());
    }
}
