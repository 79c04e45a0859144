//! Cylinders and cones along +Z.

use crate::math::{Vec3, mat4_from_translation};
use crate::mesh::{MeshBuilder, MeshError, check_dimension, check_subdivisions};

use super::disk::disk_outward;
use super::{GridVertex, ShapeOptions, emit_grid, empty, finish, turn_sin_cos};

/// Open cylinder from `z = 0` to `z = height`.
///
/// The radius varies linearly from `base_radius` to `top_radius`; a zero
/// top radius makes a cone. `V` runs from the base to the top.
pub fn create_cylinder(
    base_radius: f32,
    top_radius: f32,
    height: f32,
    slices: u32,
    stacks: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    let mesh = cylinder_outward(base_radius, top_radius, height, slices, stacks)?;
    Ok(finish(mesh, options))
}

/// Cylinder closed with a disk at each end.
pub fn create_closed_cylinder(
    base_radius: f32,
    top_radius: f32,
    height: f32,
    slices: u32,
    stacks: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    let mut mesh = cylinder_outward(base_radius, top_radius, height, slices, stacks)?;
    if mesh.is_empty() {
        return Ok(mesh);
    }
    let mut base = disk_outward(0.0, base_radius, slices, 1, 0.0, 360.0)?;
    base.reverse_winding().reverse_normals();
    mesh.merge(&base)?;
    let mut top = disk_outward(0.0, top_radius, slices, 1, 0.0, 360.0)?;
    top.transform(&mat4_from_translation(Vec3::new(0.0, 0.0, height)));
    mesh.merge(&top)?;
    Ok(finish(mesh, options))
}

/// Closed cone with its base at `z = 0` and apex at `z = height`.
pub fn create_cone(
    base_radius: f32,
    height: f32,
    slices: u32,
    stacks: u32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    create_closed_cylinder(base_radius, 0.0, height, slices, stacks, options)
}

fn cylinder_outward(
    base_radius: f32,
    top_radius: f32,
    height: f32,
    slices: u32,
    stacks: u32,
) -> Result<MeshBuilder, MeshError> {
    check_subdivisions("slices", slices, 3)?;
    check_subdivisions("stacks", stacks, 1)?;
    check_dimension("base_radius", base_radius)?;
    check_dimension("top_radius", top_radius)?;
    check_dimension("height", height)?;
    if height == 0.0 || (base_radius == 0.0 && top_radius == 0.0) {
        return Ok(empty());
    }

    // Side slope: outward normal is (h · radial, base - top) normalized.
    let slope = Vec3::new(height, 0.0, base_radius - top_radius).normalize();
    let rows: Vec<Vec<GridVertex>> = (0..=stacks)
        .map(|i| {
            let t = i as f32 / stacks as f32;
            let z = height * t;
            let radius = base_radius + (top_radius - base_radius) * t;
            (0..=slices)
                .map(|j| {
                    let (s, c) = turn_sin_cos(j, slices);
                    GridVertex::new(
                        Vec3::new(radius * c, radius * s, z),
                        Vec3::new(slope.x * c, slope.x * s, slope.z),
                        j as f32 / slices as f32,
                        t,
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
    use crate::shapes::test_util::{assert_unit_normals, assert_winding_matches_normals};

    #[test]
    fn zero_radii_give_empty_mesh() {
        let mesh = create_cylinder(0.0, 0.0, 5.0, 32, 1, ShapeOptions::new()).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        let closed = create_closed_cylinder(0.0, 0.0, 5.0, 32, 1, ShapeOptions::new()).unwrap();
        assert!(closed.is_empty());
    }

    #[test]
    fn open_cylinder_shape() {
        let mesh = create_cylinder(1.0, 1.0, 2.0, 8, 2, ShapeOptions::new()).unwrap();
        assert_eq!(mesh.primitive_count(), 8 * 2 * 2);
        assert_unit_normals(&mesh);
        assert_winding_matches_normals(&mesh);
        let b = mesh.bounding_box().unwrap();
        assert_eq!(b.min.z, 0.0);
        assert_eq!(b.max.z, 2.0);
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i).unwrap();
            assert!((p.xy().norm() - 1.0).abs() < 1e-5);
            let n = mesh.normal(i).unwrap();
            assert!(n.z.abs() < 1e-6);
        }
    }

    #[test]
    fn seam_has_both_u_values() {
        let mesh = create_cylinder(1.0, 1.0, 1.0, 4, 1, ShapeOptions::new()).unwrap();
        let us: Vec<f32> = (0..mesh.vertex_count())
            .map(|i| mesh.tex_coord(i).unwrap()[0])
            .collect();
        assert!(us.contains(&0.0));
        assert!(us.contains(&1.0));
    }

    #[test]
    fn cone_skips_apex_triangles() {
        let mesh = create_cylinder(1.0, 0.0, 1.0, 6, 1, ShapeOptions::new()).unwrap();
        assert_eq!(mesh.primitive_count(), 6);
        assert_winding_matches_normals(&mesh);
        let n = mesh.normal(0).unwrap();
        assert!(n.z > 0.0);
    }

    #[test]
    fn closed_cylinder_caps_face_outward() {
        let mesh = create_closed_cylinder(1.0, 1.0, 1.0, 8, 1, ShapeOptions::new()).unwrap();
        assert_eq!(mesh.primitive_count(), 16 + 8 + 8);
        assert_winding_matches_normals(&mesh);
        let cone = create_cone(1.0, 2.0, 8, 1, ShapeOptions::new()).unwrap();
        assert_eq!(cone.primitive_count(), 8 + 8);
    }

    #[test]
    fn inside_cylinder_faces_axis() {
        let mesh =
            create_cylinder(1.0, 1.0, 1.0, 8, 1, ShapeOptions::new().with_inward(true)).unwrap();
        assert_winding_matches_normals(&mesh);
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i).unwrap();
            assert!(p.xy().dot(&mesh.normal(i).unwrap().xy()) < 0.0);
        }
    }

    #[test]
    fn validation() {
        assert!(matches!(
            create_cylinder(1.0, 1.0, 1.0, 2, 1, ShapeOptions::new()),
            Err(MeshError::TooFewSubdivisions { parameter: "slices", .. })
        ));
        assert!(create_cylinder(1.0, 1.0, 1.0, 3, 0, ShapeOptions::new()).is_err());
        assert!(create_cylinder(-1.0, 1.0, 1.0, 3, 1, ShapeOptions::new()).is_err());
    }
}
