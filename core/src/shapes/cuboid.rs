//! Axis-aligned boxes.

use crate::math::Vec3;
use crate::mesh::{MeshBuilder, MeshError, PrimitiveMode, check_dimension};

use super::{ShapeOptions, empty, finish};

/// Face normal with the two in-face axes; `u × v = normal`.
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
];

/// Box centered at the origin with the given extents along X, Y and Z.
///
/// Each face has its own four vertices, so the mesh has 24 vertices and 12
/// triangles.
pub fn create_box(
    width: f32,
    height: f32,
    depth: f32,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    check_dimension("width", width)?;
    check_dimension("height", height)?;
    check_dimension("depth", depth)?;
    let half = Vec3::new(width, height, depth) * 0.5;
    create_box_from_corners(-half, half, options)
}

/// Box spanning two corners.
pub fn create_box_from_corners(
    min: Vec3,
    max: Vec3,
    options: ShapeOptions,
) -> Result<MeshBuilder, MeshError> {
    let min_corner = min.inf(&max);
    let max_corner = min.sup(&max);
    let size = max_corner - min_corner;
    if size.x == 0.0 || size.y == 0.0 || size.z == 0.0 {
        return Ok(empty());
    }
    let center = (min_corner + max_corner) * 0.5;
    let half = size * 0.5;

    let mut mesh = MeshBuilder::new();
    mesh.mode(PrimitiveMode::Quads)?;
    for (normal, u_axis, v_axis) in FACES {
        let n = Vec3::from(normal);
        let u = Vec3::from(u_axis).component_mul(&half);
        let v = Vec3::from(v_axis).component_mul(&half);
        let face_center = center + n.component_mul(&half);
        mesh.normal3(n.x, n.y, n.z);
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = face_center + u * su + v * sv;
            mesh.tex_coord2((su + 1.0) * 0.5, (sv + 1.0) * 0.5)
                .vertex3(p.x, p.y, p.z);
        }
    }
    Ok(finish(mesh, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::test_util::{assert_unit_normals, assert_winding_matches_normals};

    #[test]
    fn box_counts_and_axis_normals() {
        let mesh = create_box(2.0, 2.0, 2.0, ShapeOptions::new()).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices().len(), 36);
        assert_unit_normals(&mesh);
        for i in 0..mesh.vertex_count() {
            let n = mesh.normal(i).unwrap();
            let axis_components = n.iter().filter(|c| c.abs() > 0.5).count();
            assert_eq!(axis_components, 1);
            assert_eq!(n.abs().sum(), 1.0);
        }
        assert_winding_matches_normals(&mesh);
        let bounds = mesh.bounding_box().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn normals_point_away_from_center() {
        let mesh = create_box(1.0, 2.0, 3.0, ShapeOptions::new()).unwrap();
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i).unwrap();
            assert!(p.dot(&mesh.normal(i).unwrap()) > 0.0);
        }
    }

    #[test]
    fn inward_box_flips_normals_and_winding() {
        let mesh = create_box(2.0, 2.0, 2.0, ShapeOptions::new().with_inward(true)).unwrap();
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i).unwrap();
            assert!(p.dot(&mesh.normal(i).unwrap()) < 0.0);
        }
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn flat_inward_box_matches_smooth_inward() {
        let flat = create_box(
            2.0,
            2.0,
            2.0,
            ShapeOptions::new().with_flat(true).with_inward(true),
        )
        .unwrap();
        assert_eq!(flat.primitive_count(), 12);
        assert_winding_matches_normals(&flat);
    }

    #[test]
    fn degenerate_and_negative_sizes() {
        assert!(create_box(0.0, 1.0, 1.0, ShapeOptions::new()).unwrap().is_empty());
        assert!(matches!(
            create_box(-1.0, 1.0, 1.0, ShapeOptions::new()),
            Err(MeshError::NegativeDimension { .. })
        ));
    }
}
