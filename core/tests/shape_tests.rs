//! Properties shared by every procedural shape.

use rstest::rstest;

use prism_core::mesh::{AttributeBits, MeshBuilder, MeshError, PrimitiveType};
use prism_core::shapes::{
    ShapeOptions, create_box, create_capsule, create_closed_cylinder, create_cone,
    create_cylinder, create_disk, create_lathe, create_partial_disk, create_plane,
    create_pointed_star, create_sphere, create_torus,
};

type Generator = fn(ShapeOptions) -> Result<MeshBuilder, MeshError>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build(generator: Generator, options: ShapeOptions) -> MeshBuilder {
    init_logging();
    generator(options).expect("valid parameters")
}

#[rstest]
#[case::cuboid(|o| create_box(1.0, 2.0, 3.0, o))]
#[case::cylinder(|o| create_cylinder(1.0, 0.5, 2.0, 12, 3, o))]
#[case::closed_cylinder(|o| create_closed_cylinder(1.0, 1.0, 2.0, 12, 2, o))]
#[case::cone(|o| create_cone(1.0, 2.0, 12, 2, o))]
#[case::disk(|o| create_disk(0.25, 1.0, 12, 2, o))]
#[case::partial_disk(|o| create_partial_disk(0.0, 1.0, 6, 1, 45.0, 180.0, o))]
#[case::sphere(|o| create_sphere(1.0, 16, 8, o))]
#[case::capsule(|o| create_capsule(0.5, 2.0, 12, 4, 2, o))]
#[case::torus(|o| create_torus(0.25, 1.0, 12, 8, o))]
#[case::plane(|o| create_plane(2.0, 1.0, 4, 2, o))]
#[case::star(|o| create_pointed_star(5, 1.0, 0.4, o))]
#[case::lathe(|o| create_lathe(&[[0.5, 0.0], [1.0, 0.5], [0.25, 1.0]], 10, o))]
fn test_shape_is_well_formed(#[case] generator: Generator) {
    let mesh = build(generator, ShapeOptions::new());
    assert!(!mesh.is_empty());
    assert_eq!(mesh.primitive_type(), PrimitiveType::Triangles);
    assert_eq!(mesh.indices().len() % 3, 0);
    assert!(mesh
        .attribute_bits()
        .contains(AttributeBits::NORMAL | AttributeBits::TEXCOORD));
    let vertex_count = mesh.vertex_count();
    assert!(mesh.indices().iter().all(|&i| (i as usize) < vertex_count));
    for i in 0..vertex_count {
        let n = mesh.normal(i).unwrap();
        assert!((n.norm() - 1.0).abs() < 1e-4, "normal {} is {:?}", i, n);
    }

    let buffer = mesh.to_mesh_buffer();
    assert_eq!(buffer.vertex_count(), vertex_count);
    assert_eq!(buffer.index_count(), mesh.indices().len());
    assert_eq!(buffer.bounds(), mesh.bounding_box());
}

#[rstest]
#[case::cuboid(|o| create_box(1.0, 2.0, 3.0, o))]
#[case::cylinder(|o| create_cylinder(1.0, 1.0, 2.0, 12, 3, o))]
#[case::sphere(|o| create_sphere(1.0, 16, 8, o))]
#[case::torus(|o| create_torus(0.25, 1.0, 12, 8, o))]
#[case::plane(|o| create_plane(2.0, 1.0, 4, 2, o))]
fn test_inward_negates_normals(#[case] generator: Generator) {
    let outward = build(generator, ShapeOptions::new());
    let inward = build(generator, ShapeOptions::new().with_inward(true));
    assert_eq!(outward.vertex_count(), inward.vertex_count());
    assert_eq!(outward.primitive_count(), inward.primitive_count());
    for i in 0..outward.vertex_count() {
        assert_eq!(outward.position(i), inward.position(i));
        assert_eq!(outward.normal(i).map(|n| -n), inward.normal(i));
    }
}

#[rstest]
#[case::sphere(|o| create_sphere(1.0, 16, 8, o))]
#[case::torus(|o| create_torus(0.25, 1.0, 12, 8, o))]
#[case::cylinder(|o| create_cylinder(1.0, 1.0, 2.0, 12, 3, o))]
fn test_flat_shading_unshares_vertices(#[case] generator: Generator) {
    let smooth = build(generator, ShapeOptions::new());
    let flat = build(generator, ShapeOptions::new().with_flat(true));
    assert_eq!(flat.primitive_count(), smooth.primitive_count());
    assert!(flat.vertex_count() > smooth.vertex_count());
}

#[rstest]
#[case::negative_box(|o| create_box(-1.0, 1.0, 1.0, o))]
#[case::two_slices(|o| create_cylinder(1.0, 1.0, 1.0, 2, 1, o))]
#[case::no_stacks(|o| create_sphere(1.0, 8, 0, o))]
#[case::negative_torus(|o| create_torus(-0.25, 1.0, 8, 8, o))]
#[case::no_plane_divisions(|o| create_plane(1.0, 1.0, 0, 1, o))]
#[case::one_star_point(|o| create_pointed_star(1, 1.0, 0.5, o))]
#[case::short_profile(|o| create_lathe(&[[1.0, 0.0]], 8, o))]
fn test_invalid_parameters_are_rejected(#[case] generator: Generator) {
    init_logging();
    assert!(generator(ShapeOptions::new()).is_err());
}
