use criterion::{Criterion, black_box, criterion_group, criterion_main};

use prism_core::curve::{BSplineSurface, ControlPoints};
use prism_core::math::{Aabb, Frustum, Vec3, mat4_look_at, mat4_perspective};
use prism_core::mesh::{MeshBuilder, PrimitiveType};
use prism_core::shapes::{ShapeOptions, create_box, create_sphere, create_torus};
use prism_core::tessellate::SurfaceBuilder;

// ---------------------------------------------------------------------------
// Shape generation
// ---------------------------------------------------------------------------

fn bench_sphere_low(c: &mut Criterion) {
    c.bench_function("create_sphere_16x8", |b| {
        b.iter(|| create_sphere(black_box(1.0), black_box(16), black_box(8), ShapeOptions::new()));
    });
}

fn bench_sphere_high(c: &mut Criterion) {
    c.bench_function("create_sphere_128x64", |b| {
        b.iter(|| {
            create_sphere(black_box(1.0), black_box(128), black_box(64), ShapeOptions::new())
        });
    });
}

fn bench_flat_torus(c: &mut Criterion) {
    let options = ShapeOptions::new().with_flat(true);
    c.bench_function("create_torus_flat_32x16", |b| {
        b.iter(|| create_torus(black_box(0.25), black_box(1.0), 32, 16, options));
    });
}

fn bench_box(c: &mut Criterion) {
    c.bench_function("create_box", |b| {
        b.iter(|| create_box(black_box(1.0), black_box(2.0), black_box(3.0), ShapeOptions::new()));
    });
}

// ---------------------------------------------------------------------------
// Mesh operations
// ---------------------------------------------------------------------------

fn bench_recalc_normals(c: &mut Criterion) {
    let Ok(sphere) = create_sphere(1.0, 64, 32, ShapeOptions::new()) else {
        return;
    };
    c.bench_function("recalc_normals_smooth_64x32", |b| {
        b.iter(|| {
            let mut mesh = sphere.clone();
            mesh.recalc_normals(false, false);
            black_box(mesh)
        });
    });
}

fn bench_to_mesh_buffer(c: &mut Criterion) {
    let Ok(sphere) = create_sphere(1.0, 64, 32, ShapeOptions::new()) else {
        return;
    };
    c.bench_function("to_mesh_buffer_64x32", |b| {
        b.iter(|| black_box(sphere.to_mesh_buffer()));
    });
}

// ---------------------------------------------------------------------------
// Tessellation
// ---------------------------------------------------------------------------

fn bench_bspline_patch(c: &mut Criterion) {
    let points: Vec<Vec<f64>> = (0..16)
        .map(|k| {
            let (i, j) = ((k % 4) as f64, (k / 4) as f64);
            vec![i, j, ((i - 1.5) * (j - 1.5)).abs()]
        })
        .collect();
    let Ok(surface) = BSplineSurface::from_bezier_surface(ControlPoints::Euclidean(points), 4)
    else {
        return;
    };
    let builder = SurfaceBuilder::new(surface);
    c.bench_function("eval_bezier_patch_32x32", |b| {
        b.iter(|| {
            let mut mesh = MeshBuilder::new();
            let _ = builder.eval_surface(
                &mut mesh,
                PrimitiveType::Triangles,
                32,
                32,
                0.0,
                1.0,
                0.0,
                1.0,
            );
            black_box(mesh)
        });
    });
}

// ---------------------------------------------------------------------------
// Culling
// ---------------------------------------------------------------------------

fn bench_frustum_has_box(c: &mut Criterion) {
    let view = mat4_look_at(
        &Vec3::new(0.0, 0.0, 10.0),
        &Vec3::zeros(),
        &Vec3::new(0.0, 1.0, 0.0),
    );
    let frustum = Frustum::from_matrix(&(mat4_perspective(60.0, 1.5, 0.1, 100.0) * view));
    let boxes: Vec<Aabb> = (0..64)
        .map(|i| {
            let center = Vec3::new((i % 8) as f32 * 4.0 - 16.0, (i / 8) as f32 * 4.0 - 16.0, 0.0);
            Aabb::new(center - Vec3::repeat(0.5), center + Vec3::repeat(0.5))
        })
        .collect();
    c.bench_function("frustum_has_box_64", |b| {
        b.iter(|| boxes.iter().filter(|bounds| frustum.has_box(black_box(bounds))).count());
    });
}

criterion_group!(shapes, bench_sphere_low, bench_sphere_high, bench_flat_torus, bench_box);
criterion_group!(mesh, bench_recalc_normals, bench_to_mesh_buffer);
criterion_group!(tessellation, bench_bspline_patch);
criterion_group!(culling, bench_frustum_has_box);
criterion_main!(shapes, mesh, tessellation, culling);
