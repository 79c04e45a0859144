use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use prism_core::deferred::resolved;
use prism_core::material::{Light, Lights, Material};
use prism_core::math::Vec3;
use prism_core::shapes::{ShapeOptions, create_sphere};
use prism_graphics::{
    Batch3D, DummyContext, ImageData, ProgramCache, Scene3D, SceneParameters, ShaderFlags, Shape,
    Transform,
};

// ---------------------------------------------------------------------------
// Program cache
// ---------------------------------------------------------------------------

fn bench_program_cache_hit(c: &mut Criterion) {
    let mut ctx = DummyContext::new();
    let mut cache = ProgramCache::new();
    let flags = ShaderFlags::LIGHTING | ShaderFlags::TEX_COORD | ShaderFlags::ALBEDO_MAP;
    cache.program(flags, &mut ctx).unwrap();
    c.bench_function("program_cache_hit", |b| {
        b.iter(|| black_box(cache.program(black_box(flags), &mut ctx).unwrap()));
    });
}

fn bench_program_build(c: &mut Criterion) {
    c.bench_function("program_build_lit_pbr", |b| {
        b.iter(|| {
            let mut ctx = DummyContext::new();
            let mut cache = ProgramCache::new();
            black_box(
                cache
                    .program(ShaderFlags::LIGHTING | ShaderFlags::PBR, &mut ctx)
                    .unwrap(),
            );
        });
    });
}

// ---------------------------------------------------------------------------
// Scene rendering
// ---------------------------------------------------------------------------

fn grid_scene(side: i32, culling: bool) -> Scene3D<DummyContext> {
    let images = |_: &str| resolved(Ok(ImageData::solid(1, 1, [255; 4])));
    let params = SceneParameters::new(512, 512).with_frustum_culling(culling);
    let mut scene = Scene3D::new(DummyContext::new(), images, params).unwrap();

    let mesh = Arc::new(
        create_sphere(0.4, 16, 8, ShapeOptions::new())
            .unwrap()
            .to_mesh_buffer(),
    );
    let mut batch = Batch3D::new().with_lights(
        Lights::new()
            .with_light(Light::directional([0.0, 1.0, 1.0]))
            .with_light(Light::point([0.0, 0.0, 5.0], 30.0)),
    );
    batch.perspective(60.0, 1.0, 0.1, 200.0);
    batch.look_at(Vec3::new(0.0, 0.0, 20.0), Vec3::zeros(), Vec3::y());
    for x in -side..side {
        for y in -side..side {
            let position = Vec3::new(x as f32, y as f32, 0.0);
            batch.push(
                Shape::new(Arc::clone(&mesh), Material::new().with_shininess(16.0))
                    .with_transform(Transform::from_translation(position)),
            );
        }
    }
    scene.main_pass_mut().batches.push(batch);
    scene
}

fn bench_scene_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_render");
    for (name, culling) in [("culled", true), ("unculled", false)] {
        let mut scene = grid_scene(20, culling);
        scene.render().unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                scene.context_mut().clear_calls();
                black_box(scene.render().unwrap())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_program_cache_hit,
    bench_program_build,
    bench_scene_render,
);
criterion_main!(benches);
