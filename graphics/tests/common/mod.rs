//! Common utilities for the renderer integration tests.
//!
//! Everything runs against [`DummyContext`], which records the calls a real
//! backend would receive.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use prism_core::deferred::{Resolver, deferred, resolved};
use prism_core::material::MaterialKind;
use prism_core::math::Vec3;
use prism_core::mesh::MeshBuffer;
use prism_core::shapes::{ShapeOptions, create_box, create_sphere};
use prism_graphics::{
    Batch3D, ContextCall, DummyContext, ImageData, Scene3D, SceneParameters, Shape, TextureError,
};

pub type ImageResolver = Resolver<Result<ImageData, TextureError>>;

/// Image requests the test has not answered yet.
#[derive(Clone, Default)]
pub struct PendingImages(Rc<RefCell<Vec<(String, ImageResolver)>>>);

impl PendingImages {
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Drop every pending request, cancelling the loads.
    pub fn cancel_all(&self) {
        self.0.borrow_mut().clear();
    }

    /// Resolve every pending request with a small solid image.
    pub fn resolve_all(&self) {
        for (_, resolver) in self.0.borrow_mut().drain(..) {
            resolver.resolve(Ok(ImageData::solid(2, 2, [200, 100, 50, 255])));
        }
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scene whose images load immediately.
pub fn instant_scene(ctx: DummyContext) -> Scene3D<DummyContext> {
    init_logging();
    let images = |_: &str| resolved(Ok(ImageData::solid(1, 1, [255; 4])));
    Scene3D::new(ctx, images, SceneParameters::new(256, 256)).expect("valid context")
}

/// Scene whose images load when the test says so.
pub fn deferred_scene(ctx: DummyContext) -> (Scene3D<DummyContext>, PendingImages) {
    init_logging();
    let pending = PendingImages::default();
    let queue = pending.clone();
    let images = move |name: &str| {
        let (resolver, handle) = deferred();
        queue.0.borrow_mut().push((name.to_string(), resolver));
        handle
    };
    let scene = Scene3D::new(ctx, images, SceneParameters::new(256, 256)).expect("valid context");
    (scene, pending)
}

pub fn unit_box() -> Arc<MeshBuffer> {
    Arc::new(
        create_box(1.0, 1.0, 1.0, ShapeOptions::new())
            .expect("box")
            .to_mesh_buffer(),
    )
}

pub fn unit_sphere() -> Arc<MeshBuffer> {
    Arc::new(
        create_sphere(1.0, 12, 6, ShapeOptions::new())
            .expect("sphere")
            .to_mesh_buffer(),
    )
}

/// Batch looking down -Z from `z = 10` with a 60 degree field of view.
pub fn camera_batch() -> Batch3D {
    let mut batch = Batch3D::new();
    batch.perspective(60.0, 1.0, 0.5, 50.0);
    batch.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), Vec3::y());
    batch
}

pub fn shape(mesh: &Arc<MeshBuffer>, material: impl Into<MaterialKind>) -> Shape {
    Shape::new(Arc::clone(mesh), material)
}

pub fn use_program_calls(ctx: &DummyContext) -> usize {
    ctx.count_calls(|c| matches!(c, ContextCall::UseProgram(_)))
}
