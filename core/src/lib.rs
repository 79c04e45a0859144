//! # Prism Core
//!
//! CPU-side building blocks of the Prism renderer: math and frustum
//! culling, the incremental mesh builder and packed mesh buffers,
//! procedural shapes, B-spline evaluation, curve and surface tessellation,
//! material and light descriptions, and deferred load handles.
//!
//! Nothing in this crate touches a graphics context; `prism-graphics`
//! uploads and draws what is built here.

pub mod curve;
pub mod deferred;
pub mod material;
pub mod math;
pub mod mesh;
pub mod profiling;
pub mod shapes;
pub mod tessellate;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version.
pub fn init() {
    log::info!("Prism Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
