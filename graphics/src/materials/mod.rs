//! Uniform binding for materials and lights.
//!
//! - [`MaterialBinder`] uploads the colors and texture units of a
//!   [`MaterialKind`](prism_core::material::MaterialKind).
//! - [`LightsBinder`] fills the shader's `lights` array in view space.
//!
//! Both follow the uniform naming of the default shaders and skip any
//! uniform the program does not declare, so they work with custom shaders
//! that only read part of the material.

mod binder;
mod lights;

pub use binder::{MAX_TEXTURE_UNITS, MaterialBinder};
pub use lights::LightsBinder;
