//! CPU-side mesh building.
//!
//! - [`MeshBuilder`] - incremental primitive assembler fed by vertex calls
//! - [`VertexFormat`] / [`AttributeBits`] - which optional attributes a mesh carries
//! - [`MeshBuffer`] - immutable interleaved snapshot with typed indices
//! - [`VertexLayout`] - attribute descriptors of a mesh buffer
//!
//! These types are re-exported by `prism-graphics` for convenience.

mod buffer;
mod builder;
mod error;
mod format;
mod layout;
mod mode;
mod normals;

pub use buffer::{IndexData, IndexFormat, MeshBuffer};
pub use builder::{DEDUP_WINDOW, MeshBuilder};
pub use error::MeshError;
pub(crate) use error::{check_dimension, check_subdivisions};
pub use format::{AttributeBits, POSITION_COMPONENTS, VertexFormat};
pub use layout::{VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic, VertexLayout};
pub use mode::{PrimitiveMode, PrimitiveType};
