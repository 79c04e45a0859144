//! Scene trees and the renderer that draws them.
//!
//! - [`Shape`] / [`ShapeGroup`] / [`Node`]: a tree of meshes with materials
//!   and transforms.
//! - [`Batch3D`]: a camera and lights over a list of nodes. Rendering walks
//!   the tree depth first, culls shapes against the view frustum, picks a
//!   shader variant from the material and mesh attributes, and draws.
//! - [`RenderPass`]: batches drawn into one target after an optional clear.
//! - [`Scene3D`]: owns the context and the caches shared by all passes.

mod batch;
mod scene3d;
mod shape;

pub use batch::Batch3D;
pub use scene3d::{RenderContext, RenderPass, RenderStats, Scene3D, SceneParameters};
pub use shape::{Node, Shape, ShapeGroup, Transform};
