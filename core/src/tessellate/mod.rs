//! Curve and surface tessellation.
//!
//! Any [`CurveEvaluator`] or [`SurfaceEvaluator`] (including plain
//! closures and the B-spline types) can be sampled into a
//! [`MeshBuilder`](crate::mesh::MeshBuilder). Derivatives, normals and arc
//! lengths the evaluator does not provide are estimated numerically with
//! step [`EPSILON`].
//!
//! ```
//! use prism_core::mesh::{MeshBuilder, PrimitiveType};
//! use prism_core::tessellate::SurfaceBuilder;
//!
//! let saddle = SurfaceBuilder::new(|u: f64, v: f64| vec![u, v, u * v]);
//! let mut mesh = MeshBuilder::new();
//! saddle
//!     .eval_surface(&mut mesh, PrimitiveType::Triangles, 8, 8, -1.0, 1.0, -1.0, 1.0)
//!     .unwrap();
//! assert_eq!(mesh.primitive_count(), 8 * 8 * 2);
//! ```

mod curve;
mod error;
mod evaluator;
mod numeric;
mod surface;

pub use curve::{Curve, CurveBuilder};
pub use error::TessellateError;
pub use evaluator::{CurveCapabilities, CurveEvaluator, SurfaceCapabilities, SurfaceEvaluator};
pub use numeric::{EPSILON, numeric_derivative};
pub use surface::{Surface, SurfaceBuilder};
