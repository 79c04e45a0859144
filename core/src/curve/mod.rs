//! B-spline and Bezier evaluators.
//!
//! Curves and surfaces operate on `f64` control points of any dimension.
//! Rational geometry is stored in homogeneous form (the last coordinate is
//! the weight and premultiplies the others) and divided back to Euclidean
//! coordinates on output.
//!
//! - [`BSplineCurve`] - position, velocity and Boehm splitting
//! - [`BSplineSurface`] - tensor-product position and partial derivatives
//! - [`clamped_knots`] / [`uniform_knots`] - knot vector generators

mod bspline;
mod error;
mod knots;
mod points;
mod surface;

pub use bspline::BSplineCurve;
pub use error::CurveError;
pub use knots::{clamped_knots, uniform_knots, validate_knots};
pub use points::ControlPoints;
pub use surface::BSplineSurface;
