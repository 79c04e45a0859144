//! Evaluator traits consumed by the tessellation engine.
//!
//! An evaluator only has to provide `evaluate`. Everything else is
//! optional: an implementation that can compute a derivative analytically
//! overrides the method and reports it in `capabilities()`, and the
//! [`Curve`](super::Curve) / [`Surface`](super::Surface) wrappers fall back to
//! finite differences for the rest.

use bitflags::bitflags;

use crate::curve::{BSplineCurve, BSplineSurface};

bitflags! {
    /// Optional methods a [`CurveEvaluator`] implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CurveCapabilities: u32 {
        const VELOCITY = 1 << 0;
        const ACCEL = 1 << 1;
        const NORMAL = 1 << 2;
        const ARC_LENGTH = 1 << 3;
        const END_POINTS = 1 << 4;
    }
}

bitflags! {
    /// Optional methods a [`SurfaceEvaluator`] implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SurfaceCapabilities: u32 {
        const TANGENT = 1 << 0;
        const BITANGENT = 1 << 1;
        const GRADIENT = 1 << 2;
        const END_POINTS = 1 << 3;
    }
}

/// A function of one parameter.
///
/// Closures `Fn(f64) -> Vec<f64>` are evaluators with no optional methods.
pub trait CurveEvaluator {
    /// Point at `u`. Shorter results are zero-padded by consumers.
    fn evaluate(&self, u: f64) -> Vec<f64>;

    fn capabilities(&self) -> CurveCapabilities {
        CurveCapabilities::empty()
    }

    /// First derivative.
    fn velocity(&self, _u: f64) -> Option<Vec<f64>> {
        None
    }

    /// Second derivative.
    fn accel(&self, _u: f64) -> Option<Vec<f64>> {
        None
    }

    /// Curve normal.
    fn normal(&self, _u: f64) -> Option<Vec<f64>> {
        None
    }

    /// Length of the curve from the start of the domain to `u`.
    fn arc_length(&self, _u: f64) -> Option<f64> {
        None
    }

    /// Parameter domain.
    fn end_points(&self) -> Option<(f64, f64)> {
        None
    }
}

/// A function of two parameters.
///
/// Closures `Fn(f64, f64) -> Vec<f64>` are evaluators with no optional
/// methods.
pub trait SurfaceEvaluator {
    /// Point at `(u, v)`. Shorter results are zero-padded by consumers.
    fn evaluate(&self, u: f64, v: f64) -> Vec<f64>;

    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities::empty()
    }

    /// Partial derivative along `u`.
    fn tangent(&self, _u: f64, _v: f64) -> Option<Vec<f64>> {
        None
    }

    /// Partial derivative along `v`.
    fn bitangent(&self, _u: f64, _v: f64) -> Option<Vec<f64>> {
        None
    }

    /// Surface normal direction, not necessarily unit length.
    fn gradient(&self, _u: f64, _v: f64) -> Option<Vec<f64>> {
        None
    }

    /// Parameter domains along `u` and `v`.
    fn end_points(&self) -> Option<((f64, f64), (f64, f64))> {
        None
    }
}

impl<F> CurveEvaluator for F
where
    F: Fn(f64) -> Vec<f64>,
{
    fn evaluate(&self, u: f64) -> Vec<f64> {
        self(u)
    }
}

impl<F> SurfaceEvaluator for F
where
    F: Fn(f64, f64) -> Vec<f64>,
{
    fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
        self(u, v)
    }
}

impl CurveEvaluator for BSplineCurve {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        BSplineCurve::evaluate(self, u)
    }

    fn capabilities(&self) -> CurveCapabilities {
        CurveCapabilities::VELOCITY | CurveCapabilities::END_POINTS
    }

    fn velocity(&self, u: f64) -> Option<Vec<f64>> {
        Some(BSplineCurve::velocity(self, u))
    }

    fn end_points(&self) -> Option<(f64, f64)> {
        Some(BSplineCurve::end_points(self))
    }
}

impl SurfaceEvaluator for BSplineSurface {
    fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
        BSplineSurface::evaluate(self, u, v)
    }

    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities::TANGENT
            | SurfaceCapabilities::BITANGENT
            | SurfaceCapabilities::END_POINTS
    }

    fn tangent(&self, u: f64, v: f64) -> Option<Vec<f64>> {
        Some(BSplineSurface::tangent(self, u, v))
    }

    fn bitangent(&self, u: f64, v: f64) -> Option<Vec<f64>> {
        Some(BSplineSurface::bitangent(self, u, v))
    }

    fn end_points(&self) -> Option<((f64, f64), (f64, f64))> {
        Some(BSplineSurface::end_points(self))
    }
}
