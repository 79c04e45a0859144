//! Tensor-product B-spline surfaces.

use super::error::CurveError;
use super::knots::{
    basis_derivatives, basis_functions, clamped_knots, find_span, uniform_knots, validate_knots,
};
use super::points::{ControlPoints, PointStore};

/// Which basis to use along one parameter direction.
#[derive(Clone, Copy)]
enum Basis {
    Value,
    Derivative,
}

/// One parameter direction of a surface.
#[derive(Debug, Clone, PartialEq)]
struct Axis {
    knots: Vec<f64>,
    degree: usize,
    count: usize,
}

impl Axis {
    fn new(knots: Vec<f64>, count: usize) -> Result<Self, CurveError> {
        let degree = validate_knots(&knots, count)?;
        Ok(Self {
            knots,
            degree,
            count,
        })
    }

    fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.count])
    }

    /// First affected control point index and the basis weights.
    fn weights(&self, t: f64, basis: Basis) -> (usize, Vec<f64>) {
        let (start, end) = self.domain();
        let t = t.clamp(start, end);
        let span = find_span(&self.knots, self.degree, self.count, t);
        let w = match basis {
            Basis::Value => basis_functions(&self.knots, span, self.degree, t),
            Basis::Derivative => basis_derivatives(&self.knots, span, self.degree, t),
        };
        (span - self.degree, w)
    }
}

/// B-spline surface over a grid of control points.
///
/// Control points are laid out row by row with `U` varying fastest:
/// point `(i, j)` is at index `j * u_count + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineSurface {
    points: PointStore,
    u: Axis,
    v: Axis,
}

impl BSplineSurface {
    /// Create a surface from a control grid `u_count` points wide and the
    /// knot vectors along `U` and `V`.
    pub fn new(
        points: ControlPoints,
        u_count: usize,
        u_knots: Vec<f64>,
        v_knots: Vec<f64>,
    ) -> Result<Self, CurveError> {
        let points = PointStore::new(points)?;
        let total = points.count();
        if u_count == 0 || total % u_count != 0 {
            return Err(CurveError::GridShape {
                points: total,
                u_count,
            });
        }
        let u = Axis::new(u_knots, u_count)?;
        let v = Axis::new(v_knots, total / u_count)?;
        Ok(Self { points, u, v })
    }

    /// Surface on clamped knot vectors in both directions.
    pub fn clamped(
        points: ControlPoints,
        u_count: usize,
        u_degree: usize,
        v_degree: usize,
    ) -> Result<Self, CurveError> {
        let v_count = points.len() / u_count.max(1);
        Self::new(
            points,
            u_count,
            clamped_knots(u_count, u_degree),
            clamped_knots(v_count, v_degree),
        )
    }

    /// Surface on uniform knot vectors in both directions.
    pub fn uniform(
        points: ControlPoints,
        u_count: usize,
        u_degree: usize,
        v_degree: usize,
    ) -> Result<Self, CurveError> {
        let v_count = points.len() / u_count.max(1);
        Self::new(
            points,
            u_count,
            uniform_knots(u_count, u_degree),
            uniform_knots(v_count, v_degree),
        )
    }

    /// Bezier patch over `[0, 1]²` whose degrees follow the grid size.
    pub fn from_bezier_surface(points: ControlPoints, u_count: usize) -> Result<Self, CurveError> {
        let v_count = points.len() / u_count.max(1);
        Self::clamped(
            points,
            u_count,
            u_count.saturating_sub(1),
            v_count.saturating_sub(1),
        )
    }

    pub fn u_degree(&self) -> usize {
        self.u.degree
    }

    pub fn v_degree(&self) -> usize {
        self.v.degree
    }

    pub fn u_knots(&self) -> &[f64] {
        &self.u.knots
    }

    pub fn v_knots(&self) -> &[f64] {
        &self.v.knots
    }

    /// Grid size `(u_count, v_count)`.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.u.count, self.v.count)
    }

    pub fn dimension(&self) -> usize {
        self.points.dimension()
    }

    pub fn is_rational(&self) -> bool {
        self.points.rational
    }

    /// Parameter domains `((u_start, u_end), (v_start, v_end))`.
    pub fn end_points(&self) -> ((f64, f64), (f64, f64)) {
        (self.u.domain(), self.v.domain())
    }

    /// Blend control points with the given bases along U and V.
    fn blend(&self, u: f64, v: f64, u_basis: Basis, v_basis: Basis) -> Vec<f64> {
        let (i0, wu) = self.u.weights(u, u_basis);
        let (j0, wv) = self.v.weights(v, v_basis);
        let mut out = vec![0.0; self.points.stride];
        for (b, wv) in wv.iter().enumerate() {
            for (a, wu) in wu.iter().enumerate() {
                let w = wu * wv;
                if w == 0.0 {
                    continue;
                }
                let p = self.points.get((j0 + b) * self.u.count + i0 + a);
                for (o, c) in out.iter_mut().zip(p) {
                    *o += w * c;
                }
            }
        }
        out
    }

    /// Point on the surface at `(u, v)`.
    pub fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
        let h = self.blend(u, v, Basis::Value, Basis::Value);
        self.points.project(h)
    }

    /// Partial derivative along `U`.
    pub fn tangent(&self, u: f64, v: f64) -> Vec<f64> {
        self.partial(u, v, Basis::Derivative, Basis::Value)
    }

    /// Partial derivative along `V`.
    pub fn bitangent(&self, u: f64, v: f64) -> Vec<f64> {
        self.partial(u, v, Basis::Value, Basis::Derivative)
    }

    fn partial(&self, u: f64, v: f64, u_basis: Basis, v_basis: Basis) -> Vec<f64> {
        let dh = self.blend(u, v, u_basis, v_basis);
        if !self.points.rational {
            return dh;
        }
        let h = self.blend(u, v, Basis::Value, Basis::Value);
        self.points.project_derivative(&h, dh)
    }

    /// Unnormalized `tangent × bitangent`, using the first three
    /// coordinates (missing ones count as zero).
    pub fn normal(&self, u: f64, v: f64) -> [f64; 3] {
        let t = pad3(&self.tangent(u, v));
        let b = pad3(&self.bitangent(u, v));
        [
            t[1] * b[2] - t[2] * b[1],
            t[2] * b[0] - t[0] * b[2],
            t[0] * b[1] - t[1] * b[0],
        ]
    }
}

fn pad3(v: &[f64]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (o, c) in out.iter_mut().zip(v) {
        *o = *c;
    }
    out
}
