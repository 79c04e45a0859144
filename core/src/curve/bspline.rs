//! B-spline curves.

use super::error::CurveError;
use super::knots::{basis_derivatives, clamped_knots, find_span, uniform_knots, validate_knots};
use super::points::{ControlPoints, PointStore};

/// B-spline curve of any degree and dimension, optionally rational.
///
/// Parameters outside the domain `[knots[degree], knots[count]]` are
/// clamped to it.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineCurve {
    points: PointStore,
    knots: Vec<f64>,
    degree: usize,
    /// Clamped single-span curve of degree <= 3.
    bezier: bool,
}

impl BSplineCurve {
    /// Create a curve from control points and a knot vector.
    ///
    /// The degree is `knots.len() - points.len() - 1`.
    pub fn new(points: ControlPoints, knots: Vec<f64>) -> Result<Self, CurveError> {
        let points = PointStore::new(points)?;
        let degree = validate_knots(&knots, points.count())?;
        Ok(Self::from_parts(points, knots, degree))
    }

    /// Curve of `degree` on a clamped knot vector.
    pub fn clamped(points: ControlPoints, degree: usize) -> Result<Self, CurveError> {
        let knots = clamped_knots(points.len(), degree);
        Self::new(points, knots)
    }

    /// Curve of `degree` on a uniform knot vector. It does not pass through
    /// its end points.
    pub fn uniform(points: ControlPoints, degree: usize) -> Result<Self, CurveError> {
        let knots = uniform_knots(points.len(), degree);
        Self::new(points, knots)
    }

    /// Bezier curve of degree `points.len() - 1` over `[0, 1]`.
    pub fn from_bezier_curve(points: ControlPoints) -> Result<Self, CurveError> {
        let degree = points.len().saturating_sub(1);
        Self::clamped(points, degree)
    }

    fn from_parts(points: PointStore, knots: Vec<f64>, degree: usize) -> Self {
        let count = points.count();
        let bezier = degree <= 3
            && count == degree + 1
            && knots[..=degree].iter().all(|&k| k == knots[0])
            && knots[count..].iter().all(|&k| k == knots[count]);
        Self {
            points,
            knots,
            degree,
            bezier,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Number of control points.
    pub fn control_point_count(&self) -> usize {
        self.points.count()
    }

    /// Stored control points, homogeneous when the curve is rational.
    pub fn control_points(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.points.data.chunks_exact(self.points.stride)
    }

    /// Dimension of evaluated points.
    pub fn dimension(&self) -> usize {
        self.points.dimension()
    }

    pub fn is_rational(&self) -> bool {
        self.points.rational
    }

    /// Parameter domain `(start, end)`.
    pub fn end_points(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.points.count()])
    }

    fn clamp(&self, u: f64) -> f64 {
        let (start, end) = self.end_points();
        u.clamp(start, end)
    }

    /// Point on the curve at `u`.
    pub fn evaluate(&self, u: f64) -> Vec<f64> {
        let h = self.evaluate_homogeneous(self.clamp(u));
        self.points.project(h)
    }

    fn evaluate_homogeneous(&self, u: f64) -> Vec<f64> {
        if self.bezier {
            return self.bernstein(u);
        }
        let count = self.points.count();
        let span = find_span(&self.knots, self.degree, count, u);
        self.de_boor(span, u)
    }

    /// Closed-form Bernstein blend for single-span curves.
    fn bernstein(&self, u: f64) -> Vec<f64> {
        let (start, end) = self.end_points();
        let t = (u - start) / (end - start);
        let s = 1.0 - t;
        let weights: &[f64] = match self.degree {
            0 => &[1.0],
            1 => &[s, t],
            2 => &[s * s, 2.0 * s * t, t * t],
            _ => &[s * s * s, 3.0 * s * s * t, 3.0 * s * t * t, t * t * t],
        };
        let mut out = vec![0.0; self.points.stride];
        for (i, w) in weights.iter().enumerate() {
            for (o, c) in out.iter_mut().zip(self.points.get(i)) {
                *o += w * c;
            }
        }
        out
    }

    /// De Boor's algorithm: `degree` passes of knot-ratio interpolation over
    /// the points affecting `span`.
    fn de_boor(&self, span: usize, u: f64) -> Vec<f64> {
        let p = self.degree;
        let stride = self.points.stride;
        let mut d: Vec<f64> = (0..=p)
            .flat_map(|j| self.points.get(span - p + j).iter().copied())
            .collect();
        for r in 1..=p {
            for j in (r..=p).rev() {
                let i = span - p + j;
                let denom = self.knots[i + p + 1 - r] - self.knots[i];
                let alpha = if denom == 0.0 {
                    0.0
                } else {
                    (u - self.knots[i]) / denom
                };
                for c in 0..stride {
                    let prev = d[(j - 1) * stride + c];
                    let cur = d[j * stride + c];
                    d[j * stride + c] = prev * (1.0 - alpha) + cur * alpha;
                }
            }
        }
        d.split_off(p * stride)
    }

    /// Derivative of the curve with respect to `u`.
    pub fn velocity(&self, u: f64) -> Vec<f64> {
        let u = self.clamp(u);
        let count = self.points.count();
        let span = find_span(&self.knots, self.degree, count, u);
        let ders = basis_derivatives(&self.knots, span, self.degree, u);
        let mut dh = vec![0.0; self.points.stride];
        for (r, w) in ders.iter().enumerate() {
            for (o, c) in dh.iter_mut().zip(self.points.get(span - self.degree + r)) {
                *o += w * c;
            }
        }
        if !self.points.rational {
            return dh;
        }
        let h = self.evaluate_homogeneous(u);
        self.points.project_derivative(&h, dh)
    }

    /// Split at `u` into the curves over `[start, u]` and `[u, end]`.
    ///
    /// At or beyond an end point only one side exists and the other is
    /// `None`.
    pub fn split(&self, u: f64) -> (Option<BSplineCurve>, Option<BSplineCurve>) {
        let (start, end) = self.end_points();
        if u <= start {
            return (None, Some(self.clone()));
        }
        if u >= end {
            return (Some(self.clone()), None);
        }

        let p = self.degree;
        let existing = self.knots.iter().filter(|&&k| k == u).count();
        let mut points = self.points.clone();
        let mut knots = self.knots.clone();
        for _ in existing..p + 1 {
            insert_knot(&mut points, &mut knots, p, u);
        }

        // u now appears p + 1 times starting at `first`.
        let first = knots.iter().position(|&k| k == u).unwrap_or(0);
        let stride = points.stride;
        let left = PointStore {
            data: points.data[..first * stride].to_vec(),
            stride,
            rational: points.rational,
        };
        let right = PointStore {
            data: points.data[first * stride..].to_vec(),
            stride,
            rational: points.rational,
        };
        (
            Some(Self::from_parts(left, knots[..first + p + 1].to_vec(), p)),
            Some(Self::from_parts(right, knots[first..].to_vec(), p)),
        )
    }
}

/// Boehm's algorithm: insert `u` once, keeping the curve unchanged.
fn insert_knot(points: &mut PointStore, knots: &mut Vec<f64>, degree: usize, u: f64) {
    let count = points.count();
    let stride = points.stride;
    let k = find_span(knots, degree, count, u);
    let mut data = Vec::with_capacity((count + 1) * stride);
    for i in 0..=count {
        if i + degree <= k {
            data.extend_from_slice(points.get(i));
        } else if i > k {
            data.extend_from_slice(points.get(i - 1));
        } else {
            let alpha = (u - knots[i]) / (knots[i + degree] - knots[i]);
            let (a, b) = (points.get(i - 1), points.get(i));
            data.extend(a.iter().zip(b).map(|(x, y)| x * (1.0 - alpha) + y * alpha));
        }
    }
    points.data = data;
    knots.insert(k + 1, u);
}
