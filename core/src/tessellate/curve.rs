//! Curve wrapper with numeric fallbacks, and curve tessellation.

use crate::mesh::{MeshBuilder, PrimitiveMode, PrimitiveType};

use super::error::TessellateError;
use super::evaluator::{CurveCapabilities, CurveEvaluator};
use super::numeric::{norm, normalize, numeric_derivative, pad_f32};

/// Gauss-Legendre nodes and weights on `[-1, 1]`.
const GAUSS_LEGENDRE_5: [(f64, f64); 5] = [
    (0.0, 0.568_888_888_888_888_9),
    (-0.538_469_310_105_683_1, 0.478_628_670_499_366_5),
    (0.538_469_310_105_683_1, 0.478_628_670_499_366_5),
    (-0.906_179_845_938_664, 0.236_926_885_056_189_1),
    (0.906_179_845_938_664, 0.236_926_885_056_189_1),
];

/// Segments used by numeric arc length integration.
const ARC_LENGTH_SEGMENTS: usize = 16;

/// Bisection steps used to invert the arc length.
const ARC_LENGTH_BISECTIONS: usize = 64;

/// A [`CurveEvaluator`] with every optional method available.
///
/// Capabilities are read once; methods the evaluator lacks are computed
/// numerically.
pub struct Curve<E> {
    evaluator: E,
    capabilities: CurveCapabilities,
}

impl<E: CurveEvaluator> Curve<E> {
    pub fn new(evaluator: E) -> Self {
        let capabilities = evaluator.capabilities();
        Self {
            evaluator,
            capabilities,
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn capabilities(&self) -> CurveCapabilities {
        self.capabilities
    }

    pub fn evaluate(&self, u: f64) -> Vec<f64> {
        self.evaluator.evaluate(u)
    }

    /// Domain of the curve, `[0, 1]` unless the evaluator says otherwise.
    pub fn end_points(&self) -> (f64, f64) {
        self.analytic(CurveCapabilities::END_POINTS, |e| e.end_points())
            .unwrap_or((0.0, 1.0))
    }

    /// First derivative.
    pub fn velocity(&self, u: f64) -> Vec<f64> {
        self.analytic(CurveCapabilities::VELOCITY, |e| e.velocity(u))
            .unwrap_or_else(|| numeric_derivative(|t| self.evaluator.evaluate(t), u))
    }

    /// Second derivative.
    pub fn accel(&self, u: f64) -> Vec<f64> {
        self.analytic(CurveCapabilities::ACCEL, |e| e.accel(u))
            .unwrap_or_else(|| numeric_derivative(|t| self.velocity(t), u))
    }

    /// Unit tangent.
    pub fn tangent(&self, u: f64) -> Vec<f64> {
        normalize(&self.velocity(u))
    }

    /// Unit principal normal: the direction the tangent turns toward.
    ///
    /// Zero along straight stretches.
    pub fn normal(&self, u: f64) -> Vec<f64> {
        let n = self
            .analytic(CurveCapabilities::NORMAL, |e| e.normal(u))
            .unwrap_or_else(|| numeric_derivative(|t| self.tangent(t), u));
        normalize(&n)
    }

    /// Length of the curve from the start of its domain to `u`.
    pub fn arc_length(&self, u: f64) -> f64 {
        if let Some(length) = self.analytic(CurveCapabilities::ARC_LENGTH, |e| e.arc_length(u)) {
            return length;
        }
        let (start, _) = self.end_points();
        let step = (u - start) / ARC_LENGTH_SEGMENTS as f64;
        let mut length = 0.0;
        for segment in 0..ARC_LENGTH_SEGMENTS {
            let mid = start + step * (segment as f64 + 0.5);
            for (x, w) in GAUSS_LEGENDRE_5 {
                length += w * norm(&self.velocity(mid + x * step * 0.5));
            }
        }
        length * step * 0.5
    }

    /// Parameter at which the arc length reaches `length`, clamped to the
    /// domain.
    pub fn arc_length_param(&self, length: f64) -> f64 {
        let (start, end) = self.end_points();
        if length <= 0.0 {
            return start;
        }
        if length >= self.arc_length(end) {
            return end;
        }
        let (mut low, mut high) = (start, end);
        for _ in 0..ARC_LENGTH_BISECTIONS {
            let mid = 0.5 * (low + high);
            if self.arc_length(mid) < length {
                low = mid;
            } else {
                high = mid;
            }
        }
        0.5 * (low + high)
    }

    /// `count` points evenly spaced in parameter over the domain.
    pub fn points(&self, count: usize) -> Vec<Vec<f64>> {
        let (start, end) = self.end_points();
        match count {
            0 => Vec::new(),
            1 => vec![self.evaluate(start)],
            _ => (0..count)
                .map(|i| self.evaluate(start + (end - start) * i as f64 / (count - 1) as f64))
                .collect(),
        }
    }

    fn analytic<T>(
        &self,
        capability: CurveCapabilities,
        f: impl FnOnce(&E) -> Option<T>,
    ) -> Option<T> {
        if self.capabilities.contains(capability) {
            f(&self.evaluator)
        } else {
            None
        }
    }
}

/// Emits curves into a [`MeshBuilder`], with optional per-vertex
/// attributes from separate evaluators.
pub struct CurveBuilder<E> {
    curve: Curve<E>,
    color: Option<Box<dyn CurveEvaluator>>,
    normal: Option<Box<dyn CurveEvaluator>>,
    tex_coord: Option<Box<dyn CurveEvaluator>>,
}

impl<E: CurveEvaluator> CurveBuilder<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            curve: Curve::new(evaluator),
            color: None,
            normal: None,
            tex_coord: None,
        }
    }

    /// Vertex colors from `evaluator`, evaluated over the same parameter.
    pub fn with_color(mut self, evaluator: impl CurveEvaluator + 'static) -> Self {
        self.color = Some(Box::new(evaluator));
        self
    }

    /// Vertex normals from `evaluator`.
    pub fn with_normal(mut self, evaluator: impl CurveEvaluator + 'static) -> Self {
        self.normal = Some(Box::new(evaluator));
        self
    }

    /// Texture coordinates from `evaluator`.
    pub fn with_tex_coord(mut self, evaluator: impl CurveEvaluator + 'static) -> Self {
        self.tex_coord = Some(Box::new(evaluator));
        self
    }

    pub fn curve(&self) -> &Curve<E> {
        &self.curve
    }

    /// Sample `n + 1` points over `[u1, u2]` and emit them as points or as
    /// one line strip.
    pub fn eval_curve(
        &self,
        mesh: &mut MeshBuilder,
        mode: PrimitiveType,
        n: u32,
        u1: f64,
        u2: f64,
    ) -> Result<(), TessellateError> {
        if n == 0 {
            return Err(TessellateError::ZeroSubdivisions("n"));
        }
        let primitive_mode = match mode {
            PrimitiveType::Points => PrimitiveMode::Points,
            PrimitiveType::Lines => PrimitiveMode::LineStrip,
            PrimitiveType::Triangles => return Err(TessellateError::UnsupportedMode(mode)),
        };
        mesh.mode(primitive_mode)?;
        for i in 0..=n {
            let u = u1 + (u2 - u1) * i as f64 / n as f64;
            if let Some(color) = &self.color {
                let [r, g, b] = pad_f32::<3>(&color.evaluate(u));
                mesh.color3(r, g, b);
            }
            if let Some(normal) = &self.normal {
                let [x, y, z] = pad_f32::<3>(&normalize(&normal.evaluate(u)));
                mesh.normal3(x, y, z);
            }
            if let Some(tex_coord) = &self.tex_coord {
                let [s, t] = pad_f32::<2>(&tex_coord.evaluate(u));
                mesh.tex_coord2(s, t);
            }
            let [x, y, z] = pad_f32::<3>(&self.curve.evaluate(u));
            mesh.vertex3(x, y, z);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{BSplineCurve, ControlPoints};
    use std::f64::consts::PI;

    #[test]
    fn numeric_velocity_of_closure() {
        let curve = Curve::new(|u: f64| vec![u.cos(), u.sin()]);
        assert!(curve.capabilities().is_empty());
        let v = curve.velocity(0.0);
        assert!((v[0]).abs() < 1e-9 && (v[1] - 1.0).abs() < 1e-9);
        let a = curve.accel(0.0);
        assert!((a[0] + 1.0).abs() < 1e-4 && a[1].abs() < 1e-4);
        let n = curve.normal(0.3);
        assert!((n[0] + 0.3f64.cos()).abs() < 1e-4);
        assert!((n[1] + 0.3f64.sin()).abs() < 1e-4);
    }

    #[test]
    fn straight_line_arc_length() {
        let curve = Curve::new(|u: f64| vec![u, 2.0 * u]);
        let total = curve.arc_length(1.0);
        assert!((total - 5f64.sqrt()).abs() < 1e-9);
        let u = curve.arc_length_param(total * 0.5);
        assert!((u - 0.5).abs() < 1e-9);
        assert_eq!(curve.arc_length_param(-1.0), 0.0);
        assert_eq!(curve.arc_length_param(10.0), 1.0);
    }

    #[test]
    fn circle_arc_length() {
        let curve = Curve::new(|u: f64| vec![(2.0 * PI * u).cos(), (2.0 * PI * u).sin()]);
        assert!((curve.arc_length(1.0) - 2.0 * PI).abs() < 1e-6);
        assert!((curve.arc_length(0.25) - 0.5 * PI).abs() < 1e-6);
    }

    #[test]
    fn bspline_uses_analytic_velocity() {
        let spline = BSplineCurve::uniform(
            ControlPoints::Euclidean(vec![
                vec![0.0, 0.0],
                vec![1.0, 1.0],
                vec![2.0, 0.0],
                vec![3.0, 1.0],
            ]),
            2,
        )
        .unwrap();
        let curve = Curve::new(spline.clone());
        assert!(curve.capabilities().contains(CurveCapabilities::VELOCITY));
        assert_eq!(curve.end_points(), (2.0, 4.0));
        assert_eq!(curve.velocity(2.5), spline.velocity(2.5));
        let points = curve.points(3);
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], spline.evaluate(3.0));
    }

    #[test]
    fn eval_curve_line_strip() {
        let builder = CurveBuilder::new(|u: f64| vec![u, u * u])
            .with_color(|u: f64| vec![u, 0.0, 1.0 - u]);
        let mut mesh = MeshBuilder::new();
        builder
            .eval_curve(&mut mesh, PrimitiveType::Lines, 4, 0.0, 1.0)
            .unwrap();
        assert_eq!(mesh.primitive_type(), PrimitiveType::Lines);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.primitive_count(), 4);
        assert_eq!(mesh.position(4).unwrap().y, 1.0);
        assert_eq!(
            mesh.attribute3(4, crate::mesh::AttributeBits::COLOR),
            Some(crate::math::Vec3::new(1.0, 0.0, 0.0))
        );
    }

    #[test]
    fn eval_curve_points_and_errors() {
        let builder = CurveBuilder::new(|u: f64| vec![u]);
        let mut mesh = MeshBuilder::new();
        builder
            .eval_curve(&mut mesh, PrimitiveType::Points, 2, 0.0, 1.0)
            .unwrap();
        assert_eq!(mesh.primitive_count(), 3);
        assert_eq!(
            builder.eval_curve(&mut mesh, PrimitiveType::Points, 0, 0.0, 1.0),
            Err(TessellateError::ZeroSubdivisions("n"))
        );
        let mut triangles = MeshBuilder::new();
        assert!(matches!(
            builder.eval_curve(&mut triangles, PrimitiveType::Triangles, 2, 0.0, 1.0),
            Err(TessellateError::UnsupportedMode(_))
        ));
        // A points mesh refuses line strips.
        assert!(matches!(
            builder.eval_curve(&mut mesh, PrimitiveType::Lines, 2, 0.0, 1.0),
            Err(TessellateError::Mesh(_))
        ));
    }
}
