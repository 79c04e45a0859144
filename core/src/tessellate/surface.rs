//! Surface wrapper with numeric fallbacks, and surface tessellation.

use crate::mesh::{MeshBuilder, PrimitiveMode, PrimitiveType};

use super::error::TessellateError;
use super::evaluator::{SurfaceCapabilities, SurfaceEvaluator};
use super::numeric::{cross3, is_zero, normalize, numeric_derivative, pad, pad_f32};

/// A [`SurfaceEvaluator`] with every optional method available.
pub struct Surface<E> {
    evaluator: E,
    capabilities: SurfaceCapabilities,
}

impl<E: SurfaceEvaluator> Surface<E> {
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

    pub fn capabilities(&self) -> SurfaceCapabilities {
        self.capabilities
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
        self.evaluator.evaluate(u, v)
    }

    /// Domains along `u` and `v`, `[0, 1]²` unless the evaluator says
    /// otherwise.
    pub fn end_points(&self) -> ((f64, f64), (f64, f64)) {
        self.analytic(SurfaceCapabilities::END_POINTS, |e| e.end_points())
            .unwrap_or(((0.0, 1.0), (0.0, 1.0)))
    }

    /// Partial derivative along `u`.
    pub fn tangent(&self, u: f64, v: f64) -> Vec<f64> {
        self.analytic(SurfaceCapabilities::TANGENT, |e| e.tangent(u, v))
            .unwrap_or_else(|| numeric_derivative(|t| self.evaluator.evaluate(t, v), u))
    }

    /// Partial derivative along `v`.
    pub fn bitangent(&self, u: f64, v: f64) -> Vec<f64> {
        self.analytic(SurfaceCapabilities::BITANGENT, |e| e.bitangent(u, v))
            .unwrap_or_else(|| numeric_derivative(|t| self.evaluator.evaluate(u, t), v))
    }

    /// Surface normal direction (not normalized).
    ///
    /// Without an analytic gradient this is `tangent × bitangent`. Where
    /// that vanishes, as at the pole of a sphere, the nonzero partial is
    /// returned instead.
    pub fn gradient(&self, u: f64, v: f64) -> Vec<f64> {
        if let Some(g) = self.analytic(SurfaceCapabilities::GRADIENT, |e| e.gradient(u, v)) {
            return g;
        }
        let t = self.tangent(u, v);
        let b = self.bitangent(u, v);
        let g = cross3(&t, &b);
        if !is_zero(&g) {
            return g;
        }
        if is_zero(&t) {
            pad::<3>(&b).to_vec()
        } else {
            pad::<3>(&t).to_vec()
        }
    }

    fn analytic<T>(
        &self,
        capability: SurfaceCapabilities,
        f: impl FnOnce(&E) -> Option<T>,
    ) -> Option<T> {
        if self.capabilities.contains(capability) {
            f(&self.evaluator)
        } else {
            None
        }
    }
}

/// Attributes of one grid point, evaluated once.
#[derive(Debug, Clone, Copy)]
struct Sample {
    position: [f32; 3],
    normal: Option<[f32; 3]>,
    color: Option<[f32; 3]>,
    tex_coord: Option<[f32; 2]>,
}

/// Emits surfaces into a [`MeshBuilder`], with optional per-vertex
/// attributes from separate evaluators.
///
/// By default normals come from the surface gradient and texture
/// coordinates are the grid fractions in `[0, 1]`.
pub struct SurfaceBuilder<E> {
    surface: Surface<E>,
    color: Option<Box<dyn SurfaceEvaluator>>,
    normal: Option<Box<dyn SurfaceEvaluator>>,
    tex_coord: Option<Box<dyn SurfaceEvaluator>>,
    auto_normals: bool,
    auto_tex_coords: bool,
}

impl<E: SurfaceEvaluator> SurfaceBuilder<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            surface: Surface::new(evaluator),
            color: None,
            normal: None,
            tex_coord: None,
            auto_normals: true,
            auto_tex_coords: true,
        }
    }

    /// Vertex colors from `evaluator`, evaluated at the same parameters.
    pub fn with_color(mut self, evaluator: impl SurfaceEvaluator + 'static) -> Self {
        self.color = Some(Box::new(evaluator));
        self
    }

    /// Vertex normals from `evaluator` instead of the gradient.
    pub fn with_normal(mut self, evaluator: impl SurfaceEvaluator + 'static) -> Self {
        self.normal = Some(Box::new(evaluator));
        self
    }

    /// Texture coordinates from `evaluator` instead of grid fractions.
    pub fn with_tex_coord(mut self, evaluator: impl SurfaceEvaluator + 'static) -> Self {
        self.tex_coord = Some(Box::new(evaluator));
        self
    }

    /// Enable or disable gradient normals when no normal evaluator is set.
    pub fn with_auto_normals(mut self, enabled: bool) -> Self {
        self.auto_normals = enabled;
        self
    }

    /// Enable or disable grid-fraction texture coordinates when no texture
    /// evaluator is set.
    pub fn with_auto_tex_coords(mut self, enabled: bool) -> Self {
        self.auto_tex_coords = enabled;
        self
    }

    pub fn surface(&self) -> &Surface<E> {
        &self.surface
    }

    /// Sample a `(un + 1) x (vn + 1)` grid over `[u1, u2] x [v1, v2]` and
    /// emit it.
    ///
    /// Triangles become one strip per grid row facing `tangent × bitangent`;
    /// lines become the grid's rows and columns; points emit each sample.
    /// Every grid point is evaluated exactly once.
    #[allow(clippy::too_many_arguments)]
    pub fn eval_surface(
        &self,
        mesh: &mut MeshBuilder,
        mode: PrimitiveType,
        un: u32,
        vn: u32,
        u1: f64,
        u2: f64,
        v1: f64,
        v2: f64,
    ) -> Result<(), TessellateError> {
        crate::profile_function!();
        if un == 0 {
            return Err(TessellateError::ZeroSubdivisions("un"));
        }
        if vn == 0 {
            return Err(TessellateError::ZeroSubdivisions("vn"));
        }
        let grid = Grid {
            un,
            vn,
            u1,
            u2,
            v1,
            v2,
        };
        match mode {
            PrimitiveType::Triangles => {
                let mut lower = self.row(&grid, 0);
                for j in 1..=vn {
                    let upper = self.row(&grid, j);
                    mesh.mode(PrimitiveMode::TriangleStrip)?;
                    for (top, bottom) in upper.iter().zip(&lower) {
                        emit(mesh, top);
                        emit(mesh, bottom);
                    }
                    lower = upper;
                }
            }
            PrimitiveType::Lines => {
                let rows: Vec<Vec<Sample>> = (0..=vn).map(|j| self.row(&grid, j)).collect();
                for row in &rows {
                    mesh.mode(PrimitiveMode::LineStrip)?;
                    for s in row {
                        emit(mesh, s);
                    }
                }
                for i in 0..=un as usize {
                    mesh.mode(PrimitiveMode::LineStrip)?;
                    for row in &rows {
                        emit(mesh, &row[i]);
                    }
                }
            }
            PrimitiveType::Points => {
                mesh.mode(PrimitiveMode::Points)?;
                for j in 0..=vn {
                    for s in self.row(&grid, j) {
                        emit(mesh, &s);
                    }
                }
            }
        }
        Ok(())
    }

    fn row(&self, grid: &Grid, j: u32) -> Vec<Sample> {
        let fv = j as f64 / grid.vn as f64;
        let v = grid.v1 + (grid.v2 - grid.v1) * fv;
        (0..=grid.un)
            .map(|i| {
                let fu = i as f64 / grid.un as f64;
                let u = grid.u1 + (grid.u2 - grid.u1) * fu;
                self.sample(u, v, [fu as f32, fv as f32])
            })
            .collect()
    }

    fn sample(&self, u: f64, v: f64, fraction: [f32; 2]) -> Sample {
        let normal = match &self.normal {
            Some(e) => Some(e.evaluate(u, v)),
            None if self.auto_normals => Some(self.surface.gradient(u, v)),
            None => None,
        };
        let tex_coord = match &self.tex_coord {
            Some(e) => Some(pad_f32::<2>(&e.evaluate(u, v))),
            None if self.auto_tex_coords => Some(fraction),
            None => None,
        };
        Sample {
            position: pad_f32::<3>(&self.surface.evaluate(u, v)),
            normal: normal.map(|n| pad_f32::<3>(&normalize(&n))),
            color: self.color.as_ref().map(|e| pad_f32::<3>(&e.evaluate(u, v))),
            tex_coord,
        }
    }
}

/// Parameter grid of one `eval_surface` call.
struct Grid {
    un: u32,
    vn: u32,
    u1: f64,
    u2: f64,
    v1: f64,
    v2: f64,
}

fn emit(mesh: &mut MeshBuilder, s: &Sample) {
    if let Some([x, y, z]) = s.normal {
        mesh.normal3(x, y, z);
    }
    if let Some([r, g, b]) = s.color {
        mesh.color3(r, g, b);
    }
    if let Some([u, v]) = s.tex_coord {
        mesh.tex_coord2(u, v);
    }
    let [x, y, z] = s.position;
    mesh.vertex3(x, y, z);
}
