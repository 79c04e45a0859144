//! Control point input forms.

use super::error::CurveError;

/// Control points as given by the caller.
///
/// Every form is converted once, at construction, into a flat array that is
/// homogeneous for rational geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPoints {
    /// Plain coordinates.
    Euclidean(Vec<Vec<f64>>),
    /// The last coordinate is a weight that already premultiplies the
    /// others.
    Homogeneous(Vec<Vec<f64>>),
    /// The last coordinate is a weight; the others are plain coordinates.
    Weighted(Vec<Vec<f64>>),
}

impl ControlPoints {
    /// Number of control points.
    pub fn len(&self) -> usize {
        self.tuples().len()
    }

    /// True when there are no control points.
    pub fn is_empty(&self) -> bool {
        self.tuples().is_empty()
    }

    /// True for homogeneous and weighted points.
    pub fn is_rational(&self) -> bool {
        !matches!(self, Self::Euclidean(_))
    }

    fn tuples(&self) -> &[Vec<f64>] {
        match self {
            Self::Euclidean(p) | Self::Homogeneous(p) | Self::Weighted(p) => p,
        }
    }
}

/// Control points flattened into one array with a fixed stride.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PointStore {
    pub data: Vec<f64>,
    pub stride: usize,
    pub rational: bool,
}

impl PointStore {
    pub fn new(points: ControlPoints) -> Result<Self, CurveError> {
        let rational = points.is_rational();
        let weighted = matches!(points, ControlPoints::Weighted(_));
        let tuples = points.tuples();
        let stride = tuples.first().ok_or(CurveError::NoControlPoints)?.len();
        if stride == 0 || (rational && stride < 2) {
            return Err(CurveError::MissingWeight);
        }
        let mut data = Vec::with_capacity(stride * tuples.len());
        for (index, tuple) in tuples.iter().enumerate() {
            if tuple.len() != stride {
                return Err(CurveError::DimensionMismatch {
                    index,
                    expected: stride,
                    actual: tuple.len(),
                });
            }
            if weighted {
                let w = tuple[stride - 1];
                data.extend(tuple[..stride - 1].iter().map(|c| c * w));
                data.push(w);
            } else {
                data.extend_from_slice(tuple);
            }
        }
        Ok(Self {
            data,
            stride,
            rational,
        })
    }

    pub fn count(&self) -> usize {
        self.data.len() / self.stride
    }

    pub fn get(&self, i: usize) -> &[f64] {
        &self.data[i * self.stride..(i + 1) * self.stride]
    }

    /// Output dimension after the homogeneous division.
    pub fn dimension(&self) -> usize {
        if self.rational {
            self.stride - 1
        } else {
            self.stride
        }
    }

    /// Convert a blended tuple to output coordinates.
    ///
    /// A zero blended weight has no Euclidean image and yields the origin.
    pub fn project(&self, h: Vec<f64>) -> Vec<f64> {
        if !self.rational {
            return h;
        }
        let n = self.stride - 1;
        let w = h[n];
        if is_zero_weight(w) {
            return vec![0.0; n];
        }
        h[..n].iter().map(|c| c / w).collect()
    }

    /// Derivative of the projected point from the blended tuple `h` and its
    /// derivative `dh`.
    pub fn project_derivative(&self, h: &[f64], dh: Vec<f64>) -> Vec<f64> {
        if !self.rational {
            return dh;
        }
        let n = self.stride - 1;
        let (w, dw) = (h[n], dh[n]);
        if is_zero_weight(w) {
            return vec![0.0; n];
        }
        (0..n).map(|i| (dh[i] - h[i] / w * dw) / w).collect()
    }
}

fn is_zero_weight(w: f64) -> bool {
    w.abs() < f64::EPSILON
}
