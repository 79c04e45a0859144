//! Error types for spline construction.

use std::fmt;

/// Errors raised when control points and knots do not describe a valid
/// B-spline.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveError {
    /// No control points were given.
    NoControlPoints,
    /// A control point's length differs from the first one's.
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// Homogeneous or weighted points need a weight plus one coordinate.
    MissingWeight,
    /// The knot count implies an order outside `1..=control_points`.
    InvalidOrder { knots: usize, control_points: usize },
    /// Knot at `index` is smaller than its predecessor.
    NotMonotonic { index: usize },
    /// The first or last knot repeats more than `degree + 1` times.
    EndMultiplicity { multiplicity: usize, maximum: usize },
    /// An interior knot repeats more than `degree` times.
    InteriorMultiplicity {
        knot: f64,
        multiplicity: usize,
        maximum: usize,
    },
    /// The parameter domain has zero length.
    EmptyDomain,
    /// Surface control points do not fill a whole grid.
    GridShape { points: usize, u_count: usize },
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoControlPoints => write!(f, "No control points"),
            Self::DimensionMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "Control point {} has {} coordinates, expected {}",
                index, actual, expected
            ),
            Self::MissingWeight => write!(f, "Rational control points need a weight"),
            Self::InvalidOrder {
                knots,
                control_points,
            } => write!(
                f,
                "{} knots do not fit {} control points",
                knots, control_points
            ),
            Self::NotMonotonic { index } => write!(f, "Knot {} decreases", index),
            Self::EndMultiplicity {
                multiplicity,
                maximum,
            } => write!(
                f,
                "End knot repeated {} times (maximum {})",
                multiplicity, maximum
            ),
            Self::InteriorMultiplicity {
                knot,
                multiplicity,
                maximum,
            } => write!(
                f,
                "Interior knot {} repeated {} times (maximum {})",
                knot, multiplicity, maximum
            ),
            Self::EmptyDomain => write!(f, "Knot vector has an empty domain"),
            Self::GridShape { points, u_count } => write!(
                f,
                "{} control points do not form rows of {}",
                points, u_count
            ),
        }
    }
}

impl std::error::Error for CurveError {}
