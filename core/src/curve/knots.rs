//! Knot vectors and basis functions.

use super::error::CurveError;

/// Knot vector that repeats its ends `degree + 1` times, with uniformly
/// spaced interior knots over `[0, 1]`.
///
/// A curve on a clamped knot vector interpolates its first and last control
/// points.
pub fn clamped_knots(count: usize, degree: usize) -> Vec<f64> {
    let interior = count.saturating_sub(degree + 1);
    let mut knots = Vec::with_capacity(count + degree + 1);
    knots.extend(std::iter::repeat(0.0).take(degree + 1));
    knots.extend((1..=interior).map(|i| i as f64 / (interior + 1) as f64));
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

/// Evenly spaced integer knots `0, 1, .., count + degree`.
pub fn uniform_knots(count: usize, degree: usize) -> Vec<f64> {
    (0..count + degree + 1).map(|i| i as f64).collect()
}

/// Check `knots` against `count` control points and return the degree.
pub fn validate_knots(knots: &[f64], count: usize) -> Result<usize, CurveError> {
    if count == 0 {
        return Err(CurveError::NoControlPoints);
    }
    let len = knots.len();
    if len <= count || len - count > count {
        return Err(CurveError::InvalidOrder {
            knots: len,
            control_points: count,
        });
    }
    let order = len - count;
    let degree = order - 1;
    if let Some(index) = (1..len).find(|&i| knots[i] < knots[i - 1]) {
        return Err(CurveError::NotMonotonic { index });
    }
    if knots[0] == knots[len - 1] || knots[degree] >= knots[count] {
        return Err(CurveError::EmptyDomain);
    }

    let mut start = 0;
    while start < len {
        let end = start + knots[start..].iter().take_while(|&&k| k == knots[start]).count();
        let multiplicity = end - start;
        if start == 0 || end == len {
            if multiplicity > order {
                return Err(CurveError::EndMultiplicity {
                    multiplicity,
                    maximum: order,
                });
            }
        } else {
            // Piecewise-constant splines still need distinct interior knots.
            let maximum = degree.max(1);
            if multiplicity > maximum {
                return Err(CurveError::InteriorMultiplicity {
                    knot: knots[start],
                    multiplicity,
                    maximum,
                });
            }
        }
        start = end;
    }
    Ok(degree)
}

/// Index `k` of the knot span `[knots[k], knots[k + 1])` holding `u`.
///
/// `u` must already lie in the domain `[knots[degree], knots[count]]`; the
/// domain end maps to the last span.
pub(crate) fn find_span(knots: &[f64], degree: usize, count: usize, u: f64) -> usize {
    if u >= knots[count] {
        return count - 1;
    }
    let at_or_below = knots[degree..=count].partition_point(|&k| k <= u);
    (degree + at_or_below.saturating_sub(1)).min(count - 1)
}

/// Values of the `degree + 1` basis functions that are nonzero on `span`,
/// for control points `span - degree ..= span`.
pub(crate) fn basis_functions(knots: &[f64], span: usize, degree: usize, u: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;
    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom == 0.0 { 0.0 } else { n[r] / denom };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// First derivatives of the basis functions returned by
/// [`basis_functions`], built from the degree - 1 basis.
pub(crate) fn basis_derivatives(knots: &[f64], span: usize, degree: usize, u: f64) -> Vec<f64> {
    if degree == 0 {
        return vec![0.0];
    }
    // lower[r] belongs to control point span - degree + 1 + r.
    let lower = basis_functions(knots, span, degree - 1, u);
    let p = degree as f64;
    (0..=degree)
        .map(|r| {
            let i = span - degree + r;
            let mut d = 0.0;
            if r > 0 {
                let denom = knots[i + degree] - knots[i];
                if denom != 0.0 {
                    d += p * lower[r - 1] / denom;
                }
            }
            if r < degree {
                let denom = knots[i + degree + 1] - knots[i + 1];
                if denom != 0.0 {
                    d -= p * lower[r] / denom;
                }
            }
            d
        })
        .collect()
}
