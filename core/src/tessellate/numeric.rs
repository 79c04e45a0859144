//! Small helpers for variable-length `f64` vectors and finite differences.

/// Step used by every numeric derivative.
pub const EPSILON: f64 = 1e-5;

pub(crate) fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().max(b.len());
    (0..n)
        .map(|i| a.get(i).copied().unwrap_or(0.0) - b.get(i).copied().unwrap_or(0.0))
        .collect()
}

pub(crate) fn scale(a: &[f64], s: f64) -> Vec<f64> {
    a.iter().map(|c| c * s).collect()
}

pub(crate) fn norm(a: &[f64]) -> f64 {
    a.iter().map(|c| c * c).sum::<f64>().sqrt()
}

pub(crate) fn is_zero(a: &[f64]) -> bool {
    a.iter().all(|&c| c == 0.0)
}

/// Unit vector along `a`; zero-length vectors are returned unchanged.
pub(crate) fn normalize(a: &[f64]) -> Vec<f64> {
    let len = norm(a);
    if len == 0.0 || !len.is_finite() {
        return a.to_vec();
    }
    scale(a, 1.0 / len)
}

/// Cross product of the first three coordinates; missing ones are zero.
pub(crate) fn cross3(a: &[f64], b: &[f64]) -> Vec<f64> {
    let a = pad::<3>(a);
    let b = pad::<3>(b);
    vec![
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// First `N` coordinates of `a`, zero-padded.
pub(crate) fn pad<const N: usize>(a: &[f64]) -> [f64; N] {
    let mut out = [0.0; N];
    for (o, c) in out.iter_mut().zip(a) {
        *o = *c;
    }
    out
}

/// First `N` coordinates of `a` as `f32`, zero-padded.
pub(crate) fn pad_f32<const N: usize>(a: &[f64]) -> [f32; N] {
    pad::<N>(a).map(|c| c as f32)
}

/// Derivative of `f` at `u` by finite differences.
///
/// Symmetric first; when that vanishes (a cusp or a clamped end), forward
/// with `+ε` and then with `-ε`.
pub fn numeric_derivative(f: impl Fn(f64) -> Vec<f64>, u: f64) -> Vec<f64> {
    let ahead = f(u + EPSILON);
    let behind = f(u - EPSILON);
    let d = scale(&sub(&ahead, &behind), 0.5 / EPSILON);
    if !is_zero(&d) {
        return d;
    }
    let here = f(u);
    let d = scale(&sub(&ahead, &here), 1.0 / EPSILON);
    if !is_zero(&d) {
        return d;
    }
    scale(&sub(&here, &behind), 1.0 / EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_difference() {
        let d = numeric_derivative(|u| vec![u * u, 3.0 * u], 2.0);
        assert!((d[0] - 4.0).abs() < 1e-6);
        assert!((d[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn one_sided_fallbacks() {
        // Symmetric difference cancels at the kink.
        let d = numeric_derivative(|u| vec![u.abs()], 0.0);
        assert!((d[0] - 1.0).abs() < 1e-9);
        let d = numeric_derivative(|u| vec![-u.abs(), 0.0], 0.0);
        assert!((d[0] + 1.0).abs() < 1e-9);
        assert_eq!(d[1], 0.0);
    }

    #[test]
    fn vector_helpers() {
        assert_eq!(cross3(&[1.0, 0.0], &[0.0, 1.0]), vec![0.0, 0.0, 1.0]);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert_eq!(normalize(&[3.0, 4.0]), vec![0.6, 0.8]);
        assert_eq!(pad_f32::<3>(&[1.0, 2.0]), [1.0, 2.0, 0.0]);
        assert_eq!(sub(&[1.0], &[0.0, 2.0]), vec![1.0, -2.0]);
    }
}
