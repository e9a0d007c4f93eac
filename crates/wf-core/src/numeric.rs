/// Pressures (psi), rates (bbl/day) and everything derived from them
pub type Real = f64;

/// Absolute and relative tolerance for float comparisons
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Arithmetic mean of the finite values, `None` when there are none.
pub fn mean(values: &[Real]) -> Option<Real> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as Real)
    }
}

/// Median of the finite values; even counts average the two middle values.
pub fn median(values: &[Real]) -> Option<Real> {
    let sorted = sorted_finite(values);
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2]))
    }
}

/// Quantile with linear interpolation between closest ranks.
///
/// `q` must lie in `[0, 1]`.
pub fn quantile(values: &[Real], q: Real) -> Option<Real> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let sorted = sorted_finite(values);
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let pos = q * (n - 1) as Real;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as Real;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Mean of the values lying inside the inclusive interquartile range.
pub fn interquartile_mean(values: &[Real]) -> Option<Real> {
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    let inner: Vec<Real> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= q1 && *v <= q3)
        .collect();
    mean(&inner)
}

fn sorted_finite(values: &[Real]) -> Vec<Real> {
    let mut sorted: Vec<Real> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn median_lies_within_bounds(values in prop::collection::vec(-1e6_f64..1e6_f64, 1..50)) {
            let m = median(&values).unwrap();
            let lo = values.iter().copied().fold(Real::INFINITY, Real::min);
            let hi = values.iter().copied().fold(Real::NEG_INFINITY, Real::max);
            prop_assert!(m >= lo && m <= hi);
        }

        #[test]
        fn interquartile_mean_lies_within_quartiles(values in prop::collection::vec(-1e6_f64..1e6_f64, 1..50)) {
            let q1 = quantile(&values, 0.25).unwrap();
            let q3 = quantile(&values, 0.75).unwrap();
            if let Some(m) = interquartile_mean(&values) {
                let tol = Tolerances { abs: 1e-6, rel: 1e-9 };
                prop_assert!(m >= q1 || nearly_equal(m, q1, tol));
                prop_assert!(m <= q3 || nearly_equal(m, q3, tol));
            }
        }
    }
}
