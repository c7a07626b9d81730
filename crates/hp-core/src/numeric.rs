use crate::CoreError;

/// Floating point type used throughout the engine.
pub type Real = f64;

/// One tolerance for everything.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-6,
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Running cumulative sum of a series.
pub fn cumulative_sum(series: &[Real]) -> Vec<Real> {
    let mut acc = 0.0;
    series
        .iter()
        .map(|v| {
            acc += v;
            acc
        })
        .collect()
}

/// Largest deficit (magnitude of the most negative cumulative value) in a
/// generation-minus-demand series. Zero when the cumulative balance never
/// goes negative.
pub fn largest_deficit(series: &[Real]) -> Real {
    cumulative_sum(series)
        .into_iter()
        .filter(|v| *v < 0.0)
        .fold(0.0, |worst: Real, v| worst.max(-v))
}

/// Linear interpolation of `y(x)` over tabulated points with ascending `xs`.
/// Clamps at the table ends.
pub fn interp(x: Real, xs: &[Real], ys: &[Real]) -> Real {
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert!(!xs.is_empty());
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    let i = xs.partition_point(|v| *v < x);
    let frac = (x - xs[i - 1]) / (xs[i] - xs[i - 1]);
    ys[i - 1] + frac * (ys[i] - ys[i - 1])
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn deficit_is_never_negative(series in prop::collection::vec(-10.0..10.0f64, 0..64)) {
            prop_assert!(largest_deficit(&series) >= 0.0);
        }

        #[test]
        fn nonnegative_series_has_no_deficit(series in prop::collection::vec(0.0..10.0f64, 0..64)) {
            prop_assert_eq!(largest_deficit(&series), 0.0);
        }

        #[test]
        fn interp_stays_within_the_tabulated_span(x in -5.0..15.0f64) {
            let xs = [0.0, 2.0, 5.0, 10.0];
            let ys = [1.0, 4.0, 3.0, 8.0];
            let y = interp(x, &xs, &ys);
            prop_assert!((1.0..=8.0).contains(&y));
        }
    }
}
