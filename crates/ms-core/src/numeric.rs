use crate::MsError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, MsError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MsError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, MsError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(MsError::OutOfRange { what, value: v })
    }
}

/// Finite and zero or greater.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, MsError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(MsError::OutOfRange { what, value: v })
    }
}

/// `points` evenly spaced values from `start` to `end` inclusive.
///
/// The last value is exactly `end`. A single point yields `[start]`.
pub fn linspace(start: Real, end: Real, points: usize) -> Vec<Real> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as Real;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        start + step * i as Real
                    }
                })
                .collect()
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn linspace_is_monotonic(start in -100.0_f64..100.0, span in 0.1_f64..500.0, n in 2usize..300) {
            let v = linspace(start, start + span, n);
            prop_assert_eq!(v.len(), n);
            for w in v.windows(2) {
                prop_assert!(w[1] > w[0]);
            }
        }
    }
}
