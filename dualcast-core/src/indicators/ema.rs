//! Exponentially weighted mean, bias-corrected.
//!
//! y[t] = sum_i w_i * x[t-i] / sum_i w_i,  w_i = (1 - alpha)^i
//!
//! Computed recursively: numerator and denominator both decay by (1 - alpha)
//! each row. Every row has a value (no warm-up), and the first row equals the
//! first input.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ewm {
    alpha: f64,
}

impl Ewm {
    /// Smoothing from a centre of mass: alpha = 1 / (1 + com).
    pub fn from_com(com: f64) -> Self {
        assert!(com >= 0.0, "EWM centre of mass must be >= 0");
        Self {
            alpha: 1.0 / (1.0 + com),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn mean(&self, values: &[f64]) -> Vec<f64> {
        ewm_mean(values, self.alpha)
    }
}

/// Bias-corrected exponentially weighted mean of `values`.
///
/// NaN inputs contribute nothing but still age the earlier weights.
pub fn ewm_mean(values: &[f64], alpha: f64) -> Vec<f64> {
    let decay = 1.0 - alpha;
    let mut num = 0.0;
    let mut den = 0.0;
    values
        .iter()
        .map(|&x| {
            num *= decay;
            den *= decay;
            if !x.is_nan() {
                num += x;
                den += 1.0;
            }
            if den > 0.0 {
                num / den
            } else {
                f64::NAN
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn first_value_is_input() {
        let out = ewm_mean(&[42.0, 43.0], 0.5);
        assert_approx(out[0], 42.0, DEFAULT_EPSILON);
    }

    #[test]
    fn matches_weighted_average_definition() {
        let xs = [1.0, 2.0, 3.0];
        let out = Ewm::from_com(1.0).mean(&xs);
        // alpha = 0.5, weights for row 2: 1, 0.5, 0.25
        let expected = (3.0 + 0.5 * 2.0 + 0.25 * 1.0) / (1.0 + 0.5 + 0.25);
        assert_approx(out[2], expected, DEFAULT_EPSILON);
        assert_approx(out[1], (2.0 + 0.5) / 1.5, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_series_is_constant() {
        let out = Ewm::from_com(12.0).mean(&[5.0; 30]);
        for v in out {
            assert_approx(v, 5.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn com_alpha() {
        assert_approx(Ewm::from_com(12.0).alpha(), 1.0 / 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn leading_nan_stays_nan() {
        let out = ewm_mean(&[f64::NAN, 2.0], 0.5);
        assert!(out[0].is_nan());
        assert_approx(out[1], 2.0, DEFAULT_EPSILON);
    }
}
