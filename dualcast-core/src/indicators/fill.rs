//! Warm-up gap filling for feature columns.

/// Forward-fill NaNs from the last seen value. Leading NaNs stay NaN.
pub fn fill_forward(values: &mut [f64]) {
    let mut last = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = last;
        } else {
            last = *v;
        }
    }
}

/// Forward-fill, then backward-fill any leading NaNs from the first seen
/// value. A column with no values stays all NaN.
pub fn fill_forward_backward(values: &mut [f64]) {
    fill_forward(values);
    let mut next = f64::NAN;
    for v in values.iter_mut().rev() {
        if v.is_nan() {
            *v = next;
        } else {
            next = *v;
        }
    }
}

/// Fill a column and replace a still-empty column with `neutral`.
pub fn finalize_column(mut values: Vec<f64>, neutral: f64) -> Vec<f64> {
    fill_forward_backward(&mut values);
    if values.iter().any(|v| v.is_nan()) {
        values.iter_mut().for_each(|v| *v = neutral);
    }
    values
}
