use super::{map, zip_map};

#[inline]
fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logistic sigmoid `1 / (1 + e^-x)` elementwise.
#[must_use]
pub fn sigmoid(input: &[f64]) -> Vec<f64> {
    map(input, logistic)
}

/// `dy * s * (1 - s)` where `s` is recomputed from the forward input.
#[must_use]
pub fn sigmoid_backward(input: &[f64], grad_output: &[f64]) -> Vec<f64> {
    zip_map(input, grad_output, |x, dy| {
        let s = logistic(x);
        dy * s * (1.0 - s)
    })
}
