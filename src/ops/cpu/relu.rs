use super::{map, zip_map};

/// `max(0, x)` elementwise.
#[must_use]
pub fn relu(input: &[f64]) -> Vec<f64> {
    map(input, |x| if x > 0.0 { x } else { 0.0 })
}

/// Passes `grad_output` through wherever the forward input was strictly positive.
#[must_use]
pub fn relu_backward(input: &[f64], grad_output: &[f64]) -> Vec<f64> {
    zip_map(input, grad_output, |x, dy| if x > 0.0 { dy } else { 0.0 })
}
