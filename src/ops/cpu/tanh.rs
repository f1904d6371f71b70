use super::{map, zip_map};

/// Hyperbolic tangent elementwise.
#[must_use]
pub fn tanh(input: &[f64]) -> Vec<f64> {
    map(input, f64::tanh)
}

/// `dy * (1 - tanh(x)^2)`.
#[must_use]
pub fn tanh_backward(input: &[f64], grad_output: &[f64]) -> Vec<f64> {
    zip_map(input, grad_output, |x, dy| {
        let t = x.tanh();
        dy * (1.0 - t * t)
    })
}
