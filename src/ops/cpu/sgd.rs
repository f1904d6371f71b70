/// Performs `param -= lr * grad` in place.
///
/// # Formula
///
/// `$$ w := w - \text{lr} \cdot \frac{\partial L}{\partial w} $$`
///
/// The gradient is left untouched; zeroing is the caller's decision.
pub fn sgd(param: &mut [f64], grad: &[f64], lr: f64) {
    debug_assert_eq!(param.len(), grad.len());

    for (w, g) in param.iter_mut().zip(grad) {
        *w -= lr * g;
    }
}
