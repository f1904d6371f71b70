/// Mean of squared differences.
///
/// Empty inputs yield `NaN` (0 / 0).
#[must_use]
pub fn mse_loss(prediction: &[f64], target: &[f64]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = prediction.len() as f64;

    let sum: f64 = prediction
        .iter()
        .zip(target)
        .map(|(&y, &t)| {
            let diff = y - t;
            diff * diff
        })
        .sum();

    sum / n
}

/// Gradient of [`mse_loss`] with respect to the prediction: `(2 / n) * (y - t)`.
#[must_use]
pub fn mse_loss_grad(prediction: &[f64], target: &[f64]) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let scale = 2.0 / prediction.len() as f64;
    super::zip_map(prediction, target, move |y, t| (y - t) * scale)
}
