//! Loss functions.
//!
//! A loss reduces predictions and targets to a scalar and produces the
//! gradient that seeds the backward pass. Both directions require identical
//! shapes; there is no broadcasting.

use crate::error::{Error, Result};
use crate::ops::cpu;
use crate::tensors::Tensor;

/// A differentiable reduction of predictions against targets.
pub trait Loss {
    /// The loss as a single-element tensor of shape `[1]`.
    ///
    /// # Errors
    /// Returns [`Error::LossShapeMismatch`] if the shapes differ.
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor>;

    /// Gradient of the loss with respect to `predictions`, same shape as `predictions`.
    ///
    /// # Errors
    /// Returns [`Error::LossShapeMismatch`] if the shapes differ.
    fn backward(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor>;
}

fn check_shapes(predictions: &Tensor, targets: &Tensor) -> Result<()> {
    if predictions.shape() == targets.shape() {
        Ok(())
    } else {
        Err(Error::LossShapeMismatch {
            predictions: predictions.shape().to_vec(),
            targets: targets.shape().to_vec(),
        })
    }
}

/// Mean squared error: `Σ (y - t)² / n` over every element.
///
/// An empty input yields `NaN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MseLoss;

impl Loss for MseLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor> {
        check_shapes(predictions, targets)?;
        let loss = cpu::mse_loss(predictions.data(), targets.data());
        Ok(Tensor::from_vec(vec![loss]))
    }

    fn backward(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor> {
        check_shapes(predictions, targets)?;
        Tensor::new(
            predictions.shape(),
            cpu::mse_loss_grad(predictions.data(), targets.data()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor;

    #[test]
    fn mse_matches_hand_computed_value() {
        let p = tensor!([1.0, 2.0, 3.0, 4.0]);
        let t = tensor!([1.5, 2.5, 2.5, 3.5]);

        let loss = MseLoss.forward(&p, &t).unwrap();
        assert_eq!(loss.shape(), &[1]);
        assert!((loss.data()[0] - 0.25).abs() < 1e-12);

        let grad = MseLoss.backward(&p, &t).unwrap();
        let expected = p.sub(&t).unwrap().scale(2.0 / 4.0);
        assert!(grad.approx_eq(&expected, 1e-12));
    }

    #[test]
    fn batched_shapes_are_preserved() {
        let p = Tensor::ones(vec![2, 3]);
        let grad = MseLoss.backward(&p, &Tensor::zeros(vec![2, 3])).unwrap();
        assert_eq!(grad.shape(), &[2, 3]);
        assert!(grad.data().iter().all(|&g| (g - 2.0 / 6.0).abs() < 1e-15));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let p = Tensor::zeros(vec![4]);
        let t = Tensor::zeros(vec![2, 2]);
        assert!(matches!(
            MseLoss.forward(&p, &t),
            Err(Error::LossShapeMismatch { .. })
        ));
        assert!(matches!(
            MseLoss.backward(&p, &t),
            Err(Error::LossShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_input_is_nan() {
        let e = Tensor::zeros(vec![0]);
        assert!(MseLoss.forward(&e, &e).unwrap().data()[0].is_nan());
    }
}
