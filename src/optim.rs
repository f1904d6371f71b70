//! Optimizers.
//!
//! An optimizer mutates parameters in place from their gradients. It never
//! keeps handles between calls: every [`Optimizer::step`] receives element
//! views of the parameters it should touch, borrowed only for that call.

use crate::error::{Error, Result};
use crate::layers::ParamSet;
use crate::ops::cpu;

/// An update rule applied to index-aligned parameter/gradient pairs.
pub trait Optimizer {
    /// Updates every `params[i]` from `grads[i]`.
    ///
    /// Nothing is written unless every pair validates.
    ///
    /// # Errors
    /// Returns [`Error::SizeMismatch`] if the lists differ in length or a pair
    /// differs in element count.
    fn step(&mut self, params: &mut [&mut [f64]], grads: &[&[f64]]) -> Result<()>;

    /// Sets every gradient to zero.
    fn zero_grad(&self, grads: &mut [&mut [f64]]) {
        for g in grads {
            g.fill(0.0);
        }
    }

    /// Steps over the pairs in `set`.
    ///
    /// # Errors
    /// Same as [`Optimizer::step`].
    fn apply(&mut self, set: &mut ParamSet<'_>) -> Result<()> {
        let (params, grads) = set.split();
        self.step(params, &grads)
    }
}

/// Checks that the lists pair up before anything is mutated.
fn validate(params: &[&mut [f64]], grads: &[&[f64]]) -> Result<()> {
    if params.len() != grads.len() {
        return Err(Error::SizeMismatch {
            detail: format!(
                "{} parameters but {} gradients",
                params.len(),
                grads.len()
            ),
        });
    }
    for (i, (p, g)) in params.iter().zip(grads).enumerate() {
        if p.len() != g.len() {
            return Err(Error::SizeMismatch {
                detail: format!(
                    "parameter {i} has {} elements but its gradient has {}",
                    p.len(),
                    g.len()
                ),
            });
        }
    }
    Ok(())
}

/// Plain stochastic gradient descent: `param -= lr * grad`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    lr: f64,
}

impl Default for Sgd {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl Sgd {
    /// Creates the optimizer with learning rate `lr`.
    #[must_use]
    pub const fn new(lr: f64) -> Self {
        Self { lr }
    }

    /// Current learning rate.
    #[must_use]
    pub const fn learning_rate(&self) -> f64 {
        self.lr
    }

    /// Replaces the learning rate used by later steps.
    pub const fn set_learning_rate(&mut self, lr: f64) {
        self.lr = lr;
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [&mut [f64]], grads: &[&[f64]]) -> Result<()> {
        validate(params, grads)?;

        for (p, g) in params.iter_mut().zip(grads) {
            cpu::sgd(p, g, self.lr);
        }
        tracing::trace!(lr = self.lr, tensors = params.len(), "sgd step");
        Ok(())
    }
}
