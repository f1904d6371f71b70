//! # Layers
//!
//! A layer is a differentiable unit with a hand-written backward pass. There is
//! no computation graph: each layer caches whatever its `backward` needs during
//! `forward`, and the caller threads gradients back through the chain itself.
//!
//! ## Provided Layers
//!
//! - [`Dense`]: Affine transform `y = W·x + b` with Xavier-uniform weights
//! - [`Activation`]: ReLU, Sigmoid, Tanh and row-wise Softmax
//!
//! ## Parameter Access
//!
//! Layers own their parameters and gradients. Optimizers never store handles;
//! they borrow a [`ParamSet`] for the duration of a single update.

use crate::error::Result;
use crate::tensors::{Tensor, WithGrad};

mod activation;
pub use activation::*;

mod dense;
pub use dense::*;

/// A differentiable unit with explicit forward and backward passes.
///
/// `backward` must follow a successful `forward` on the same instance and
/// receives the gradient of the loss with respect to that forward's output.
pub trait Layer {
    /// Short, static name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Computes the output for `input` and caches what `backward` needs.
    ///
    /// # Errors
    /// Returns [`Error::LayerDimension`](crate::Error::LayerDimension) for an
    /// input the layer cannot handle. The cache is left untouched in that case.
    fn forward(&mut self, input: &Tensor) -> Result<Tensor>;

    /// Propagates `grad_output` back, storing parameter gradients and
    /// returning the gradient with respect to the last input.
    ///
    /// # Errors
    /// Returns [`Error::NotPrimed`](crate::Error::NotPrimed) before any
    /// forward pass and [`Error::LayerDimension`](crate::Error::LayerDimension)
    /// when `grad_output` does not match the cached pass.
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor>;

    /// Whether the layer has trainable parameters.
    fn has_parameters(&self) -> bool {
        false
    }

    /// Trainable parameters in a stable order.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// Gradients, index-aligned with [`Layer::parameters`].
    fn gradients(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// Mutable parameter/gradient pairs, index-aligned with [`Layer::parameters`].
    fn parameters_mut(&mut self) -> ParamSet<'_> {
        ParamSet::default()
    }
}

/// Index-aligned mutable views of parameters and their gradients.
///
/// Built from layers for one update and dropped right after, so no handle
/// outlives the step that uses it. Only elements are exposed: a layer's
/// parameter shapes cannot change through a set.
#[derive(Debug, Default)]
pub struct ParamSet<'a> {
    params: Vec<&'a mut [f64]>,
    grads: Vec<&'a mut [f64]>,
}

impl<'a> ParamSet<'a> {
    /// Adds the value and gradient of `slot` as one pair.
    pub fn push(&mut self, slot: &'a mut WithGrad) {
        let (value, grad) = slot.split_mut();
        self.params.push(value);
        self.grads.push(grad);
    }

    /// Appends every pair of `other`, preserving order.
    pub fn extend(&mut self, other: ParamSet<'a>) {
        self.params.extend(other.params);
        self.grads.extend(other.grads);
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The parameter views.
    #[must_use]
    pub fn params(&self) -> &[&'a mut [f64]] {
        &self.params
    }

    /// The gradient views.
    #[must_use]
    pub fn grads(&self) -> &[&'a mut [f64]] {
        &self.grads
    }

    /// Disjoint access: parameters mutably, gradients read-only.
    pub fn split(&mut self) -> (&mut [&'a mut [f64]], Vec<&[f64]>) {
        let grads = self.grads.iter().map(|g| &**g).collect();
        (&mut self.params, grads)
    }

    /// Mutable access to the gradient views.
    pub fn grads_mut(&mut self) -> &mut [&'a mut [f64]] {
        &mut self.grads
    }
}
