//! Sequential composition of layers.
//!
//! [`Sequential`] owns its layers, runs `forward` left to right and `backward`
//! right to left, and exposes the concatenated parameters of every layer that
//! has any, in layer order.
//!
//! # Example
//!
//! ```rust
//! use handgrad::prelude::*;
//!
//! let mut model = Sequential::new()
//!     .with(Dense::seeded(2, 4, 0))
//!     .with(Activation::tanh())
//!     .with(Dense::seeded(4, 1, 1));
//!
//! let x = handgrad::tensor!([[0.0, 1.0], [1.0, 0.0]]);
//! let y = model.forward(&x).unwrap();
//! assert_eq!(y.shape(), &[2, 1]);
//! assert_eq!(model.parameters().len(), 4);
//! ```

use crate::error::{Error, Result};
use crate::layers::{Layer, ParamSet};
use crate::modelio;
use crate::tensors::Tensor;
use std::path::Path;

/// An ordered chain of layers.
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
    training: bool,
}

impl Default for Sequential {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Sequential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sequential")
            .field("layers", &self.layers.iter().map(|l| l.name()).collect::<Vec<_>>())
            .field("training", &self.training)
            .finish()
    }
}

impl Sequential {
    /// An empty container in training mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            training: true,
        }
    }

    /// Appends `layer` at the end of the chain.
    pub fn add(&mut self, layer: impl Layer + 'static) {
        self.layers.push(Box::new(layer));
    }

    /// Builder form of [`Sequential::add`].
    #[must_use]
    pub fn with(mut self, layer: impl Layer + 'static) -> Self {
        self.add(layer);
        self
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the container holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The layer at `index`.
    ///
    /// # Errors
    /// Returns [`Error::LayerIndex`] past the end.
    pub fn layer(&self, index: usize) -> Result<&dyn Layer> {
        match self.layers.get(index) {
            Some(layer) => Ok(&**layer),
            None => Err(Error::LayerIndex {
                index,
                len: self.layers.len(),
            }),
        }
    }

    /// Mutable access to the layer at `index`.
    ///
    /// # Errors
    /// Returns [`Error::LayerIndex`] past the end.
    pub fn layer_mut(&mut self, index: usize) -> Result<&mut dyn Layer> {
        let len = self.layers.len();
        match self.layers.get_mut(index) {
            Some(layer) => Ok(&mut **layer),
            None => Err(Error::LayerIndex { index, len }),
        }
    }

    /// Switches to training mode.
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Switches to evaluation mode.
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Whether the container is in training mode.
    #[must_use]
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Runs every layer in order. An empty container returns a copy of `input`.
    ///
    /// # Errors
    /// Propagates the first layer error; later layers are not run.
    pub fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        tracing::debug!(layers = self.layers.len(), shape = ?input.shape(), "forward pass");

        let mut current = input.clone();
        for (i, layer) in self.layers.iter_mut().enumerate() {
            current = layer.forward(&current)?;
            tracing::trace!(index = i, layer = layer.name(), shape = ?current.shape(), "layer forward");
        }
        Ok(current)
    }

    /// Threads `grad_output` back through the layers in reverse order.
    ///
    /// # Errors
    /// Propagates the first layer error.
    pub fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor> {
        tracing::debug!(layers = self.layers.len(), shape = ?grad_output.shape(), "backward pass");

        let mut grad = grad_output.clone();
        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            grad = layer.backward(&grad)?;
            tracing::trace!(index = i, layer = layer.name(), shape = ?grad.shape(), "layer backward");
        }
        Ok(grad)
    }

    /// Parameters of every layer that has any, in layer order.
    #[must_use]
    pub fn parameters(&self) -> Vec<&Tensor> {
        self.layers
            .iter()
            .filter(|l| l.has_parameters())
            .flat_map(|l| l.parameters())
            .collect()
    }

    /// Gradients, index-aligned with [`Sequential::parameters`].
    #[must_use]
    pub fn gradients(&self) -> Vec<&Tensor> {
        self.layers
            .iter()
            .filter(|l| l.has_parameters())
            .flat_map(|l| l.gradients())
            .collect()
    }

    /// Mutable parameter/gradient pairs for one optimizer step.
    pub fn parameters_mut(&mut self) -> ParamSet<'_> {
        let mut set = ParamSet::default();
        for layer in self.layers.iter_mut().filter(|l| l.has_parameters()) {
            set.extend(layer.parameters_mut());
        }
        set
    }

    /// Sets every gradient to zero.
    pub fn zero_grad(&mut self) {
        let mut set = self.parameters_mut();
        for g in set.grads_mut() {
            g.fill(0.0);
        }
    }

    /// Writes all parameters to a `.bpat` file.
    ///
    /// # Errors
    /// See [`modelio::save_parameters`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        modelio::save_parameters(path, &self.parameters())
    }

    /// Reads parameters from a `.bpat` file written by a model of the same
    /// architecture.
    ///
    /// Every tensor is checked against the current parameters before any is
    /// overwritten.
    ///
    /// # Errors
    /// Returns [`Error::Format`] if the tensor count or any shape differs, and
    /// the errors of [`modelio::load_parameters`].
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let loaded = modelio::load_parameters(path)?;
        let current = self.parameters();

        if loaded.len() != current.len() {
            tracing::warn!(
                expected = current.len(),
                found = loaded.len(),
                "parameter count mismatch"
            );
            return Err(Error::Format {
                detail: format!(
                    "file holds {} tensors but the model has {} parameters",
                    loaded.len(),
                    current.len()
                ),
            });
        }
        for (i, (param, tensor)) in current.iter().zip(&loaded).enumerate() {
            if param.shape() != tensor.shape() {
                return Err(Error::Format {
                    detail: format!(
                        "parameter {i} has shape {:?} but the file holds {:?}",
                        param.shape(),
                        tensor.shape()
                    ),
                });
            }
        }

        let mut set = self.parameters_mut();
        let (params, _) = set.split();
        for (param, tensor) in params.iter_mut().zip(&loaded) {
            param.copy_from_slice(tensor.data());
        }
        Ok(())
    }
}
