use super::Layer;
use crate::error::{Error, Result};
use crate::ops::cpu;
use crate::tensors::Tensor;

/// The nonlinearity applied by an [`Activation`] layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    /// `max(0, x)`.
    Relu,
    /// `1 / (1 + e^-x)`.
    Sigmoid,
    /// Hyperbolic tangent.
    Tanh,
    /// Softmax along the last axis of a rank-1 or rank-2 input.
    Softmax,
}

impl ActivationKind {
    fn name(self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Softmax => "softmax",
        }
    }
}

/// Parameterless activation layer.
///
/// Only the last input is cached; `backward` recomputes whatever it needs
/// from it, which reproduces the forward values exactly.
#[derive(Debug, Clone)]
pub struct Activation {
    kind: ActivationKind,
    input: Option<Tensor>,
}

impl Activation {
    /// Creates an activation layer of the given kind.
    #[must_use]
    pub const fn new(kind: ActivationKind) -> Self {
        Self { kind, input: None }
    }

    /// ReLU layer.
    #[must_use]
    pub const fn relu() -> Self {
        Self::new(ActivationKind::Relu)
    }

    /// Sigmoid layer.
    #[must_use]
    pub const fn sigmoid() -> Self {
        Self::new(ActivationKind::Sigmoid)
    }

    /// Tanh layer.
    #[must_use]
    pub const fn tanh() -> Self {
        Self::new(ActivationKind::Tanh)
    }

    /// Softmax layer.
    #[must_use]
    pub const fn softmax() -> Self {
        Self::new(ActivationKind::Softmax)
    }

    /// Which nonlinearity this layer applies.
    #[must_use]
    pub const fn kind(&self) -> ActivationKind {
        self.kind
    }

    /// Row length for softmax, or a dimension error for unsupported ranks.
    fn softmax_cols(&self, shape: &[usize]) -> Result<usize> {
        match *shape {
            [cols] | [_, cols] => Ok(cols),
            _ => Err(Error::layer(
                self.name(),
                format!("expected rank 1 or 2 input, got shape {shape:?}"),
            )),
        }
    }
}

impl Layer for Activation {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let x = input.data();
        let data = match self.kind {
            ActivationKind::Relu => cpu::relu(x),
            ActivationKind::Sigmoid => cpu::sigmoid(x),
            ActivationKind::Tanh => cpu::tanh(x),
            ActivationKind::Softmax => cpu::softmax(x, self.softmax_cols(input.shape())?),
        };
        let output = Tensor::new(input.shape(), data)?;

        self.input = Some(input.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor> {
        let Some(input) = self.input.as_ref() else {
            return Err(Error::NotPrimed { layer: self.name() });
        };
        if grad_output.shape() != input.shape() {
            return Err(Error::layer(
                self.name(),
                format!(
                    "gradient shape {:?} does not match cached input {:?}",
                    grad_output.shape(),
                    input.shape()
                ),
            ));
        }

        let (x, dy) = (input.data(), grad_output.data());
        let data = match self.kind {
            ActivationKind::Relu => cpu::relu_backward(x, dy),
            ActivationKind::Sigmoid => cpu::sigmoid_backward(x, dy),
            ActivationKind::Tanh => cpu::tanh_backward(x, dy),
            ActivationKind::Softmax => {
                let cols = self.softmax_cols(input.shape())?;
                cpu::softmax_backward(&cpu::softmax(x, cols), dy, cols)
            }
        };
        Tensor::new(input.shape(), data)
    }
}
