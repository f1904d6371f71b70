use super::{Layer, ParamSet};
use crate::error::{Error, Result};
use crate::ops::cpu;
use crate::tensors::{Tensor, WithGrad};
use rand::{Rng, SeedableRng, rngs::StdRng};

const NAME: &str = "dense";

/// Fully connected layer computing `y = W·x + b`.
///
/// Accepts a single sample of shape `[in]` or a batch of shape `[batch, in]`.
/// Weights have shape `[out, in]` and the bias has shape `[out]`.
///
/// Gradients are overwritten by every `backward` call. For batches they are
/// summed over the batch axis, not averaged.
#[derive(Debug, Clone)]
pub struct Dense {
    weights: WithGrad,
    bias: WithGrad,
    input: Option<Tensor>,
}

impl Dense {
    /// Creates a layer with Xavier-uniform weights drawn from `rng` and a zero bias.
    ///
    /// Weights are uniform in `[-limit, limit]` with
    /// `limit = sqrt(6 / (in_features + out_features))`.
    #[must_use]
    pub fn new<R: Rng>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let limit = (6.0 / (in_features + out_features) as f64).sqrt();

        let mut weights = Tensor::random([out_features, in_features], rng);
        for w in weights.data_mut() {
            *w = *w * 2.0 * limit - limit;
        }

        tracing::debug!(in_features, out_features, limit, "initialised dense layer");

        Self {
            weights: WithGrad::new(weights),
            bias: WithGrad::new(Tensor::zeros([out_features])),
            input: None,
        }
    }

    /// [`Dense::new`] with a [`StdRng`] seeded from `seed`.
    #[must_use]
    pub fn seeded(in_features: usize, out_features: usize, seed: u64) -> Self {
        Self::new(in_features, out_features, &mut StdRng::seed_from_u64(seed))
    }

    /// Builds a layer from explicit weights `[out, in]` and bias `[out]`.
    ///
    /// # Errors
    /// Returns [`Error::LayerDimension`] if the weights are not rank 2 or the
    /// bias does not have shape `[out]`.
    pub fn from_parts(weights: Tensor, bias: Tensor) -> Result<Self> {
        let &[out_features, _] = weights.shape() else {
            return Err(Error::layer(
                NAME,
                format!("weights must be rank 2, got shape {:?}", weights.shape()),
            ));
        };
        if bias.shape() != [out_features] {
            return Err(Error::layer(
                NAME,
                format!(
                    "bias shape {:?} does not fit {out_features} outputs",
                    bias.shape()
                ),
            ));
        }

        Ok(Self {
            weights: WithGrad::new(weights),
            bias: WithGrad::new(bias),
            input: None,
        })
    }

    /// Size of each input sample.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.weights.value().shape()[1]
    }

    /// Size of each output sample.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.weights.value().shape()[0]
    }

    /// Weight matrix of shape `[out, in]`.
    #[must_use]
    pub const fn weights(&self) -> &Tensor {
        self.weights.value()
    }

    /// Bias vector of shape `[out]`.
    #[must_use]
    pub const fn bias(&self) -> &Tensor {
        self.bias.value()
    }

    /// Gradient of the loss with respect to the weights, from the last `backward`.
    #[must_use]
    pub const fn weight_grad(&self) -> &Tensor {
        self.weights.grad()
    }

    /// Gradient of the loss with respect to the bias, from the last `backward`.
    #[must_use]
    pub const fn bias_grad(&self) -> &Tensor {
        self.bias.grad()
    }

    fn add_bias_to_rows(&self, out: &mut Tensor) {
        let bias = self.bias.value().data();
        for row in out.data_mut().chunks_mut(bias.len().max(1)) {
            for (y, b) in row.iter_mut().zip(bias) {
                *y += b;
            }
        }
    }
}

/// Column sums of a `[batch, out_len]` gradient.
fn reduce_rows_sum_to_bias(dz: &Tensor, out_len: usize) -> Result<Tensor> {
    let mut acc = vec![0.0; out_len];
    if out_len > 0 {
        for row in dz.data().chunks(out_len) {
            for (a, g) in acc.iter_mut().zip(row) {
                *a += g;
            }
        }
    }
    Tensor::new([out_len], acc)
}

impl Layer for Dense {
    fn name(&self) -> &'static str {
        NAME
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let (in_features, out_features) = (self.in_features(), self.out_features());

        let mut output = match *input.shape() {
            [n] if n == in_features => {
                let y = cpu::matmul(
                    self.weights.value().data(),
                    input.data(),
                    out_features,
                    in_features,
                    1,
                );
                Tensor::new([out_features], y)?
            }
            [_, n] if n == in_features => input.matmul(&self.weights.value().transpose()?)?,
            [n] | [_, n] => {
                return Err(Error::layer(
                    NAME,
                    format!("expected {in_features} input features, got {n}"),
                ));
            }
            _ => {
                return Err(Error::layer(
                    NAME,
                    format!("expected rank 1 or 2 input, got shape {:?}", input.shape()),
                ));
            }
        };
        self.add_bias_to_rows(&mut output);

        self.input = Some(input.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor> {
        let Some(input) = self.input.as_ref() else {
            return Err(Error::NotPrimed { layer: NAME });
        };
        let (in_features, out_features) = (self.in_features(), self.out_features());

        let (weight_grad, bias_grad, grad_input) = match (input.shape(), grad_output.shape()) {
            (&[_], &[g]) if g == out_features => {
                // outer product g ⊗ x, and Wᵀ·g
                let dy = grad_output.data();
                let wg = cpu::matmul(dy, input.data(), out_features, 1, in_features);
                let gi = cpu::matmul(dy, self.weights.value().data(), 1, out_features, in_features);
                (
                    Tensor::new([out_features, in_features], wg)?,
                    grad_output.clone(),
                    Tensor::new([in_features], gi)?,
                )
            }
            (&[batch, _], &[gb, g]) if gb == batch && g == out_features => (
                grad_output.transpose()?.matmul(input)?,
                reduce_rows_sum_to_bias(grad_output, out_features)?,
                grad_output.matmul(self.weights.value())?,
            ),
            (cached, got) => {
                return Err(Error::layer(
                    NAME,
                    format!(
                        "gradient shape {got:?} does not match output of cached input {cached:?}"
                    ),
                ));
            }
        };

        tracing::trace!(
            weight_grad_sum = weight_grad.sum(),
            bias_grad_sum = bias_grad.sum(),
            "dense backward"
        );
        self.weights.set_grad(weight_grad);
        self.bias.set_grad(bias_grad);
        Ok(grad_input)
    }

    fn has_parameters(&self) -> bool {
        true
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![self.weights.value(), self.bias.value()]
    }

    fn gradients(&self) -> Vec<&Tensor> {
        vec![self.weights.grad(), self.bias.grad()]
    }

    fn parameters_mut(&mut self) -> ParamSet<'_> {
        let mut set = ParamSet::default();
        set.push(&mut self.weights);
        set.push(&mut self.bias);
        set
    }
}
