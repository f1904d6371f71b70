//! Parallel CPU tensor kernels
//!
//! # CPU Backend
//!
//! These functions operate on flat, row-major `f64` buffers. They are the
//! building blocks behind tensor arithmetic and the layer passes.
//!
//! ## Features
//!
//! - Parallel execution using [`rayon`](https://docs.rs/rayon) with the `parallel` feature
//! - Pure serial fallback otherwise
//!
//! ## Implemented Ops
//!
//! - `matmul` / `transpose`: Rank-2 matrix product and transpose
//! - `relu`, `sigmoid`, `tanh`: Pointwise activations with backward passes
//! - `softmax`: Row-wise softmax with the full Jacobian-vector backward
//! - `mse_loss`: Mean squared error and its gradient
//! - `sgd`: In-place stochastic gradient descent step
//!
//! ## Design Goals
//!
//! - Deterministic results regardless of thread scheduling
//! - Summation order identical to a naive left-to-right loop

#[cfg(feature = "parallel")]
use rayon::prelude::*;

mod matmul;
pub use self::matmul::{matmul, transpose};

mod mse_loss;
pub use self::mse_loss::{mse_loss, mse_loss_grad};

mod relu;
pub use self::relu::{relu, relu_backward};

mod sgd;
pub use self::sgd::sgd;

mod sigmoid;
pub use self::sigmoid::{sigmoid, sigmoid_backward};

mod softmax;
pub use self::softmax::{softmax, softmax_backward};

mod tanh;
pub use self::tanh::{tanh, tanh_backward};

/// Applies `f` to every element.
pub fn map<F>(input: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        input.par_iter().map(|&x| f(x)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        input.iter().map(|&x| f(x)).collect()
    }
}

/// Combines two equally long buffers element by element.
///
/// Extra elements of the longer buffer are ignored; callers guarantee equal length.
pub fn zip_map<F>(lhs: &[f64], rhs: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    debug_assert_eq!(lhs.len(), rhs.len());

    #[cfg(feature = "parallel")]
    {
        lhs.par_iter()
            .zip(rhs.par_iter())
            .map(|(&a, &b)| f(a, b))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        lhs.iter().zip(rhs).map(|(&a, &b)| f(a, b)).collect()
    }
}
