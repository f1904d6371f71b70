//! # `handgrad`
//!
//! A minimal tensor engine with hand-derived backpropagation. There is no
//! computation graph and no automatic differentiation: every layer implements
//! its own closed-form backward pass, and the caller threads gradients back
//! through the chain explicitly.
//!
//! ## Features
//!
//! - **Tensors**: Dense row-major `f64` arrays with checked indexing, reshape,
//!   elementwise arithmetic, matrix multiplication and transpose
//! - **Layers**: [`Dense`] (affine) and [`Activation`] (`ReLU`, Sigmoid, Tanh,
//!   Softmax with its full Jacobian backward)
//! - **Training**: [`MseLoss`], [`Sgd`] and the [`Sequential`] container
//! - **Persistence**: `.bpat` parameter files via [`modelio`]
//! - **Parallelism**: Rayon-backed kernels behind the default `parallel` feature
//!
//! ## Modules
//!
//! - [`tensors`]: Core tensor data structures and operations
//! - [`ops`]: Flat-buffer numeric kernels
//! - [`layers`]: The [`Layer`] trait and its implementations
//! - [`loss`] and [`optim`]: Reductions and update rules
//! - [`model`]: Layer composition
//! - [`modelio`]: Saving and loading parameters
//!
//! ## Example
//!
//! ```rust
//! use handgrad::prelude::*;
//!
//! # fn main() -> handgrad::Result<()> {
//! let mut model = Sequential::new()
//!     .with(Dense::seeded(2, 8, 1))
//!     .with(Activation::tanh())
//!     .with(Dense::seeded(8, 1, 2));
//! let mut sgd = Sgd::new(0.1);
//!
//! let x = tensor!([[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
//! let t = tensor!([[0.0], [1.0], [1.0], [0.0]]);
//!
//! for _ in 0..10 {
//!     let y = model.forward(&x)?;
//!     let grad = MseLoss.backward(&y, &t)?;
//!     model.backward(&grad)?;
//!     sgd.apply(&mut model.parameters_mut())?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::many_single_char_names,
    clippy::cast_possible_truncation,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::module_name_repetitions
)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod approx;
pub mod error;
pub mod layers;
pub mod loss;
pub mod model;
pub mod modelio;
pub mod ops;
pub mod optim;
pub mod tensors;

pub use error::{Error, Result};
pub use layers::{Activation, ActivationKind, Dense, Layer, ParamSet};
pub use loss::{Loss, MseLoss};
pub use model::Sequential;
pub use optim::{Optimizer, Sgd};
pub use tensors::{Tensor, WithGrad};

/// Everything needed to build and train a model.
pub mod prelude {
    pub use crate::layers::{Activation, ActivationKind, Dense, Layer};
    pub use crate::loss::{Loss, MseLoss};
    pub use crate::model::Sequential;
    pub use crate::optim::{Optimizer, Sgd};
    pub use crate::tensor;
    pub use crate::tensors::{Tensor, WithGrad};
}
