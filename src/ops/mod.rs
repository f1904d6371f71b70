//! # Numeric Kernels
//!
//! Slice-level implementations of every numeric routine the crate needs.
//! [`Tensor`](crate::tensors::Tensor), the layers, the loss and the optimizer
//! validate shapes and then hand flat row-major buffers to these kernels.
//!
//! ## Submodules
//!
//! - [`cpu`]: Multi-threaded CPU kernels (serial when the `parallel` feature is off)
//!
//! ## Notes
//!
//! - Kernels never check shapes; callers do.
//! - Parallelism only ever splits independent output elements, so results are
//!   identical with and without the `parallel` feature.

pub mod cpu;
