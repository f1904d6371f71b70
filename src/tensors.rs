//! Core tensor data structures and operations.
//!
//! # Core Tensor Utilities
//!
//! This module defines [`Tensor`], a dense multi-dimensional array of `f64`
//! values, and [`WithGrad`], which pairs a tensor with its gradient.
//!
//! It supports:
//! - Construction from a shape plus data, a fill value, or a random source
//! - Checked multi-dimensional indexing
//! - Reshape and flatten into fresh, unaliased copies
//! - Elementwise addition, subtraction, Hadamard product and scalar scaling
//! - Rank-2 matrix multiplication and transpose
//! - The `tensor!` macro for literals
//!
//! ## Design Highlights
//! - Data is stored flat in row-major order: the last axis varies fastest
//! - `data.len() == shape.iter().product()` is enforced at construction and kept by every operation
//! - Operations validate first and fail with [`Error`] instead of panicking
//! - Values are owned; cloning a tensor never shares storage
//!
//! ## Limitations
//! - No broadcasting: elementwise operands must have identical shapes
//! - `matmul` and `transpose` are defined for rank 2 only
//!
//! ## Example
//!
//! ```rust
//! use handgrad::tensors::Tensor;
//! let t = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! assert_eq!(t.shape(), &[2, 3]);
//! assert_eq!(t.get(&[1, 0]).unwrap(), 4.0);
//! ```

use crate::approx::RelativeEq;
use crate::error::{Error, Result};
use crate::ops::cpu;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// An N-dimensional tensor with a shape and flat row-major data.
///
/// A rank-0 tensor (empty shape) holds exactly one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Default for Tensor {
    fn default() -> Self {
        Self::zeros(vec![0])
    }
}

/// Number of elements described by `shape`, or `None` if it overflows `usize`.
pub(crate) fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

impl Tensor {
    /// Creates a tensor from a shape and row-major data.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] if `data.len()` differs from the product of
    /// `shape`, or if that product overflows `usize`.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<f64>) -> Result<Self> {
        let shape = shape.into();
        if element_count(&shape) != Some(data.len()) {
            return Err(Error::shape("new", &shape, &[data.len()]));
        }
        Ok(Self { shape, data })
    }

    /// Creates a tensor of the given shape with every element set to `value`.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] if the element count overflows `usize`.
    pub fn try_full(shape: impl Into<Vec<usize>>, value: f64) -> Result<Self> {
        let shape = shape.into();
        let Some(len) = element_count(&shape) else {
            return Err(Error::shape("full", &shape, &[]));
        };
        Ok(Self {
            shape,
            data: vec![value; len],
        })
    }

    /// Wraps a vector as a rank-1 tensor.
    #[must_use]
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Creates a tensor of the given shape with every element set to `value`.
    ///
    /// # Panics
    /// Panics if the element count overflows `usize`, like any allocation
    /// that large would. Use [`Tensor::try_full`] for untrusted shapes.
    #[must_use]
    pub fn full(shape: impl Into<Vec<usize>>, value: f64) -> Self {
        match Self::try_full(shape, value) {
            Ok(t) => t,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates a zero-filled tensor.
    ///
    /// # Panics
    /// See [`Tensor::full`].
    #[must_use]
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        Self::full(shape, 0.0)
    }

    /// Creates a tensor filled with ones.
    ///
    /// # Panics
    /// See [`Tensor::full`].
    #[must_use]
    pub fn ones(shape: impl Into<Vec<usize>>) -> Self {
        Self::full(shape, 1.0)
    }

    /// Creates a tensor of samples drawn uniformly from `[0, 1)`.
    ///
    /// The caller owns the random source, so runs are reproducible when it is seeded.
    ///
    /// # Panics
    /// See [`Tensor::full`].
    #[must_use]
    pub fn random<R: Rng>(shape: impl Into<Vec<usize>>, rng: &mut R) -> Self {
        let mut t = Self::zeros(shape);
        for x in &mut t.data {
            *x = rng.random::<f64>();
        }
        t
    }

    /// [`Tensor::random`] with a freshly seeded [`StdRng`].
    #[must_use]
    pub fn random_seeded(shape: impl Into<Vec<usize>>, seed: u64) -> Self {
        Self::random(shape, &mut StdRng::seed_from_u64(seed))
    }

    /// Zero-filled tensor with the same shape as `self`.
    #[must_use]
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.shape.clone())
    }

    /// Stacks equally shaped tensors along a new leading axis.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] if `items` is empty or any item's shape differs from the first.
    pub fn stack(items: &[Self]) -> Result<Self> {
        let Some(first) = items.first() else {
            return Err(Error::shape("stack", &[], &[]));
        };
        if let Some(bad) = items.iter().find(|t| t.shape != first.shape) {
            return Err(Error::shape("stack", &first.shape, &bad.shape));
        }

        let mut shape = Vec::with_capacity(first.rank() + 1);
        shape.push(items.len());
        shape.extend_from_slice(&first.shape);

        let mut data = Vec::with_capacity(items.len() * first.len());
        for item in items {
            data.extend_from_slice(&item.data);
        }
        Ok(Self { shape, data })
    }

    /// The dimension sizes.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Total number of elements, the product of the shape.
    #[must_use]
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Whether the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major strides: the last entry is 1, each earlier one is the
    /// next stride times the next dimension.
    #[must_use]
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.shape.len()];
        for d in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * self.shape[d + 1];
        }
        strides
    }

    /// Flat row-major view of the elements.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable flat view. The length cannot change, so the shape invariant holds.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consumes the tensor and returns its buffer.
    #[must_use]
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    fn offset(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.shape.len() {
            return Err(Error::Index {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }

        let mut offset = 0;
        let mut stride = 1;
        for (&i, &dim) in index.iter().zip(&self.shape).rev() {
            if i >= dim {
                return Err(Error::Index {
                    index: index.to_vec(),
                    shape: self.shape.clone(),
                });
            }
            offset += i * stride;
            stride *= dim;
        }
        Ok(offset)
    }

    /// Reads the element at `index`.
    ///
    /// # Errors
    /// Returns [`Error::Index`] on wrong arity or an out-of-range coordinate.
    pub fn get(&self, index: &[usize]) -> Result<f64> {
        Ok(self.data[self.offset(index)?])
    }

    /// Mutable reference to the element at `index`.
    ///
    /// # Errors
    /// Returns [`Error::Index`] on wrong arity or an out-of-range coordinate.
    pub fn at(&mut self, index: &[usize]) -> Result<&mut f64> {
        let offset = self.offset(index)?;
        Ok(&mut self.data[offset])
    }

    /// Returns a copy with a new shape and the same element order.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] if the element counts differ.
    pub fn reshape(&self, shape: impl Into<Vec<usize>>) -> Result<Self> {
        let shape = shape.into();
        if element_count(&shape) != Some(self.len()) {
            return Err(Error::shape("reshape", &self.shape, &shape));
        }
        Ok(Self {
            shape,
            data: self.data.clone(),
        })
    }

    /// Rank-1 copy of all elements.
    #[must_use]
    pub fn flatten(&self) -> Self {
        Self::from_vec(self.data.clone())
    }

    fn zip_with<F>(&self, other: &Self, op: &'static str, f: F) -> Result<Self>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync,
    {
        if self.shape != other.shape {
            return Err(Error::shape(op, &self.shape, &other.shape));
        }
        Ok(Self {
            shape: self.shape.clone(),
            data: cpu::zip_map(&self.data, &other.data, f),
        })
    }

    /// Elementwise sum.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] unless both shapes are identical.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Elementwise difference.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] unless both shapes are identical.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    /// Elementwise (Hadamard) product.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] unless both shapes are identical.
    pub fn hadamard(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, "hadamard", |a, b| a * b)
    }

    /// Multiplies every element by `scalar`.
    #[must_use]
    pub fn scale(&self, scalar: f64) -> Self {
        Self {
            shape: self.shape.clone(),
            data: cpu::map(&self.data, |x| x * scalar),
        }
    }

    /// Sum of all elements.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Matrix product of two rank-2 tensors: `[m, k] · [k, n] -> [m, n]`.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] if either operand is not rank 2 or the inner
    /// dimensions differ.
    pub fn matmul(&self, other: &Self) -> Result<Self> {
        let (&[m, k], &[k2, n]) = (self.shape.as_slice(), other.shape.as_slice()) else {
            return Err(Error::shape("matmul", &self.shape, &other.shape));
        };
        if k != k2 {
            return Err(Error::shape("matmul", &self.shape, &other.shape));
        }
        Ok(Self {
            shape: vec![m, n],
            data: cpu::matmul(&self.data, &other.data, m, k, n),
        })
    }

    /// Swaps the two axes of a rank-2 tensor.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] for any other rank.
    pub fn transpose(&self) -> Result<Self> {
        let &[rows, cols] = self.shape.as_slice() else {
            return Err(Error::shape("transpose", &self.shape, &[]));
        };
        Ok(Self {
            shape: vec![cols, rows],
            data: cpu::transpose(&self.data, rows, cols),
        })
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Same shape and every element within `epsilon` of its counterpart.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.shape == other.shape && self.data.as_slice().within(other.data.as_slice(), epsilon)
    }
}

impl core::ops::Mul<f64> for &Tensor {
    type Output = Tensor;

    fn mul(self, scalar: f64) -> Tensor {
        self.scale(scalar)
    }
}

impl core::ops::Mul<f64> for Tensor {
    type Output = Tensor;

    fn mul(mut self, scalar: f64) -> Tensor {
        for x in &mut self.data {
            *x *= scalar;
        }
        self
    }
}

/// A trainable value paired with the gradient of the loss with respect to it.
///
/// Layers own these; the optimizer only ever sees short-lived borrows.
#[derive(Debug, Clone, PartialEq)]
pub struct WithGrad {
    value: Tensor,
    grad: Tensor,
}

impl WithGrad {
    /// Wraps `value` with a zero-initialised gradient of the same shape.
    #[must_use]
    pub fn new(value: Tensor) -> Self {
        let grad = value.zeros_like();
        Self { value, grad }
    }

    /// Immutable access to the value.
    #[must_use]
    pub const fn value(&self) -> &Tensor {
        &self.value
    }

    /// Immutable access to the gradient.
    #[must_use]
    pub const fn grad(&self) -> &Tensor {
        &self.grad
    }

    /// Disjoint mutable views of the value and gradient elements.
    ///
    /// Only elements are exposed, so neither shape can change through them.
    pub fn split_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (self.value.data_mut(), self.grad.data_mut())
    }

    /// Overwrites the gradient. The caller guarantees the shape matches the value.
    pub(crate) fn set_grad(&mut self, grad: Tensor) {
        debug_assert_eq!(grad.shape(), self.value.shape());
        self.grad = grad;
    }
}

/// Defines a tensor from nested literal arrays.
///
/// Supports arbitrary rank as long as sibling lists share a shape.
///
/// # Panics
/// Panics on ragged literals (rows with mismatched shapes).
///
/// # Example
/// ```
/// use handgrad::tensor;
/// let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(t.shape(), &[2, 2]);
/// let v = tensor!([-1.0, 0.5]);
/// assert_eq!(v.data(), &[-1.0, 0.5]);
/// ```
#[macro_export]
macro_rules! tensor {
    ([ $( $x:literal ),+ $(,)? ]) => {
        $crate::tensors::Tensor::from_vec(::std::vec![ $( $x as f64 ),+ ])
    };

    ([ $( $inner:tt ),+ $(,)? ]) => {{
        let rows = ::std::vec![ $( $crate::tensor!($inner) ),+ ];
        $crate::tensors::Tensor::stack(&rows)
            .expect("ragged tensor literal (rows have mismatched shapes)")
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_are_row_major() {
        let t = Tensor::zeros(vec![2, 3, 4]);
        assert_eq!(t.strides(), vec![12, 4, 1]);
        assert_eq!(Tensor::zeros(vec![5]).strides(), vec![1]);
    }

    #[test]
    fn offset_follows_strides() {
        let data: Vec<f64> = (0..24).map(f64::from).collect();
        let t = Tensor::new(vec![2, 3, 4], data).unwrap();
        assert_eq!(t.get(&[1, 2, 3]).unwrap(), 23.0);
        assert_eq!(t.get(&[0, 1, 2]).unwrap(), 6.0);
        assert_eq!(t.get(&[1, 0, 0]).unwrap(), 12.0);
    }

    #[test]
    fn rank_zero_tensor_holds_one_element() {
        let mut t = Tensor::zeros(Vec::new());
        assert_eq!(t.len(), 1);
        *t.at(&[]).unwrap() = 3.5;
        assert_eq!(t.get(&[]).unwrap(), 3.5);
    }

    #[test]
    fn failed_operations_leave_tensor_untouched() {
        let mut t = Tensor::ones(vec![2, 2]);
        let before = t.clone();
        assert!(t.at(&[2, 0]).is_err());
        assert!(t.reshape(vec![3]).is_err());
        assert_eq!(t, before);
    }

    #[test]
    fn overflowing_shapes_are_rejected() {
        let huge: Vec<usize> = vec![usize::MAX, 2];
        assert!(matches!(
            Tensor::new(huge.clone(), Vec::new()),
            Err(Error::Shape { op: "new", .. })
        ));
        assert!(matches!(
            Tensor::try_full(huge.clone(), 0.0),
            Err(Error::Shape { op: "full", .. })
        ));

        let empty = Tensor::zeros(vec![0]);
        assert!(matches!(
            empty.reshape(vec![usize::MAX, 2, 1]),
            Err(Error::Shape { op: "reshape", .. })
        ));
        assert!(empty.reshape(vec![0, usize::MAX]).is_ok());
    }

    #[test]
    fn with_grad_views_keep_shapes() {
        let mut w = WithGrad::new(Tensor::ones(vec![2, 3]));
        let (value, grad) = w.split_mut();
        value.fill(2.0);
        grad[5] = 1.0;
        assert_eq!(w.value().shape(), &[2, 3]);
        assert_eq!(w.value().sum(), 12.0);
        assert_eq!(w.grad().get(&[1, 2]).unwrap(), 1.0);
    }

    #[test]
    fn scalar_multiplication_operators_agree() {
        let t = Tensor::from_vec(vec![1.0, -2.0, 3.0]);
        assert_eq!(&t * 2.0, t.scale(2.0));
        assert_eq!(t.clone() * 2.0, t.scale(2.0));
    }

    #[test]
    fn with_grad_starts_at_zero() {
        let w = WithGrad::new(Tensor::ones(vec![2, 3]));
        assert_eq!(w.grad(), &Tensor::zeros(vec![2, 3]));
    }
}
