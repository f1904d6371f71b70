//! Error types shared by tensors, layers, losses and optimizers.
//!
//! Every fallible operation in the crate reports through [`Error`]. Nothing is
//! written before validation succeeds, so an `Err` always leaves the receiver
//! exactly as it was.

/// Errors raised by tensor algebra, layer passes and training utilities.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operand shapes are incompatible for the requested operation.
    #[error("incompatible shapes for {op}: {lhs:?} vs {rhs:?}")]
    Shape {
        /// Operation that failed.
        op: &'static str,
        /// Shape of the receiver.
        lhs: Vec<usize>,
        /// Shape of the other operand, or the requested shape.
        rhs: Vec<usize>,
    },

    /// Indexing with the wrong number of coordinates or an out-of-range one.
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    Index {
        /// Requested coordinates.
        index: Vec<usize>,
        /// Shape of the indexed tensor.
        shape: Vec<usize>,
    },

    /// A layer received an input or gradient it cannot handle.
    #[error("{layer} layer: {detail}")]
    LayerDimension {
        /// Name of the failing layer.
        layer: &'static str,
        /// What was wrong.
        detail: String,
    },

    /// `backward` was called before any successful `forward`.
    #[error("{layer} layer: backward called before forward")]
    NotPrimed {
        /// Name of the failing layer.
        layer: &'static str,
    },

    /// Parameter and gradient handles do not pair up.
    #[error("optimizer size mismatch: {detail}")]
    SizeMismatch {
        /// Which lists or pair disagreed.
        detail: String,
    },

    /// Predictions and targets handed to a loss differ in shape.
    #[error("loss shape mismatch: predictions {predictions:?} vs targets {targets:?}")]
    LossShapeMismatch {
        /// Shape of the predictions.
        predictions: Vec<usize>,
        /// Shape of the targets.
        targets: Vec<usize>,
    },

    /// Layer lookup past the end of a container.
    #[error("layer index {index} out of range for {len} layers")]
    LayerIndex {
        /// Requested position.
        index: usize,
        /// Number of layers in the container.
        len: usize,
    },

    /// Reading or writing a model file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A model file is malformed or does not fit the model.
    #[error("invalid model file: {detail}")]
    Format {
        /// What was wrong.
        detail: String,
    },
}

/// Shorthand used across the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

impl Error {
    pub(crate) fn shape(op: &'static str, lhs: &[usize], rhs: &[usize]) -> Self {
        Self::Shape {
            op,
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    pub(crate) fn layer(layer: &'static str, detail: impl Into<String>) -> Self {
        Self::LayerDimension {
            layer,
            detail: detail.into(),
        }
    }
}
