//! Saving and loading of model parameters.
//!
//! # `.bpat` Parameter Format
//!
//! A `.bpat` file stores an ordered list of tensors in a small binary layout.
//! Only values are stored: the file carries no layer names, so loading relies
//! on the receiving model having the same architecture and parameter order.
//!
//! # Format Overview
//!
//! ```text
//! ┌────────────┬────────────┬─────────────────────┐
//! │ Header     │ Tensor N   │ Tensor N+1 …        │
//! ├────────────┼────────────┼─────────────────────┤
//! │ "bpat"[4]  │ u64: ndim  │ u64: ndim           │
//! │ u8: count  │ [u64; ndim] shape                │
//! │            │ [f64; prod(shape)] data          │
//! └────────────┴──────────────────────────────────┘
//! ```
//!
//! All integers and floats are little-endian.
//!
//! # Limitations
//! - Maximum 255 tensors per file (`u8` count)
//! - `f64` elements only
//!
//! # Example
//!
//! ```rust
//! use handgrad::modelio::{load_parameters, save_parameters};
//! use handgrad::tensors::Tensor;
//!
//! fn main() -> handgrad::Result<()> {
//!     let path = std::env::temp_dir().join("handgrad-doc-example.bpat");
//!     let tensor = Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0])?;
//!
//!     save_parameters(&path, &[&tensor])?;
//!     let tensors = load_parameters(&path)?;
//!     assert_eq!(tensors, vec![tensor]);
//!
//!     std::fs::remove_file(path)?;
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::tensors::{Tensor, element_count};
use briny::prelude::{TrustedData, Validate, ValidationError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const BPAT_MAGIC: &[u8; 4] = b"bpat";

fn format_error(detail: impl Into<String>) -> Error {
    Error::Format {
        detail: detail.into(),
    }
}

/// Encodes `tensors` into `writer`.
///
/// # Errors
/// Returns [`Error::Format`] for more than 255 tensors (before anything is
/// written) and [`Error::Io`] if writing fails.
pub fn write_tensors<W: Write>(mut writer: W, tensors: &[&Tensor]) -> Result<()> {
    let count = u8::try_from(tensors.len())
        .map_err(|_| format_error(format!("{} tensors exceed the limit of 255", tensors.len())))?;

    writer.write_all(BPAT_MAGIC)?;
    writer.write_all(&[count])?;

    for tensor in tensors {
        writer.write_all(&(tensor.rank() as u64).to_le_bytes())?;
        for &dim in tensor.shape() {
            writer.write_all(&(dim as u64).to_le_bytes())?;
        }
        for &val in tensor.data() {
            writer.write_all(&val.to_le_bytes())?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// A tensor as decoded from disk, before its shape is trusted.
struct PackedTensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Validate for PackedTensor {
    fn validate(&self) -> Result<(), ValidationError> {
        if element_count(&self.shape) != Some(self.data.len()) {
            return Err(ValidationError);
        }
        Ok(())
    }
}

fn unpack(index: usize, raw: PackedTensor) -> Result<Tensor> {
    let shape = raw.shape.clone();
    let trusted = TrustedData::new(raw).map_err(|_| {
        format_error(format!("tensor {index} data does not fill shape {shape:?}"))
    })?;
    let inner = trusted.into_inner();
    Tensor::new(inner.shape, inner.data)
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf8 = [0u8; 8];
    reader.read_exact(&mut buf8)?;
    Ok(u64::from_le_bytes(buf8))
}

fn read_len<R: Read>(reader: &mut R) -> Result<usize> {
    let v = read_u64(reader)?;
    usize::try_from(v).map_err(|_| format_error(format!("length {v} does not fit in memory")))
}

/// Decodes every tensor from `reader`.
///
/// # Errors
/// Returns [`Error::Format`] on a bad magic header or an impossible shape,
/// and [`Error::Io`] if the input ends early.
pub fn read_tensors<R: Read>(mut reader: R) -> Result<Vec<Tensor>> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != BPAT_MAGIC {
        return Err(format_error("invalid magic header"));
    }

    let mut count = [0u8; 1];
    reader.read_exact(&mut count)?;
    let count = usize::from(count[0]);

    let mut tensors = Vec::with_capacity(count);
    for index in 0..count {
        // sizes come from the file, so nothing is preallocated from them
        let ndim = read_len(&mut reader)?;
        let mut shape = Vec::new();
        for _ in 0..ndim {
            shape.push(read_len(&mut reader)?);
        }

        let size = element_count(&shape).ok_or_else(|| format_error(format!("tensor {index} shape {shape:?} overflows")))?;

        let mut data = Vec::new();
        let mut buf8 = [0u8; 8];
        for _ in 0..size {
            reader.read_exact(&mut buf8)?;
            data.push(f64::from_le_bytes(buf8));
        }

        tensors.push(unpack(index, PackedTensor { shape, data })?);
    }

    Ok(tensors)
}

/// Saves `tensors` to a `.bpat` file at `path`, replacing any existing file.
///
/// # Errors
/// See [`write_tensors`]; also fails if the file cannot be created.
pub fn save_parameters(path: impl AsRef<Path>, tensors: &[&Tensor]) -> Result<()> {
    let path = path.as_ref();
    if tensors.len() > usize::from(u8::MAX) {
        return Err(format_error(format!(
            "{} tensors exceed the limit of 255",
            tensors.len()
        )));
    }

    write_tensors(BufWriter::new(File::create(path)?), tensors)?;
    tracing::debug!(path = %path.display(), tensors = tensors.len(), "saved parameters");
    Ok(())
}

/// Loads every tensor from the `.bpat` file at `path`.
///
/// # Errors
/// See [`read_tensors`]; also fails if the file cannot be opened.
pub fn load_parameters(path: impl AsRef<Path>) -> Result<Vec<Tensor>> {
    let path = path.as_ref();
    let tensors = read_tensors(BufReader::new(File::open(path)?))?;
    tracing::debug!(path = %path.display(), tensors = tensors.len(), "loaded parameters");
    Ok(tensors)
}
