#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Multiplies `a` (`m×k`) by `b` (`k×n`), returning the `m×n` product.
///
/// Every output element is accumulated left to right over `k`, exactly as the
/// naive triple loop would, so row-level parallelism does not change rounding.
#[must_use]
pub fn matmul(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);

    let mut out = vec![0.0; m * n];
    if n == 0 {
        return out;
    }

    let fill_row = |(i, row): (usize, &mut [f64])| {
        let a_row = &a[i * k..(i + 1) * k];
        for (j, cell) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (l, &a_il) in a_row.iter().enumerate() {
                sum += a_il * b[l * n + j];
            }
            *cell = sum;
        }
    };

    #[cfg(feature = "parallel")]
    out.par_chunks_mut(n).enumerate().for_each(fill_row);
    #[cfg(not(feature = "parallel"))]
    out.chunks_mut(n).enumerate().for_each(fill_row);

    out
}

/// Transposes a `rows×cols` matrix into `cols×rows`.
#[must_use]
pub fn transpose(data: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    debug_assert_eq!(data.len(), rows * cols);

    let mut out = vec![0.0; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            out[j * rows + i] = data[i * cols + j];
        }
    }
    out
}
