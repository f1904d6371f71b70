/// Softmax over consecutive rows of length `cols`.
///
/// Each row is shifted by its maximum before exponentiation so large logits
/// cannot overflow. A rank-1 input is a single row.
#[must_use]
pub fn softmax(input: &[f64], cols: usize) -> Vec<f64> {
    let mut out = vec![0.0; input.len()];
    if cols == 0 {
        return out;
    }

    for (x, y) in input.chunks(cols).zip(out.chunks_mut(cols)) {
        let max_val = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut exp_sum = 0.0;
        for (yi, &xi) in y.iter_mut().zip(x) {
            *yi = (xi - max_val).exp();
            exp_sum += *yi;
        }
        for yi in y.iter_mut() {
            *yi /= exp_sum;
        }
    }

    out
}

/// Jacobian-vector product of softmax for each row of length `cols`.
///
/// `output` is the softmax of the forward input. For every row
/// `grad[i] = Σ_j dy[j] * y[i] * (δ_ij - y[j])`, evaluated term by term.
#[must_use]
pub fn softmax_backward(output: &[f64], grad_output: &[f64], cols: usize) -> Vec<f64> {
    debug_assert_eq!(output.len(), grad_output.len());

    let mut grad = vec![0.0; output.len()];
    if cols == 0 {
        return grad;
    }

    for ((y, dy), g) in output
        .chunks(cols)
        .zip(grad_output.chunks(cols))
        .zip(grad.chunks_mut(cols))
    {
        for (i, gi) in g.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (j, &dyj) in dy.iter().enumerate() {
                let delta = if i == j { 1.0 } else { 0.0 };
                sum += dyj * y[i] * (delta - y[j]);
            }
            *gi = sum;
        }
    }

    grad
}
