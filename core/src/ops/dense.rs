//! Fully-connected layer.

use ndarray::{Array2, ArrayView1, ArrayView2};

/// `x[B,K] @ w[K,N] + bias[N]`.
pub fn dense(x: ArrayView2<f32>, w: ArrayView2<f32>, bias: Option<ArrayView1<f32>>) -> Array2<f32> {
    let mut out = x.dot(&w);
    if let Some(bias) = bias {
        out += &bias;
    }
    out
}
