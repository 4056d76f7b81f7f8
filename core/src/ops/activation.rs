//! Element-wise activations and row-wise softmax.

use ndarray::{Array2, Axis};

/// ReLU: x = max(0, x)
pub fn relu(x: &mut Array2<f32>) {
    x.mapv_inplace(|v| v.max(0.0));
}

/// Sigmoid: x = 1 / (1 + exp(-x))
pub fn sigmoid(x: &mut Array2<f32>) {
    x.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp()));
}

/// Hyperbolic tangent.
pub fn tanh(x: &mut Array2<f32>) {
    x.mapv_inplace(f32::tanh);
}

/// Softmax over each row (numerically stable).
pub fn softmax(x: &mut Array2<f32>) {
    for mut row in x.axis_iter_mut(Axis(0)) {
        let max_val = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        row.mapv_inplace(|v| (v - max_val).exp());
        let sum = row.sum();
        if sum > 0.0 {
            row /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_relu() {
        let mut x = arr2(&[[-1.0, 0.0, 1.0, -0.5, 2.0]]);
        relu(&mut x);
        assert_eq!(x, arr2(&[[0.0, 0.0, 1.0, 0.0, 2.0]]));
    }

    #[test]
    fn test_sigmoid() {
        let mut x = arr2(&[[0.0, 100.0, -100.0]]);
        sigmoid(&mut x);
        assert!((x[[0, 0]] - 0.5).abs() < 1e-6);
        assert!(x[[0, 1]] > 0.999);
        assert!(x[[0, 2]] < 1e-3);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let mut x = arr2(&[[1.0, 2.0, 3.0], [1000.0, 1000.0, 1000.0]]);
        softmax(&mut x);
        for row in x.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-5);
        }
        assert!(x[[0, 2]] > x[[0, 1]] && x[[0, 1]] > x[[0, 0]]);
        assert!((x[[1, 0]] - 1.0 / 3.0).abs() < 1e-6);
    }
}
