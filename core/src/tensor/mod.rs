//! Tensor types shared by the model loader, the backends and the public API.
//!
//! [`Tensor`] is the owning `f32` tensor exchanged with an inference context.
//! [`RawTensor`] holds untyped bytes plus a [`DataType`] and converts into a
//! [`Tensor`] after validation.

mod dtype;
mod layout;
mod raw;
mod shape;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{InferError, Result};

pub use dtype::DataType;
pub use layout::Layout;
pub use raw::RawTensor;
pub use shape::Shape;

/// Flat `f32` buffer paired with its shape.
///
/// Deserializes from `{ "shape": [..], "data": [..] }`. Field construction
/// and deserialization skip the length check; call [`Tensor::validate`]
/// on such values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub shape: Shape,
    pub data: Vec<f32>,
}

/// Tensor passed to a context for inference.
pub type InputTensor = Tensor;

/// Tensor produced by inference, holding class probabilities.
pub type OutputTensor = Tensor;

impl Tensor {
    /// Create a tensor, checking that `data` holds exactly `numel(shape)` values.
    pub fn new(shape: impl Into<Shape>, data: Vec<f32>) -> Result<Self> {
        let tensor = Self {
            shape: shape.into(),
            data,
        };
        tensor.validate()?;
        Ok(tensor)
    }

    /// Rank-1 tensor over `data`.
    pub fn from_vec(data: Vec<f32>) -> Result<Self> {
        let len = u32::try_from(data.len())
            .map_err(|_| InferError::tensor(format!("{} elements exceed u32", data.len())))?;
        Ok(Self {
            shape: Shape::new(vec![len]),
            data,
        })
    }

    /// Check that the buffer length matches the shape.
    pub fn validate(&self) -> Result<()> {
        match self.shape.checked_numel() {
            Some(n) if n == self.data.len() as u64 => Ok(()),
            Some(n) => Err(InferError::tensor(format!(
                "shape {} needs {} elements but data holds {}",
                self.shape,
                n,
                self.data.len()
            ))),
            None => Err(InferError::tensor(format!("shape {} overflows", self.shape))),
        }
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy into a dynamic-dimensional ndarray.
    pub fn to_array(&self) -> Result<ArrayD<f32>> {
        ArrayD::from_shape_vec(IxDyn(&self.shape.to_usize()), self.data.clone())
            .map_err(|e| InferError::tensor(format!("Array shape error: {}", e)))
    }

    /// Build a tensor from any ndarray, in logical (row-major) order.
    pub fn from_array<D: ndarray::Dimension>(array: &ndarray::Array<f32, D>) -> Result<Self> {
        let dims = array
            .shape()
            .iter()
            .map(|&d| {
                u32::try_from(d).map_err(|_| InferError::tensor(format!("dimension {} exceeds u32", d)))
            })
            .collect::<Result<Vec<u32>>>()?;
        Ok(Self {
            shape: Shape::new(dims),
            data: array.iter().copied().collect(),
        })
    }

    /// Index of the largest value.
    pub fn argmax(&self) -> Option<usize> {
        self.data
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    /// The `k` largest values with their flat indices, largest first.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        let mut indexed: Vec<(usize, f32)> = self.data.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        indexed.truncate(k);
        indexed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_new_rejects_mismatch() {
        let err = Tensor::new([2, 3], vec![0.0; 5]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid tensor: shape [2, 3] needs 6 elements but data holds 5"
        );
    }

    #[test]
    fn test_scalar_holds_one_element() {
        assert!(Tensor::new(Shape::scalar(), vec![1.5]).is_ok());
        assert!(Tensor::new(Shape::scalar(), vec![]).is_err());
    }

    #[test]
    fn test_deserialize_then_validate() {
        let tensor: Tensor = serde_json::from_str(r#"{"shape": [1, 2], "data": [0.5, 0.25]}"#).unwrap();
        assert!(tensor.validate().is_ok());

        let bad: Tensor = serde_json::from_str(r#"{"shape": [3], "data": [1.0]}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_ndarray_interop() {
        let array = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let tensor = Tensor::from_array(&array.t().to_owned()).unwrap();
        assert_eq!(tensor.shape.dims(), &[2, 2]);
        assert_eq!(tensor.data, vec![1.0, 3.0, 2.0, 4.0]);
        assert_eq!(tensor.to_array().unwrap().shape(), &[2, 2]);
    }

    #[test]
    fn test_top_k() {
        let tensor = Tensor::new([1, 4], vec![0.1, 0.4, 0.2, 0.3]).unwrap();
        assert_eq!(tensor.argmax(), Some(1));
        assert_eq!(tensor.top_k(2), vec![(1, 0.4), (3, 0.3)]);
        assert_eq!(tensor.top_k(10).len(), 4);
    }
}
