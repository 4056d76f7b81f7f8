//! Byte-level tensor storage with an explicit element type.

use super::{DataType, Layout, Shape, Tensor};
use crate::error::{InferError, Result};

/// Raw tensor storage.
///
/// Owns a contiguous byte buffer whose interpretation is defined by
/// `dtype` and `shape`. `layout` is carried along for image inputs but does
/// not change how the bytes are read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTensor {
    pub buffer: Vec<u8>,
    pub shape: Shape,
    pub layout: Layout,
    pub dtype: DataType,
}

impl RawTensor {
    /// Wrap a byte buffer. Call [`RawTensor::validate`] before reading it.
    pub fn new(buffer: Vec<u8>, shape: impl Into<Shape>, dtype: DataType) -> Self {
        Self {
            buffer,
            shape: shape.into(),
            layout: Layout::Undefined,
            dtype,
        }
    }

    /// Attach a semantic layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Encode an `f32` tensor as little-endian `Float32` bytes.
    pub fn from_tensor(tensor: &Tensor) -> Self {
        let buffer = tensor.data.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new(buffer, tensor.shape.clone(), DataType::Float32)
    }

    /// Number of bytes the shape and dtype require.
    pub fn expected_bytes(&self) -> Option<u64> {
        self.shape
            .checked_numel()?
            .checked_mul(self.dtype.element_size() as u64)
    }

    /// Check that the buffer length matches shape and dtype.
    pub fn validate(&self) -> Result<()> {
        if self.dtype == DataType::Undefined {
            return Err(InferError::tensor("raw tensor has undefined data type"));
        }
        let expected = self
            .expected_bytes()
            .ok_or_else(|| InferError::tensor(format!("shape {} overflows", self.shape)))?;
        if expected != self.buffer.len() as u64 {
            return Err(InferError::tensor(format!(
                "buffer holds {} bytes but shape {} of {} needs {}",
                self.buffer.len(),
                self.shape,
                self.dtype,
                expected
            )));
        }
        Ok(())
    }

    /// Decode into an `f32` tensor. `Uint8` elements are widened.
    pub fn to_tensor(&self) -> Result<Tensor> {
        self.validate()?;
        let data = match self.dtype {
            DataType::Float32 => self
                .buffer
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
            DataType::Uint8 => self.buffer.iter().map(|&b| f32::from(b)).collect(),
            DataType::Undefined => {
                return Err(InferError::tensor("raw tensor has undefined data type"))
            }
        };
        Tensor::new(self.shape.clone(), data)
    }
}

impl TryFrom<RawTensor> for Tensor {
    type Error = InferError;

    fn try_from(raw: RawTensor) -> Result<Self> {
        raw.to_tensor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float32_decode() {
        let tensor = Tensor::new([2, 2], vec![0.5, -1.0, 3.25, 0.0]).unwrap();
        let raw = RawTensor::from_tensor(&tensor);
        assert_eq!(raw.buffer.len(), 16);
        assert_eq!(raw.to_tensor().unwrap(), tensor);
    }

    #[test]
    fn test_uint8_widening() {
        let raw = RawTensor::new(vec![0, 128, 255], [1, 3], DataType::Uint8)
            .with_layout(Layout::Nhwc);
        let tensor = raw.to_tensor().unwrap();
        assert_eq!(tensor.data, vec![0.0, 128.0, 255.0]);
        assert_eq!(tensor.shape.dims(), &[1, 3]);
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let raw = RawTensor::new(vec![0; 7], [2], DataType::Float32);
        assert!(matches!(raw.validate(), Err(InferError::Tensor(_))));
    }

    #[test]
    fn test_rejects_undefined_dtype() {
        let raw = RawTensor::new(Vec::new(), [0], DataType::Undefined);
        assert!(raw.to_tensor().is_err());
    }
}
