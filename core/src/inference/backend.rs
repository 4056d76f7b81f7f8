//! Execution backends behind an inference context.

use ndarray::ArrayView2;
use tracing::debug;

use super::device::Device;
use crate::error::{InferError, Result};
use crate::model::Model;
use crate::tensor::Tensor;

/// Trait for types that can execute a model on a device.
///
/// A context owns one backend and serializes calls to it, so
/// implementations only need to be safe to share across threads.
pub trait Backend: Send + Sync {
    /// Run inference on a validated-shape input tensor.
    fn execute(&self, input: &Tensor) -> Result<Tensor>;

    /// Get the device this backend runs on.
    fn device(&self) -> Device;

    /// The model executed by this backend, if it holds one.
    fn model(&self) -> Option<&Model> {
        None
    }
}

/// Runs a parsed model with the CPU kernels.
#[derive(Debug, Clone)]
pub struct CpuBackend {
    model: Model,
}

impl CpuBackend {
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    /// Parse model bytes and wrap them in a backend.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Model::from_bytes(data).map(Self::new)
    }
}

impl Backend for CpuBackend {
    fn execute(&self, input: &Tensor) -> Result<Tensor> {
        input.validate()?;

        let features = self.model.input_features();
        let n = input.len();
        if n == 0 || n % features != 0 {
            return Err(InferError::tensor(format!(
                "input size {} (shape {}) is not a non-zero multiple of the model's {} input features",
                n, input.shape, features
            )));
        }

        let batch = n / features;
        let view = ArrayView2::from_shape((batch, features), &input.data)
            .map_err(|e| InferError::tensor(format!("Array shape error: {}", e)))?;

        debug!(batch, features, "executing model on cpu");
        let output = self.model.forward(view);

        if output.iter().any(|v| !v.is_finite()) {
            return Err(InferError::inference("model produced non-finite values"));
        }

        Tensor::from_array(&output)
    }

    fn device(&self) -> Device {
        Device::Cpu
    }

    fn model(&self) -> Option<&Model> {
        Some(&self.model)
    }
}

/// Canned output of the mock device.
#[derive(Debug, Clone, PartialEq)]
enum MockOutput {
    /// Same tensor for every input.
    Fixed(Tensor),
    /// Tensor of the input's shape, every element `1.0`.
    Ones,
}

/// No-op device. Performs no computation and never looks at model data.
#[derive(Debug, Clone, PartialEq)]
pub struct MockBackend {
    output: MockOutput,
}

impl MockBackend {
    /// Four-class probabilities `[0.1, 0.2, 0.3, 0.4]` with shape `[1, 4]`.
    pub fn fixed() -> Self {
        Self {
            output: MockOutput::Fixed(Tensor {
                shape: [1, 4].into(),
                data: vec![0.1, 0.2, 0.3, 0.4],
            }),
        }
    }

    /// Return `output` for every input.
    pub fn with_output(output: Tensor) -> Result<Self> {
        output.validate()?;
        Ok(Self {
            output: MockOutput::Fixed(output),
        })
    }

    /// Echo the input's shape filled with ones.
    pub fn ones() -> Self {
        Self {
            output: MockOutput::Ones,
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::fixed()
    }
}

impl Backend for MockBackend {
    fn execute(&self, input: &Tensor) -> Result<Tensor> {
        input.validate()?;
        match &self.output {
            MockOutput::Fixed(tensor) => Ok(tensor.clone()),
            MockOutput::Ones => Ok(Tensor {
                shape: input.shape.clone(),
                data: vec![1.0; input.len()],
            }),
        }
    }

    fn device(&self) -> Device {
        Device::Mock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Activation, ModelBuilder};

    fn identity_softmax() -> CpuBackend {
        let bytes = ModelBuilder::new("identity", [2])
            .dense(2, 2, &[1.0, 0.0, 0.0, 1.0], None)
            .unwrap()
            .activation(Activation::Softmax)
            .to_bytes()
            .unwrap();
        CpuBackend::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_cpu_batches_leading_dims() {
        let backend = identity_softmax();
        let input = Tensor::new([3, 2], vec![0.0, 0.0, 1.0, 1.0, 5.0, 5.0]).unwrap();
        let output = backend.execute(&input).unwrap();
        assert_eq!(output.shape.dims(), &[3, 2]);
        for v in output.data {
            assert!((v - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cpu_rejects_wrong_size() {
        let backend = identity_softmax();
        let input = Tensor::new([3], vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(backend.execute(&input), Err(InferError::Tensor(_))));

        let empty = Tensor::new([0, 2], vec![]).unwrap();
        assert!(matches!(backend.execute(&empty), Err(InferError::Tensor(_))));
    }

    #[test]
    fn test_cpu_rejects_inconsistent_tensor() {
        let backend = identity_softmax();
        let input = Tensor {
            shape: [4].into(),
            data: vec![1.0, 2.0],
        };
        assert!(matches!(backend.execute(&input), Err(InferError::Tensor(_))));
    }

    #[test]
    fn test_cpu_reports_non_finite_output() {
        let bytes = ModelBuilder::new("overflow", [1])
            .dense(1, 1, &[f32::MAX], None)
            .unwrap()
            .to_bytes()
            .unwrap();
        let backend = CpuBackend::from_bytes(&bytes).unwrap();
        let input = Tensor::new([1], vec![10.0]).unwrap();
        assert!(matches!(backend.execute(&input), Err(InferError::Inference(_))));
    }

    #[test]
    fn test_mock_outputs() {
        let input = Tensor::new([2, 3], vec![0.0; 6]).unwrap();

        let fixed = MockBackend::fixed().execute(&input).unwrap();
        assert_eq!(fixed.shape.dims(), &[1, 4]);
        assert_eq!(fixed.data, vec![0.1, 0.2, 0.3, 0.4]);

        let custom = Tensor::new([2], vec![0.9, 0.1]).unwrap();
        let canned = MockBackend::with_output(custom.clone()).unwrap();
        assert_eq!(canned.execute(&input).unwrap(), custom);
        assert_eq!(canned.device(), Device::Mock);

        let ones = MockBackend::ones().execute(&input).unwrap();
        assert_eq!(ones.shape.dims(), &[2, 3]);
        assert!(ones.data.iter().all(|&v| v == 1.0));
    }
}
