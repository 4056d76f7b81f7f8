//! Inference contexts: a loaded model bound to a device.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::backend::{Backend, CpuBackend, MockBackend};
use super::device::Device;
use super::result::InferenceResult;
use crate::error::{InferError, Result};
use crate::model::Model;
use crate::tensor::{InputTensor, OutputTensor, Tensor};

/// Opaque model data plus the device to run it on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelConfig {
    pub device: Device,
    pub model_data: Vec<u8>,
}

impl ModelConfig {
    pub fn new(device: Device, model_data: impl Into<Vec<u8>>) -> Self {
        Self {
            device,
            model_data: model_data.into(),
        }
    }

    /// Read model data from a file.
    pub fn from_file(path: impl AsRef<Path>, device: Device) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InferError::FileNotFound(path.to_path_buf()));
        }
        Ok(Self::new(device, std::fs::read(path)?))
    }
}

struct Inner {
    backend: Box<dyn Backend>,
    // Serializes executions on one context.
    lock: Mutex<()>,
}

/// A loaded, ready-to-run model instance.
///
/// Cloning is cheap and yields a handle to the same context. Runs through
/// any handle are executed one at a time; separate contexts run in
/// parallel.
///
/// # Example
///
/// ```ignore
/// use infer_rs::{create_context, Device, ModelConfig, Tensor};
///
/// let config = ModelConfig::new(Device::cpu(), std::fs::read("model.infm")?);
/// let ctx = create_context(config).await?;
///
/// let input = Tensor::new([1, 4], vec![5.1, 3.5, 1.4, 0.2])?;
/// let probs = ctx.run(input).await?;
/// println!("class {:?}", probs.argmax());
/// ```
#[derive(Clone)]
pub struct InferenceContext {
    inner: Arc<Inner>,
}

impl InferenceContext {
    /// Load a model for the configured device, blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns [`InferError::ModelLoad`] if the model is corrupt or
    /// incompatible, and [`InferError::DeviceInit`] if the device cannot be
    /// initialized. The mock device accepts any model data.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let ModelConfig { device, model_data } = config;

        if !device.is_available() {
            warn!(%device, "requested device is not available");
            return Err(InferError::device_init(format!(
                "device {} is not available",
                device
            )));
        }

        let backend: Box<dyn Backend> = match device {
            Device::Cpu => {
                let backend = CpuBackend::from_bytes(&model_data).map_err(|e| {
                    warn!(%device, error = %e, "model load failed");
                    e
                })?;
                Box::new(backend)
            }
            Device::Mock => Box::new(MockBackend::fixed()),
            Device::Npu => {
                return Err(InferError::device_init(format!(
                    "no backend for device {}",
                    device
                )))
            }
        };

        let ctx = Self::from_boxed(backend);
        match ctx.model() {
            Some(model) => info!(
                %device,
                model = model.name(),
                layers = model.layers().len(),
                "inference context created"
            ),
            None => info!(%device, "inference context created"),
        }
        Ok(ctx)
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(backend: impl Backend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    fn from_boxed(backend: Box<dyn Backend>) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                lock: Mutex::new(()),
            }),
        }
    }

    /// Get the device this context runs on.
    pub fn device(&self) -> Device {
        self.inner.backend.device()
    }

    /// The loaded model. `None` on the mock device.
    pub fn model(&self) -> Option<&Model> {
        self.inner.backend.model()
    }

    /// Run inference, blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns [`InferError::Tensor`] if the input is inconsistent or has
    /// the wrong size for the model, and [`InferError::Inference`] on a
    /// runtime failure.
    pub fn infer(&self, input: &Tensor) -> Result<Tensor> {
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| InferError::inference("context is unusable after a failed run"))?;

        let start = Instant::now();
        let output = self.inner.backend.execute(input)?;
        debug!(
            device = %self.device(),
            input_shape = %input.shape,
            output_shape = %output.shape,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "inference complete"
        );
        Ok(output)
    }

    /// Run inference on the blocking thread pool.
    ///
    /// Dropping the returned future does not stop a run that has started.
    pub async fn run(&self, input: InputTensor) -> Result<OutputTensor> {
        let ctx = self.clone();
        tokio::task::spawn_blocking(move || ctx.infer(&input))
            .await
            .map_err(|e| InferError::inference(format!("inference task failed: {}", e)))?
    }

    /// Like [`InferenceContext::run`], reporting failure inside the result
    /// instead of as an error.
    pub async fn run_to_result(&self, input: InputTensor) -> InferenceResult {
        self.run(input).await.into()
    }
}

impl fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceContext")
            .field("device", &self.device())
            .field("model", &self.model().map(Model::name))
            .finish()
    }
}

/// Create an inference context, loading the model off the async executor.
///
/// # Errors
///
/// Fails if the model is corrupt or incompatible, or the device fails to
/// initialize. See [`InferenceContext::new`].
pub async fn create_context(config: ModelConfig) -> Result<InferenceContext> {
    tokio::task::spawn_blocking(move || InferenceContext::new(config))
        .await
        .map_err(|e| InferError::model_load(format!("model load task failed: {}", e)))?
}
