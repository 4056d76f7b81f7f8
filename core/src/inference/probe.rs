//! Device self-test.

use std::time::Instant;

use super::context::{InferenceContext, ModelConfig};
use super::device::Device;
use crate::error::{InferError, Result};
use crate::model::{Activation, ModelBuilder};
use crate::tensor::Tensor;

/// Check that a device can load and run a model.
///
/// Loads a built-in two-class model (identity dense layer followed by
/// softmax), runs one sample and returns a human-readable report.
pub fn probe_device(device: &Device) -> Result<String> {
    let model_data = ModelBuilder::new("probe", [2])
        .dense(2, 2, &[1.0, 0.0, 0.0, 1.0], Some(&[0.0, 0.0]))?
        .activation(Activation::Softmax)
        .labels(["high", "low"])
        .to_bytes()?;

    let start = Instant::now();
    let ctx = InferenceContext::new(ModelConfig::new(*device, model_data))?;
    let load_ms = start.elapsed().as_secs_f64() * 1000.0;

    let input = Tensor::new([1, 2], vec![1.0, 0.0])?;
    let start = Instant::now();
    let output = ctx.infer(&input)?;
    let run_ms = start.elapsed().as_secs_f64() * 1000.0;

    let sum: f32 = output.data.iter().sum();
    if (sum - 1.0).abs() > 1e-3 {
        return Err(InferError::inference(format!(
            "probe output does not sum to 1 (got {:.6})",
            sum
        )));
    }

    Ok(format!(
        "device: {}\nload_ms: {:.3}\nrun_ms: {:.3}\noutput_shape: {}\noutput: {:?}\nstatus: ok",
        ctx.device(),
        load_ms,
        run_ms,
        output.shape,
        output.data
    ))
}
