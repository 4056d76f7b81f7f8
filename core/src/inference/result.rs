//! Result-object inference API.
//!
//! Callers that prefer not to handle errors get an [`InferenceResult`]
//! carrying either the output values or an error message. This is an
//! adapter over the `Result`-returning API and never fails itself.

use serde::{Deserialize, Serialize};

use super::backend::MockBackend;
use super::context::InferenceContext;
use crate::error::{InferError, Result};
use crate::tensor::Tensor;

/// Outcome of one inference call.
///
/// `ok` is `true` exactly when `output` is present and `error` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<f32>>,
}

impl InferenceResult {
    pub fn success(output: Vec<f32>) -> Self {
        Self {
            ok: true,
            error: None,
            output: Some(output),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            output: None,
        }
    }

    /// Convert back into the `Result` convention.
    pub fn into_result(self) -> Result<Vec<f32>> {
        match (self.ok, self.output) {
            (true, Some(output)) => Ok(output),
            _ => Err(InferError::inference(
                self.error.unwrap_or_else(|| "no output produced".to_string()),
            )),
        }
    }
}

impl From<Result<Tensor>> for InferenceResult {
    fn from(result: Result<Tensor>) -> Self {
        match result {
            Ok(tensor) => Self::success(tensor.data),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

/// Run inference on the mock device.
///
/// The input is treated as a rank-1 tensor. The output has the same length
/// with every element set to `1.0`.
pub async fn run_inference(input: Vec<f32>) -> InferenceResult {
    let tensor = match Tensor::from_vec(input) {
        Ok(tensor) => tensor,
        Err(err) => return InferenceResult::failure(err.to_string()),
    };
    InferenceContext::with_backend(MockBackend::ones())
        .run(tensor)
        .await
        .into()
}
