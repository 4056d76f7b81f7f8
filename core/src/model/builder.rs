//! Construction of model files from weights held in memory.

use serde::Deserialize;

use super::format::{self, Activation, LayerEntry, ModelHeader, TensorRef};
use crate::error::{InferError, Result};

/// Incrementally assembles a model file.
///
/// # Example
///
/// ```
/// use infer_rs::model::{Activation, ModelBuilder};
///
/// let bytes = ModelBuilder::new("xor-ish", [2])
///     .dense(2, 2, &[1.0, 0.0, 0.0, 1.0], Some(&[0.0, 0.0]))?
///     .activation(Activation::Softmax)
///     .to_bytes()?;
/// assert_eq!(&bytes[..4], b"INFM");
/// # Ok::<(), infer_rs::InferError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    header: ModelHeader,
    blob: Vec<f32>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>, input_shape: impl Into<Vec<u32>>) -> Self {
        Self {
            header: ModelHeader {
                name: name.into(),
                input_shape: input_shape.into(),
                labels: None,
                layers: Vec::new(),
            },
            blob: Vec::new(),
        }
    }

    /// Append a dense layer with row-major `[inputs, outputs]` weights.
    pub fn dense(
        mut self,
        inputs: usize,
        outputs: usize,
        weights: &[f32],
        bias: Option<&[f32]>,
    ) -> Result<Self> {
        let expected = inputs.checked_mul(outputs).ok_or_else(|| {
            InferError::model_load(format!("dense {}x{} overflows", inputs, outputs))
        })?;
        if weights.len() != expected {
            return Err(InferError::model_load(format!(
                "dense weights hold {} values, expected {}x{}",
                weights.len(),
                inputs,
                outputs
            )));
        }
        if let Some(bias) = bias {
            if bias.len() != outputs {
                return Err(InferError::model_load(format!(
                    "dense bias holds {} values, expected {}",
                    bias.len(),
                    outputs
                )));
            }
        }

        let weights = self.push(weights);
        let bias = bias.map(|b| self.push(b));
        self.header.layers.push(LayerEntry::Dense {
            inputs,
            outputs,
            weights,
            bias,
        });
        Ok(self)
    }

    pub fn activation(mut self, act: Activation) -> Self {
        self.header.layers.push(act.into());
        self
    }

    /// Names of the output classes.
    pub fn labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.header.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        format::encode(&self.header, &self.blob)
    }

    fn push(&mut self, values: &[f32]) -> TensorRef {
        let offset = self.blob.len();
        self.blob.extend_from_slice(values);
        TensorRef {
            offset,
            len: values.len(),
        }
    }
}

/// JSON model description accepted by `infer-rs pack`.
///
/// Dense layers carry their weights inline as `[inputs][outputs]` rows.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDescription {
    #[serde(default)]
    pub name: String,
    pub input_shape: Vec<u32>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    pub layers: Vec<LayerDescription>,
}

/// One layer of a [`ModelDescription`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LayerDescription {
    Dense {
        weights: Vec<Vec<f32>>,
        #[serde(default)]
        bias: Option<Vec<f32>>,
    },
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl ModelDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lower into a builder, checking that weight rows are rectangular.
    pub fn into_builder(self) -> Result<ModelBuilder> {
        let mut builder = ModelBuilder::new(self.name, self.input_shape);
        for (index, layer) in self.layers.into_iter().enumerate() {
            builder = match layer {
                LayerDescription::Dense { weights, bias } => {
                    let inputs = weights.len();
                    let outputs = weights.first().map_or(0, Vec::len);
                    if inputs == 0 || outputs == 0 || weights.iter().any(|row| row.len() != outputs) {
                        return Err(InferError::model_load(format!(
                            "layer {}: dense weights must be a non-empty rectangular matrix",
                            index
                        )));
                    }
                    let flat: Vec<f32> = weights.into_iter().flatten().collect();
                    builder.dense(inputs, outputs, &flat, bias.as_deref())?
                }
                LayerDescription::Relu => builder.activation(Activation::Relu),
                LayerDescription::Sigmoid => builder.activation(Activation::Sigmoid),
                LayerDescription::Tanh => builder.activation(Activation::Tanh),
                LayerDescription::Softmax => builder.activation(Activation::Softmax),
            };
        }
        if let Some(labels) = self.labels {
            builder = builder.labels(labels);
        }
        Ok(builder)
    }
}
