//! Parsed, validated models and their CPU forward pass.

mod builder;
pub mod format;

use ndarray::{Array1, Array2, ArrayView2};

use crate::error::{InferError, Result};
use crate::ops;
use crate::tensor::Shape;

pub use builder::{LayerDescription, ModelBuilder, ModelDescription};
pub use format::{Activation, LayerEntry, ModelHeader, TensorRef};

/// A resolved layer with its weights copied out of the blob.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense {
        weights: Array2<f32>,
        bias: Option<Array1<f32>>,
    },
    Activation(Activation),
}

impl Layer {
    fn apply(&self, x: Array2<f32>) -> Array2<f32> {
        match self {
            Self::Dense { weights, bias } => {
                ops::dense(x.view(), weights.view(), bias.as_ref().map(|b| b.view()))
            }
            Self::Activation(act) => {
                let mut x = x;
                match act {
                    Activation::Relu => ops::relu(&mut x),
                    Activation::Sigmoid => ops::sigmoid(&mut x),
                    Activation::Tanh => ops::tanh(&mut x),
                    Activation::Softmax => ops::softmax(&mut x),
                }
                x
            }
        }
    }
}

/// A model ready for execution on the CPU.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    input_shape: Shape,
    labels: Option<Vec<String>>,
    layers: Vec<Layer>,
    output_features: usize,
}

impl Model {
    /// Parse and validate model bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InferError::ModelLoad`] if the data is corrupt (truncated,
    /// bad magic, malformed header, dangling tensor references) or
    /// incompatible (unknown format version, layer dimensions that do not
    /// chain).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (header, blob) = format::decode(data)?;
        Self::from_parts(header, &blob)
    }

    fn from_parts(header: ModelHeader, blob: &[f32]) -> Result<Self> {
        let input_shape = Shape::new(header.input_shape);
        let input_features = match input_shape.last() {
            Some(n) if !input_shape.dims().contains(&0) => n as usize,
            _ => {
                return Err(InferError::model_load(format!(
                    "shape mismatch: input shape {} must be non-empty without zero dimensions",
                    input_shape
                )))
            }
        };

        let mut width = input_features;
        let mut layers = Vec::with_capacity(header.layers.len());
        for (index, entry) in header.layers.into_iter().enumerate() {
            let layer = match entry {
                LayerEntry::Dense {
                    inputs,
                    outputs,
                    weights,
                    bias,
                } => {
                    if inputs != width || outputs == 0 {
                        return Err(InferError::model_load(format!(
                            "shape mismatch: layer {} is dense {}x{} but receives {} features",
                            index, inputs, outputs, width
                        )));
                    }
                    let expected = inputs.checked_mul(outputs).ok_or_else(|| {
                        InferError::model_load(format!(
                            "shape mismatch: layer {} is dense {}x{}, which overflows",
                            index, inputs, outputs
                        ))
                    })?;
                    if weights.len != expected {
                        return Err(InferError::model_load(format!(
                            "invalid tensor reference: layer {} weights hold {} values, expected {}",
                            index, weights.len, expected
                        )));
                    }
                    let w = Array2::from_shape_vec((inputs, outputs), weights.slice(blob)?.to_vec())
                        .map_err(|e| InferError::model_load(format!("layer {}: {}", index, e)))?;

                    let b = match bias {
                        Some(bias) if bias.len != outputs => {
                            return Err(InferError::model_load(format!(
                                "invalid tensor reference: layer {} bias holds {} values, expected {}",
                                index, bias.len, outputs
                            )))
                        }
                        Some(bias) => Some(Array1::from(bias.slice(blob)?.to_vec())),
                        None => None,
                    };

                    width = outputs;
                    Layer::Dense { weights: w, bias: b }
                }
                LayerEntry::Relu => Layer::Activation(Activation::Relu),
                LayerEntry::Sigmoid => Layer::Activation(Activation::Sigmoid),
                LayerEntry::Tanh => Layer::Activation(Activation::Tanh),
                LayerEntry::Softmax => Layer::Activation(Activation::Softmax),
            };
            layers.push(layer);
        }

        if let Some(labels) = &header.labels {
            if labels.len() != width {
                return Err(InferError::model_load(format!(
                    "model has {} labels but {} outputs",
                    labels.len(),
                    width
                )));
            }
        }

        Ok(Self {
            name: header.name,
            input_shape,
            labels: header.labels,
            layers,
            output_features: width,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared shape of a single input sample.
    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    /// Width of the innermost input dimension.
    pub fn input_features(&self) -> usize {
        self.input_shape.last().map_or(0, |n| n as usize)
    }

    /// Number of values produced per sample.
    pub fn output_features(&self) -> usize {
        self.output_features
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Label for an output class index.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.as_ref()?.get(index).map(String::as_str)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Run all layers on a `[batch, input_features]` matrix.
    pub fn forward(&self, batch: ArrayView2<f32>) -> Array2<f32> {
        self.layers
            .iter()
            .fold(batch.to_owned(), |x, layer| layer.apply(x))
    }
}
