//! Binary model container.
//!
//! Layout:
//! ```text
//! ┌──────────────────────────────────┐
//! │ Magic: "INFM" (4 bytes)          │
//! │ Version: u32 LE                  │
//! │ Header size: u32 LE              │
//! ├──────────────────────────────────┤
//! │ Header JSON (graph, tensor refs) │
//! ├──────────────────────────────────┤
//! │ Padding to 16-byte alignment     │
//! ├──────────────────────────────────┤
//! │ Weight blob (f32 LE, contiguous) │
//! └──────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InferError, Result};

/// Magic bytes identifying a model file.
pub const MAGIC: &[u8; 4] = b"INFM";

/// Current format version.
pub const VERSION: u32 = 1;

/// Alignment of the weight blob.
pub const BLOB_ALIGNMENT: usize = 16;

const PREAMBLE_LEN: usize = 12;

/// Element range inside the weight blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorRef {
    /// Offset in f32 elements from the blob start.
    pub offset: usize,
    /// Number of f32 elements.
    pub len: usize,
}

impl TensorRef {
    /// Resolve against the blob, failing if the range is out of bounds.
    pub fn slice<'a>(&self, blob: &'a [f32]) -> Result<&'a [f32]> {
        self.offset
            .checked_add(self.len)
            .and_then(|end| blob.get(self.offset..end))
            .ok_or_else(|| {
                InferError::model_load(format!(
                    "invalid tensor reference: {}..+{} outside blob of {} elements",
                    self.offset,
                    self.len,
                    blob.len()
                ))
            })
    }
}

/// Parameter-free layer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl FromStr for Activation {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "relu" => Ok(Self::Relu),
            "sigmoid" => Ok(Self::Sigmoid),
            "tanh" => Ok(Self::Tanh),
            "softmax" => Ok(Self::Softmax),
            other => Err(InferError::config(format!("Invalid activation: {}", other))),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relu => write!(f, "relu"),
            Self::Sigmoid => write!(f, "sigmoid"),
            Self::Tanh => write!(f, "tanh"),
            Self::Softmax => write!(f, "softmax"),
        }
    }
}

/// One layer as stored in the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LayerEntry {
    /// Row-major `[inputs, outputs]` weights plus optional `[outputs]` bias.
    Dense {
        inputs: usize,
        outputs: usize,
        weights: TensorRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bias: Option<TensorRef>,
    },
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl From<Activation> for LayerEntry {
    fn from(act: Activation) -> Self {
        match act {
            Activation::Relu => Self::Relu,
            Activation::Sigmoid => Self::Sigmoid,
            Activation::Tanh => Self::Tanh,
            Activation::Softmax => Self::Softmax,
        }
    }
}

/// Header metadata of a model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHeader {
    #[serde(default)]
    pub name: String,
    pub input_shape: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub layers: Vec<LayerEntry>,
}

/// Split model bytes into the parsed header and the decoded weight blob.
pub fn decode(data: &[u8]) -> Result<(ModelHeader, Vec<f32>)> {
    if data.len() < PREAMBLE_LEN {
        return Err(InferError::model_load(format!(
            "truncated: {} bytes is shorter than the {}-byte preamble",
            data.len(),
            PREAMBLE_LEN
        )));
    }

    if &data[0..4] != MAGIC {
        return Err(InferError::model_load("bad magic: not a model file"));
    }

    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != VERSION {
        return Err(InferError::model_load(format!(
            "unsupported format version {} (expected {})",
            version, VERSION
        )));
    }

    let header_size = u32::from_le_bytes([data[8], data[9], data[10], data[11]]) as usize;
    let header_end = PREAMBLE_LEN + header_size;
    if data.len() < header_end {
        return Err(InferError::model_load(format!(
            "truncated: header declares {} bytes, {} available",
            header_size,
            data.len() - PREAMBLE_LEN
        )));
    }

    let header_str = std::str::from_utf8(&data[PREAMBLE_LEN..header_end])
        .map_err(|_| InferError::model_load("invalid header: not valid UTF-8"))?;
    let header: ModelHeader = serde_json::from_str(header_str)
        .map_err(|e| InferError::model_load(format!("invalid header: {}", e)))?;

    let blob_start = align_up(header_end, BLOB_ALIGNMENT).min(data.len());
    let blob_bytes = &data[blob_start..];
    if blob_bytes.len() % 4 != 0 {
        return Err(InferError::model_load(format!(
            "truncated weight blob: {} bytes is not a whole number of f32 values",
            blob_bytes.len()
        )));
    }

    let blob = blob_bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok((header, blob))
}

/// Serialize a header and weight blob to model bytes.
pub fn encode(header: &ModelHeader, blob: &[f32]) -> Result<Vec<u8>> {
    let header_json = serde_json::to_vec(header)?;
    let header_size = u32::try_from(header_json.len())
        .map_err(|_| InferError::model_load("header exceeds 4 GiB"))?;

    let blob_start = align_up(PREAMBLE_LEN + header_json.len(), BLOB_ALIGNMENT);
    let mut out = Vec::with_capacity(blob_start + blob.len() * 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&header_size.to_le_bytes());
    out.extend_from_slice(&header_json);
    out.resize(blob_start, 0);
    for v in blob {
        out.extend_from_slice(&v.to_le_bytes());
    }
    Ok(out)
}

fn align_up(n: usize, align: usize) -> usize {
    n.div_ceil(align) * align
}
