//! Semantic layout of tensor dimensions.

use std::fmt;
use std::str::FromStr;

use crate::error::{InferError, Result};

/// How tensor dimensions are interpreted, not how memory is ordered.
///
/// Only needed where dimension meaning matters (image tensors). Strides are
/// not represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    #[default]
    Undefined,
    /// Batch, Channel, Height, Width.
    Nchw,
    /// Batch, Height, Width, Channel.
    Nhwc,
}

impl FromStr for Layout {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nchw" => Ok(Self::Nchw),
            "nhwc" => Ok(Self::Nhwc),
            "undefined" => Ok(Self::Undefined),
            other => Err(InferError::config(format!("Invalid layout: {}", other))),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Nchw => write!(f, "nchw"),
            Self::Nhwc => write!(f, "nhwc"),
        }
    }
}
