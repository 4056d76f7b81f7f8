//! Logical element types of raw tensor memory.

use std::fmt;
use std::str::FromStr;

use crate::error::{InferError, Result};

/// Logical data type of a tensor element.
///
/// Describes how raw tensor memory is interpreted. Independent of storage,
/// layout or backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DataType {
    #[default]
    Undefined,
    Float32,
    Uint8,
}

impl DataType {
    /// Size in bytes of one element. Zero for `Undefined`.
    pub fn element_size(self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::Uint8 => 1,
            Self::Undefined => 0,
        }
    }
}

impl FromStr for DataType {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "float32" | "f32" => Ok(Self::Float32),
            "uint8" | "u8" => Ok(Self::Uint8),
            "undefined" => Ok(Self::Undefined),
            other => Err(InferError::config(format!("Invalid data type: {}", other))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Float32 => write!(f, "float32"),
            Self::Uint8 => write!(f, "uint8"),
        }
    }
}
