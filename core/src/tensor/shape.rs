//! Tensor shape: an ordered sequence of dimension sizes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered dimension sizes of a tensor.
///
/// An empty shape describes a scalar and holds exactly one element.
/// Any zero-sized dimension yields a tensor with no elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape(Vec<u32>);

impl Shape {
    /// Create a shape from dimension sizes.
    pub fn new(dims: impl Into<Vec<u32>>) -> Self {
        Self(dims.into())
    }

    /// Scalar (rank-0) shape.
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    /// Dimension sizes.
    pub fn dims(&self) -> &[u32] {
        &self.0
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Whether this is a rank-0 shape.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Size of the last dimension, if any.
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    /// Total number of elements, or `None` if the product overflows.
    pub fn checked_numel(&self) -> Option<u64> {
        self.0
            .iter()
            .try_fold(1u64, |acc, &dim| acc.checked_mul(u64::from(dim)))
    }

    /// Total number of elements. Saturates at `u64::MAX`.
    pub fn numel(&self) -> u64 {
        self.0
            .iter()
            .fold(1u64, |acc, &dim| acc.saturating_mul(u64::from(dim)))
    }

    /// Dimensions widened to `usize`, as ndarray expects them.
    pub fn to_usize(&self) -> Vec<usize> {
        self.0.iter().map(|&d| d as usize).collect()
    }
}

impl From<Vec<u32>> for Shape {
    fn from(dims: Vec<u32>) -> Self {
        Self(dims)
    }
}

impl From<&[u32]> for Shape {
    fn from(dims: &[u32]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for Shape {
    fn from(dims: [u32; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}
