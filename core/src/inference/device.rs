//! Execution device selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InferError, Result};

/// Device specification for model inference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// CPU execution with the built-in kernels.
    #[default]
    Cpu,
    /// No-op device returning canned outputs. Ignores model data.
    Mock,
    /// Neural processing unit. Declared, not yet available.
    Npu,
}

impl Device {
    /// Create a CPU device.
    pub fn cpu() -> Self {
        Self::Cpu
    }

    /// Create a mock device.
    pub fn mock() -> Self {
        Self::Mock
    }

    /// Whether this build can execute on the device.
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Npu)
    }
}

impl FromStr for Device {
    type Err = InferError;

    /// Parse a device string like "cpu", "CPU", "mock", "npu".
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            "mock" => Ok(Self::Mock),
            "npu" => Ok(Self::Npu),
            _ => Err(InferError::config(format!("Invalid device: {}", s))),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Mock => write!(f, "mock"),
            Self::Npu => write!(f, "npu"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!(" Mock ".parse::<Device>().unwrap(), Device::Mock);
        assert_eq!("npu".parse::<Device>().unwrap(), Device::Npu);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "cuda:0".parse::<Device>().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Invalid device: cuda:0");
    }

    #[test]
    fn test_display_round_trips() {
        for device in [Device::Cpu, Device::Mock, Device::Npu] {
            assert_eq!(device.to_string().parse::<Device>().unwrap(), device);
        }
        assert!(!Device::Npu.is_available());
    }
}
