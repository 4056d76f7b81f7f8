//! infer-rs: on-device model inference with CPU and mock execution devices.
//!
//! A model arrives as opaque bytes together with a device selector
//! ([`ModelConfig`]). [`create_context`] parses and validates it and returns
//! an [`InferenceContext`]; [`InferenceContext::run`] executes one input
//! tensor and yields class probabilities. Both calls move their work onto
//! tokio's blocking pool.
//!
//! [`run_inference`] is the result-object flavour: it never fails and
//! reports errors inside an [`InferenceResult`].
//!
//! # Example
//!
//! ```
//! use infer_rs::model::{Activation, ModelBuilder};
//! use infer_rs::{create_context, Device, ModelConfig, Tensor};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> infer_rs::Result<()> {
//! let model = ModelBuilder::new("pair", [2])
//!     .dense(2, 2, &[1.0, 0.0, 0.0, 1.0], None)?
//!     .activation(Activation::Softmax)
//!     .to_bytes()?;
//!
//! let ctx = create_context(ModelConfig::new(Device::cpu(), model)).await?;
//! let probs = ctx.run(Tensor::new([1, 2], vec![2.0, 0.0])?).await?;
//! assert_eq!(probs.argmax(), Some(0));
//! # Ok(())
//! # }
//! ```
//!
//! # Devices
//!
//! - `cpu`: built-in kernels over the model's dense/activation graph
//! - `mock`: canned outputs, model data is not inspected
//! - `npu`: declared for forward compatibility; context creation fails

pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod model;
pub mod ops;
pub mod tensor;

// Re-export commonly used types
pub use error::{InferError, Result};
pub use inference::{
    create_context, run_inference, Device, InferenceContext, InferenceResult, ModelConfig,
};
pub use tensor::{InputTensor, OutputTensor, Shape, Tensor};
