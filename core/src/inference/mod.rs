//! Model inference module.
//!
//! This module binds parsed models to execution devices and exposes both
//! the `Result`-returning context API and the result-object API.

mod backend;
mod context;
mod device;
mod probe;
mod result;

pub use backend::{Backend, CpuBackend, MockBackend};
pub use context::{create_context, InferenceContext, ModelConfig};
pub use device::Device;
pub use probe::probe_device;
pub use result::{run_inference, InferenceResult};
