//! CPU kernels used by the model graph.
//!
//! Activations operate in place on 2-D `[batch, features]` arrays.

mod activation;
mod dense;

pub use activation::{relu, sigmoid, softmax, tanh};
pub use dense::dense;
