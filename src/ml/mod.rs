//! Inference runtime boundary and session caching.
//!
//! The engine itself is opaque; `onnx` provides the pure-Rust `tract`
//! implementation so deploys need no Python or native runtime.

pub mod engine;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod registry;

pub use engine::{
    InferenceEngine, InferenceSession, ModelSpec, Tensor, TensorMap, DEFAULT_INPUT_NAME,
    DEFAULT_OUTPUT_NAME,
};
#[cfg(feature = "onnx")]
pub use onnx::{OnnxModel, TractEngine};
pub use registry::{HandleState, SessionRegistry};
