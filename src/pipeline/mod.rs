//! Parse -> standardize -> infer -> decode, for both models.

pub mod decoder;
pub mod parser;
pub mod presentation;
pub mod runner;
pub mod standardize;

pub use decoder::{argmax, decode_classification, decode_regression, softmax, IRIS_CLASS_NAMES};
pub use parser::parse_features;
pub use presentation::{render_error, render_result, RegionReport};
pub use runner::{report_once, Predictor};
pub use standardize::{standardize, SCALE_EPSILON};
