//! Text written into the two output regions.
//!
//! A region only ever receives a formatted result or `"Error: <message>"`.

use serde::Serialize;

use crate::domain::{ModelKind, PipelineOutcome};
use crate::error::{Result, ZiaError};

pub fn render_error(err: &ZiaError) -> String {
    format!("Error: {err}")
}

pub fn render_result(result: &Result<PipelineOutcome>) -> String {
    match result {
        Ok(outcome) => outcome.display(),
        Err(e) => render_error(e),
    }
}

/// Structured form of one region update, for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    pub model: ModelKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PipelineOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegionReport {
    pub fn new(model: ModelKind, result: Result<PipelineOutcome>) -> Self {
        let text = render_result(&result);
        match result {
            Ok(outcome) => Self {
                model,
                text,
                outcome: Some(outcome),
                error: None,
            },
            Err(e) => Self {
                model,
                text,
                outcome: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
