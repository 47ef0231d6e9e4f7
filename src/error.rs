use thiserror::Error;

/// Main error type for the inference client
#[derive(Error, Debug)]
pub enum ZiaError {
    // Input errors
    #[error("Input is empty.")]
    EmptyInput,

    /// The offending token is kept for diagnostics; the rendered message
    /// stays generic.
    #[error("All inputs must be valid numbers.")]
    InvalidNumber { token: String },

    #[error("Expected {expected} features but got {got}.")]
    FeatureCountMismatch { expected: usize, got: usize },

    // Engine errors (opaque, passed through)
    #[error("{0}")]
    Engine(String),

    #[error("Unexpected model output: {0}")]
    InvalidOutput(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ZiaError {
    /// True for errors caused by what the user typed, as opposed to the
    /// engine or the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ZiaError::EmptyInput
                | ZiaError::InvalidNumber { .. }
                | ZiaError::FeatureCountMismatch { .. }
        )
    }
}

/// Result type alias for ZiaError
pub type Result<T> = std::result::Result<T, ZiaError>;
