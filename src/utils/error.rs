use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Model error: {0}")]
    ModelError(#[from] ModelError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid value for '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("{message}")]
    ConflictError { message: String },

    #[error("{resource} {id} not found")]
    NotFoundError { resource: &'static str, id: i64 },

    #[error("{message}")]
    AuthError { message: String },
}

/// Broad grouping used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
    Model,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AppError::ValidationError { .. }
            | AppError::ConflictError { .. }
            | AppError::NotFoundError { .. }
            | AppError::AuthError { .. }
            | AppError::SerializationError(_) => ErrorCategory::Input,
            AppError::IoError(_) | AppError::CsvError(_) => ErrorCategory::Storage,
            AppError::ModelError(_) => ErrorCategory::Model,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::IoError(e) => format!("Could not read or write a file: {}", e),
            AppError::CsvError(e) => format!("The seed CSV file could not be parsed: {}", e),
            AppError::ModelError(e) => format!("A forecasting model could not be used: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML configuration file and command line overrides"
            }
            ErrorCategory::Input => "Fix the request payload and try again",
            ErrorCategory::Storage => "Make sure the referenced files exist and are readable",
            ErrorCategory::Model => {
                "Re-export the model artifact and confirm its JSON matches the expected kind"
            }
        }
    }
}

/// Failures raised by a loaded forecasting model or while decoding its artifact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("model produced a non-finite value at step {step}")]
    NonFinite { step: usize },
}

pub type Result<T> = std::result::Result<T, AppError>;
