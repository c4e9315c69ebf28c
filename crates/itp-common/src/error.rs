//! Error types for issue tracker policy tooling.

use thiserror::Error;

/// Result type alias for issue tracker policy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for issue tracker policy tooling.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed policy document: {0}")]
    PolicyParse(String),

    #[error("invalid policy document: {0}")]
    PolicyValidation(String),

    #[error("label template error: {0}")]
    Template(String),

    #[error("no policy file found (searched: {searched})")]
    PolicyFileMissing { searched: String },

    // Lookup errors (20-29)
    #[error("project not found: {project}")]
    ProjectNotFound { project: String },

    #[error("unknown status key: {0}")]
    UnknownStatus(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Output errors (70-79)
    #[error("output rendering failed: {0}")]
    Render(String),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::PolicyParse(_) => 11,
            Error::PolicyValidation(_) => 12,
            Error::Template(_) => 13,
            Error::PolicyFileMissing { .. } => 14,
            Error::ProjectNotFound { .. } => 20,
            Error::UnknownStatus(_) => 21,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Render(_) => 70,
        }
    }

    /// Whether the error stems from the policy content rather than the environment.
    pub fn is_config_error(&self) -> bool {
        (10..20).contains(&self.code())
    }
}
