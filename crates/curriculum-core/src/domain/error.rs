//! Domain-level error taxonomy for the curriculum engine.

use serde::{Deserialize, Serialize};

/// Stable machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    ValidationFailed,
    IoError,
    ConfigError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::ValidationFailed => "validation_failed",
            Self::IoError => "io_error",
            Self::ConfigError => "config_error",
            Self::InternalError => "internal_error",
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::InvalidArgument => 2,
            Self::NotFound => 3,
            Self::ValidationFailed => 4,
            Self::IoError => 6,
            Self::ConfigError => 7,
            Self::InternalError => 10,
        }
    }
}

/// Curriculum engine errors.
///
/// Quality defects in a draft are never errors; they surface as diagnostics.
/// These variants cover malformed inputs, collaborator failures, and I/O.
#[derive(Debug, thiserror::Error)]
pub enum CurriculumError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{stage} stage failed: {detail}")]
    Internal { stage: String, detail: String },

    #[error("{stage} generation failed after {attempts} attempt(s): {detail}")]
    Generation {
        stage: String,
        attempts: u32,
        detail: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CurriculumError {
    pub fn internal(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Internal {
            stage: stage.into(),
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Internal { .. } | Self::Generation { .. } => ErrorCode::InternalError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::DigestMismatch { .. } => ErrorCode::ValidationFailed,
            Self::Serialization(_) => ErrorCode::InvalidArgument,
            Self::Io(_) => ErrorCode::IoError,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }
}

/// Result type for curriculum engine operations.
pub type Result<T> = std::result::Result<T, CurriculumError>;
