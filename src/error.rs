//! Error types.
//!
//! Two layers:
//!
//! - [`RiskError`] is the engine's own taxonomy (calculator, feature engineering, model
//!   integrity). Library code returns it unmodified so callers can match on the kind.
//! - [`AppError`] is what the binary reports: a message plus a process exit code. Every
//!   `RiskError` converts into one.

use thiserror::Error;

/// Engine error taxonomy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// Malformed or out-of-range raw numeric input (e.g. a negative tenure).
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A required raw field is missing or not numeric.
    #[error("cannot engineer features, field `{field}`: {reason}")]
    FeatureEngineering { field: String, reason: String },

    /// The loaded forest violates an invariant. Fatal: serving must not start.
    #[error("model integrity check failed: {0}")]
    ModelIntegrity(String),
}

impl RiskError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn feature(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FeatureEngineering {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn integrity(reason: impl Into<String>) -> Self {
        Self::ModelIntegrity(reason.into())
    }

    /// Field name carried by input-side errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. } | Self::FeatureEngineering { field, .. } => Some(field),
            Self::ModelIntegrity(_) => None,
        }
    }

    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInput { .. } => 2,
            Self::FeatureEngineering { .. } => 3,
            Self::ModelIntegrity(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RiskError> for AppError {
    fn from(err: RiskError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
