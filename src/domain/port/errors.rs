//! Port-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Port-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// Port was not found.
    NotFound(String),
    /// A well-formed record is missing a required field.
    ValidationFailed { field: String, message: String },
    /// The upload stream does not parse as the expected object shape.
    MalformedInput(String),
    /// The upload stream exceeded the configured byte cap.
    PayloadTooLarge { limit: u64 },
    /// The caller gave up before the operation finished.
    Cancelled,
    /// Infrastructure error.
    Infrastructure(String),
}

impl PortError {
    pub fn not_found(id: impl Into<String>) -> Self {
        PortError::NotFound(id.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn malformed(message: impl Into<String>) -> Self {
        PortError::MalformedInput(message.into())
    }
    pub fn payload_too_large(limit: u64) -> Self {
        PortError::PayloadTooLarge { limit }
    }
    pub fn cancelled() -> Self {
        PortError::Cancelled
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        PortError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            PortError::NotFound(_) => ErrorCode::PortNotFound,
            PortError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PortError::MalformedInput(_) => ErrorCode::MalformedInput,
            PortError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            PortError::Cancelled => ErrorCode::Cancelled,
            PortError::Infrastructure(_) => ErrorCode::StoreUnavailable,
        }
    }
    pub fn message(&self) -> String {
        match self {
            PortError::NotFound(id) => format!("Port not found: {}", id),
            PortError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PortError::MalformedInput(msg) => format!("Malformed input: {}", msg),
            PortError::PayloadTooLarge { limit } => {
                format!("Payload exceeds the maximum of {} bytes", limit)
            }
            PortError::Cancelled => "Request cancelled".to_string(),
            PortError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for PortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PortError {}

impl From<ValidationError> for PortError {
    fn from(err: ValidationError) -> Self {
        PortError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for PortError {
    fn from(err: DomainError) -> Self {
        PortError::Infrastructure(err.to_string())
    }
}
