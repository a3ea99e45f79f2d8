use thiserror::Error;

/// Errors surfaced by the adapter. None of them are retried locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// Transport failure, non-success status, or an undecodable body.
    #[error("provider error: {message}")]
    Provider { message: String },

    /// The payload decoded but lacks the structure the provider schema promises.
    #[error("missing or malformed field `{field}` in provider payload")]
    MissingField { field: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl AdapterError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider { message: message.into() }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
