//! Error types for Structura.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all Structura operations.
#[derive(Error, Debug)]
pub enum StructuraError {
    /// Fenced (or bare) model output could not be decoded as JSON.
    ///
    /// `text` is the full input that was being parsed, kept for diagnostics.
    #[error("Malformed payload: {source}")]
    MalformedPayload {
        text: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl StructuraError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Wrap a JSON decode failure together with the text that failed.
    pub fn malformed(text: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedPayload {
            text: text.into(),
            source,
        }
    }

    /// The raw text attached to a `MalformedPayload`, if this is one.
    pub fn payload_text(&self) -> Option<&str> {
        match self {
            Self::MalformedPayload { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedPayload { .. } => ErrorCategory::Payload,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Template(_) | Self::InvalidArgument(_) => ErrorCategory::Usage,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            _ => ErrorCategory::Unknown,
        }
    }

    /// Suggest what the caller could do next.
    ///
    /// This is advisory only; nothing in the crate acts on it.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Payload => RecoverySuggestion::Reprompt,
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Usage => RecoverySuggestion::FixInput,
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server => {
                RecoverySuggestion::TryLater
            }
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StructuraError>;
