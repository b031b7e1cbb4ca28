//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Provider rejected a request or returned an unusable response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Transport-level failure talking to the provider
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Donation input rejected before any provider call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::Provider(_) | PaymentError::Network(_))
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Validation(msg) => msg,
            PaymentError::Provider(_) | PaymentError::Network(_) => {
                "Payment processing failed. Please try again."
            }
            _ => "An error occurred processing your request.",
        }
    }
}
