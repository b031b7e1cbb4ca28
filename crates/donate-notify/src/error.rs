//! Notification Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Notification-related errors
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Provider call made on behalf of the watcher failed
    #[error(transparent)]
    Payment(#[from] donate_payments::PaymentError),

    /// A recipient or sender address could not be parsed
    #[error("Invalid email address: {0}")]
    Address(String),

    /// The message itself could not be assembled
    #[error("Failed to build message: {0}")]
    Message(String),

    /// SMTP session failure
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
