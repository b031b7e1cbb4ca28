//! Application Configuration
//!
//! Everything is read from environment variables once at startup and
//! validated up front: a malformed or missing value is a fatal startup
//! error, never an interactive prompt.

use std::time::Duration;

use thiserror::Error;

use donate_notify::SmtpConfig;
use donate_payments::VenmoConfig;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} is invalid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Fully validated application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Payment provider settings
    pub venmo: VenmoConfig,

    /// SMTP relay settings
    pub smtp: SmtpConfig,

    /// Recipient of admin settlement notices
    pub admin_email: String,

    /// Memo attached to every payment request
    pub memo: String,

    /// Time between settlement polls
    pub poll_interval: Duration,
}

impl AppConfig {
    /// Load and validate configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut venmo = VenmoConfig::new(required("VENMO_ACCESS_TOKEN")?);
        if let Some(base) = optional("VENMO_API_BASE") {
            venmo.base_url = base;
        }
        venmo.timeout = Duration::from_secs(parse_or("VENMO_TIMEOUT_SECS", 10)?);

        let smtp_address = required("SMTP_ADDRESS")?;
        let smtp = SmtpConfig {
            host: required("SMTP_HOST")?,
            port: parse_or("SMTP_PORT", 587)?,
            address: smtp_address.clone(),
            password: required("SMTP_PASSWORD")?,
            timeout: Duration::from_secs(parse_or("SMTP_TIMEOUT_SECS", 10)?),
        };

        Ok(Self {
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            venmo,
            smtp,
            // Admin notices default to the sending account's own inbox
            admin_email: optional("ADMIN_EMAIL").unwrap_or(smtp_address),
            memo: optional("DONATION_MEMO").unwrap_or_else(|| "Donation".into()),
            poll_interval: Duration::from_secs(parse_or("POLL_INTERVAL_SECS", 5)?),
        })
    }
}

fn optional(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
