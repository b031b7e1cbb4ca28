//! Payment Provider Integration
//!
//! Abstractions and implementations for the external payment provider.

mod mock;
mod venmo;

pub use mock::{MockProvider, SubmittedRequest};
pub use venmo::{VenmoClient, VenmoConfig};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::charge::Charge;
use crate::error::Result;

/// An account on the provider side that can be asked to pay
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderUser {
    /// Provider-assigned account id
    pub id: String,

    /// Public username
    pub username: String,

    /// Email on file, if any
    pub email: Option<String>,
}

/// Payment provider client trait (Strategy pattern)
///
/// Implement this for each provider backend. The production implementation
/// is [`VenmoClient`]; [`MockProvider`] backs tests and demos.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Look up an account by its exact username
    async fn find_user(&self, username: &str) -> Result<Option<ProviderUser>>;

    /// Submit a payment request for `amount` against the given account
    async fn request_payment(&self, user_id: &str, amount: Decimal, note: &str) -> Result<()>;

    /// List all current charge records
    async fn list_charges(&self) -> Result<Vec<Charge>>;

    /// Provider name
    fn name(&self) -> &str;
}
