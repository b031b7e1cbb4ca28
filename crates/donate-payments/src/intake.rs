//! Donation Intake
//!
//! The synchronous per-request operation: resolve a username to a payee
//! account and submit a payment request against it. Stateless beyond the
//! provider handle; the resulting charge lives entirely on the provider
//! side, where the settlement watcher later observes it.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::{PaymentError, Result};
use crate::provider::PaymentProvider;

/// Result of a donation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DonationOutcome {
    /// A pending charge was created on the provider
    Requested,
    /// No provider account matches the username (recoverable, no charge made)
    UserNotFound,
}

/// Donation intake service
pub struct DonationService {
    provider: Arc<dyn PaymentProvider>,
    memo: String,
}

impl DonationService {
    /// Create a new service; `memo` is attached to every payment request
    pub fn new(provider: Arc<dyn PaymentProvider>, memo: impl Into<String>) -> Self {
        Self {
            provider,
            memo: memo.into(),
        }
    }

    /// Request a donation of `amount` from the given username.
    ///
    /// Validation failures and unknown usernames are recoverable; provider
    /// transport failures propagate to the caller.
    pub async fn request_donation(&self, username: &str, amount: Decimal) -> Result<DonationOutcome> {
        let username = username.trim();
        if username.is_empty() {
            return Err(PaymentError::Validation("No username was specified".into()));
        }
        if amount <= Decimal::ZERO {
            return Err(PaymentError::Validation(
                "Donation amount must be positive".into(),
            ));
        }

        let Some(user) = self.provider.find_user(username).await? else {
            tracing::info!(username, "Donation request for unknown username");
            return Ok(DonationOutcome::UserNotFound);
        };

        self.provider
            .request_payment(&user.id, amount, &self.memo)
            .await?;

        tracing::info!(
            username = %user.username,
            %amount,
            provider = self.provider.name(),
            "Submitted payment request"
        );
        Ok(DonationOutcome::Requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;
    use rust_decimal_macros::dec;

    fn service(provider: &Arc<MockProvider>) -> DonationService {
        DonationService::new(provider.clone(), "Donation")
    }

    #[tokio::test]
    async fn test_successful_donation_creates_request() {
        let provider = Arc::new(MockProvider::new());
        provider.add_user("u1", "donor", Some("d@example.com"));

        let outcome = service(&provider)
            .request_donation("donor", dec!(25))
            .await
            .unwrap();

        assert_eq!(outcome, DonationOutcome::Requested);
        let submitted = provider.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].user_id, "u1");
        assert_eq!(submitted[0].amount, dec!(25));
        assert_eq!(submitted[0].note, "Donation");
    }

    #[tokio::test]
    async fn test_unknown_username_creates_no_charge() {
        let provider = Arc::new(MockProvider::new());

        let outcome = service(&provider)
            .request_donation("nobody", dec!(25))
            .await
            .unwrap();

        assert_eq!(outcome, DonationOutcome::UserNotFound);
        assert!(provider.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_empty_username_skips_provider() {
        let provider = Arc::new(MockProvider::new());

        let result = service(&provider).request_donation("   ", dec!(25)).await;

        assert!(matches!(result, Err(PaymentError::Validation(_))));
        assert_eq!(provider.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_amount_skips_provider() {
        let provider = Arc::new(MockProvider::new());
        provider.add_user("u1", "donor", None);

        for amount in [dec!(0), dec!(-5)] {
            let result = service(&provider).request_donation("donor", amount).await;
            assert!(matches!(result, Err(PaymentError::Validation(_))));
        }
        assert_eq!(provider.lookup_count(), 0);
        assert!(provider.submitted().is_empty());
    }
}
