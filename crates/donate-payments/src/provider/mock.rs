//! Mock Payment Provider
//!
//! For testing and demo purposes. Holds users and charges in memory and
//! records every call so tests can assert what was (and was not) sent to
//! the provider.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{PaymentProvider, ProviderUser};
use crate::charge::{Charge, ChargeStatus};
use crate::error::{PaymentError, Result};

/// A payment request captured by the mock
#[derive(Clone, Debug)]
pub struct SubmittedRequest {
    pub user_id: String,
    pub amount: Decimal,
    pub note: String,
}

/// In-memory payment provider
#[derive(Default)]
pub struct MockProvider {
    users: RwLock<HashMap<String, ProviderUser>>,
    charges: RwLock<Vec<Charge>>,
    submitted: RwLock<Vec<SubmittedRequest>>,
    lookup_calls: AtomicUsize,
    fail_listing: AtomicBool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user that lookups can find
    pub fn add_user(&self, id: &str, username: &str, email: Option<&str>) {
        self.users.write().unwrap().insert(
            username.to_lowercase(),
            ProviderUser {
                id: id.to_string(),
                username: username.to_string(),
                email: email.map(str::to_string),
            },
        );
    }

    /// Insert a charge record for listings to return
    pub fn add_charge(
        &self,
        id: &str,
        status: ChargeStatus,
        payer_username: &str,
        payer_email: Option<&str>,
        amount: Decimal,
    ) {
        self.charges.write().unwrap().push(Charge {
            id: id.to_string(),
            status,
            payer_username: payer_username.to_string(),
            payer_email: payer_email.map(str::to_string),
            amount,
        });
    }

    /// Flip an existing charge to settled
    pub fn settle(&self, id: &str) {
        let mut charges = self.charges.write().unwrap();
        for charge in charges.iter_mut() {
            if charge.id == id {
                charge.status = ChargeStatus::Settled;
            }
        }
    }

    /// Make every `list_charges` call fail until turned off again
    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Payment requests submitted so far
    pub fn submitted(&self) -> Vec<SubmittedRequest> {
        self.submitted.read().unwrap().clone()
    }

    /// How many user lookups have been made
    pub fn lookup_count(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn find_user(&self, username: &str) -> Result<Option<ProviderUser>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().unwrap().get(&username.to_lowercase()).cloned())
    }

    async fn request_payment(&self, user_id: &str, amount: Decimal, note: &str) -> Result<()> {
        self.submitted.write().unwrap().push(SubmittedRequest {
            user_id: user_id.to_string(),
            amount,
            note: note.to_string(),
        });
        Ok(())
    }

    async fn list_charges(&self) -> Result<Vec<Charge>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(PaymentError::Provider("Simulated listing failure".into()));
        }
        Ok(self.charges.read().unwrap().clone())
    }

    fn name(&self) -> &str {
        "MockProvider"
    }
}
