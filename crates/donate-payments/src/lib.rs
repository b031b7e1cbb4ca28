//! # donate-payments
//!
//! Payment provider integration and donation intake for donation-relay.
//!
//! ## Layout
//!
//! - [`provider`] — the [`PaymentProvider`] trait with a production HTTP
//!   client ([`VenmoClient`]) and an in-memory [`MockProvider`] for tests
//!   and demos.
//! - [`charge`] — the [`Charge`] record as observed from the provider, with
//!   lenient per-record parsing so one malformed record never blocks a batch.
//! - [`intake`] — [`DonationService`], the synchronous per-request operation
//!   that resolves a username to a payee account and submits a payment
//!   request.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use donate_payments::{DonationOutcome, DonationService, VenmoClient, VenmoConfig};
//!
//! let provider = Arc::new(VenmoClient::new(VenmoConfig::new("access-token"))?);
//! let donations = DonationService::new(provider, "Donation");
//!
//! match donations.request_donation("some-user", dec!(25)).await? {
//!     DonationOutcome::Requested => println!("charge created"),
//!     DonationOutcome::UserNotFound => println!("no such account"),
//! }
//! ```

pub mod charge;
pub mod error;
pub mod intake;
pub mod provider;

pub use charge::{Charge, ChargeStatus};
pub use error::{PaymentError, Result};
pub use intake::{DonationOutcome, DonationService};
pub use provider::{MockProvider, PaymentProvider, ProviderUser, VenmoClient, VenmoConfig};
