//! Application State

use std::sync::Arc;

use donate_payments::DonationService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Donation intake service
    pub donations: Arc<DonationService>,
}
