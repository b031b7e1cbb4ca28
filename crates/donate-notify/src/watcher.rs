//! Settlement Watcher
//!
//! A long-lived task that polls the payment provider for charge records,
//! spots newly settled ones, and dispatches notification emails. A
//! process-lifetime notified set guarantees each settled charge is emailed
//! at most once; the set is owned exclusively by the watcher task, so no
//! locking is involved. Restarting the process loses the set, which can
//! produce duplicate notifications across restarts.
//!
//! Per-charge lifecycle as observed here: `pending -> settled -> notified`,
//! with `notified` terminal.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use donate_payments::provider::PaymentProvider;

use crate::error::Result;
use crate::mailer::Mailer;
use crate::message::Notice;

/// Watcher configuration
#[derive(Clone, Debug)]
pub struct WatcherConfig {
    /// Time between provider polls
    pub interval: Duration,

    /// Recipient of the unconditional settlement notices
    pub admin_email: String,
}

impl WatcherConfig {
    pub fn new(interval: Duration, admin_email: impl Into<String>) -> Self {
        Self {
            interval,
            admin_email: admin_email.into(),
        }
    }
}

/// Polls for newly settled charges and dispatches notifications
pub struct SettlementWatcher {
    provider: Arc<dyn PaymentProvider>,
    mailer: Arc<dyn Mailer>,
    config: WatcherConfig,
    notified: HashSet<String>,
}

impl SettlementWatcher {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        mailer: Arc<dyn Mailer>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            provider,
            mailer,
            config,
            notified: HashSet::new(),
        }
    }

    /// Run until the cancellation token fires.
    ///
    /// A failed poll only costs that iteration; the next tick retries.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            provider = self.provider.name(),
            interval_secs = self.config.interval.as_secs_f64(),
            "Settlement watcher started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Settlement watcher shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(newly_notified = n, "Dispatched settlement notifications"),
                        Err(e) => tracing::warn!(error = %e, "Settlement poll failed, retrying next tick"),
                    }
                }
            }
        }
    }

    /// One poll iteration; returns how many charges were newly notified.
    ///
    /// Email failures are logged and swallowed here: the charge id goes into
    /// the notified set before any send, so delivery is at-most-once even
    /// when the relay misbehaves mid-batch.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let charges = self.provider.list_charges().await?;
        let mut newly_notified = 0;

        for charge in charges {
            if !charge.status.is_settled() {
                continue;
            }
            if !self.notified.insert(charge.id.clone()) {
                continue;
            }
            newly_notified += 1;

            // Donor email is best-effort: the provider may have none on file.
            if let Some(donor_email) = &charge.payer_email {
                let notice = Notice::donor(charge.amount);
                if let Err(e) = self
                    .mailer
                    .send(donor_email, &notice.subject, &notice.body)
                    .await
                {
                    tracing::warn!(
                        charge_id = %charge.id,
                        error = %e,
                        "Failed to send donor notification"
                    );
                }
            }

            let notice = Notice::admin(&charge.payer_username, charge.amount);
            if let Err(e) = self
                .mailer
                .send(&self.config.admin_email, &notice.subject, &notice.body)
                .await
            {
                tracing::warn!(
                    charge_id = %charge.id,
                    error = %e,
                    "Failed to send admin notification"
                );
            }

            tracing::info!(
                charge_id = %charge.id,
                payer = %charge.payer_username,
                amount = %charge.amount,
                "Settled donation processed"
            );
        }

        Ok(newly_notified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::RecordingMailer;
    use donate_payments::charge::ChargeStatus;
    use donate_payments::provider::MockProvider;
    use rust_decimal_macros::dec;

    const ADMIN: &str = "admin@example.com";

    fn watcher(
        provider: &Arc<MockProvider>,
        mailer: &Arc<RecordingMailer>,
    ) -> SettlementWatcher {
        SettlementWatcher::new(
            provider.clone(),
            mailer.clone(),
            WatcherConfig::new(Duration::from_millis(10), ADMIN),
        )
    }

    #[tokio::test]
    async fn test_settled_charge_notifies_donor_and_admin_once() {
        let provider = Arc::new(MockProvider::new());
        let mailer = Arc::new(RecordingMailer::new());
        provider.add_charge(
            "c1",
            ChargeStatus::Settled,
            "donor1",
            Some("d@x.com"),
            dec!(25),
        );

        let mut watcher = watcher(&provider, &mailer);

        // Same record observed on two consecutive polls
        assert_eq!(watcher.poll_once().await.unwrap(), 1);
        assert_eq!(watcher.poll_once().await.unwrap(), 0);

        assert_eq!(mailer.sent_to("d@x.com").len(), 1);
        assert_eq!(mailer.sent_to(ADMIN).len(), 1);
    }

    #[tokio::test]
    async fn test_pending_charge_sends_nothing_until_settled() {
        let provider = Arc::new(MockProvider::new());
        let mailer = Arc::new(RecordingMailer::new());
        provider.add_charge("c1", ChargeStatus::Pending, "donor1", Some("d@x.com"), dec!(5));

        let mut watcher = watcher(&provider, &mailer);
        watcher.poll_once().await.unwrap();
        assert!(mailer.sent().is_empty());

        provider.settle("c1");
        assert_eq!(watcher.poll_once().await.unwrap(), 1);
        assert_eq!(mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_donor_email_still_notifies_admin() {
        let provider = Arc::new(MockProvider::new());
        let mailer = Arc::new(RecordingMailer::new());
        provider.add_charge("c1", ChargeStatus::Settled, "donor1", None, dec!(5));

        let mut watcher = watcher(&provider, &mailer);
        watcher.poll_once().await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, ADMIN);
    }

    #[tokio::test]
    async fn test_provider_failure_costs_only_that_poll() {
        let provider = Arc::new(MockProvider::new());
        let mailer = Arc::new(RecordingMailer::new());
        provider.add_charge("c1", ChargeStatus::Settled, "donor1", Some("d@x.com"), dec!(5));

        let mut watcher = watcher(&provider, &mailer);

        provider.set_fail_listing(true);
        assert!(watcher.poll_once().await.is_err());
        assert!(mailer.sent().is_empty());

        provider.set_fail_listing(false);
        assert_eq!(watcher.poll_once().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mailer_failure_does_not_requeue_charge() {
        let provider = Arc::new(MockProvider::new());
        let mailer = Arc::new(RecordingMailer::new());
        provider.add_charge("c1", ChargeStatus::Settled, "donor1", Some("d@x.com"), dec!(5));

        let mut watcher = watcher(&provider, &mailer);

        mailer.set_fail_sends(true);
        assert_eq!(watcher.poll_once().await.unwrap(), 1);

        // Delivery is at-most-once: the charge is not retried once the relay recovers
        mailer.set_fail_sends(false);
        assert_eq!(watcher.poll_once().await.unwrap(), 0);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let provider = Arc::new(MockProvider::new());
        let mailer = Arc::new(RecordingMailer::new());
        provider.add_charge("c1", ChargeStatus::Settled, "donor1", Some("d@x.com"), dec!(5));

        let watcher = watcher(&provider, &mailer);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(watcher.run(cancel.clone()));

        // Let at least the immediate first tick fire
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("watcher did not stop after cancellation")
            .unwrap();

        assert_eq!(mailer.sent_to(ADMIN).len(), 1);
    }
}
