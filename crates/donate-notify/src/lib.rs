//! # donate-notify
//!
//! Email notifications and the settlement watcher for donation-relay.
//!
//! The [`SettlementWatcher`] is the one piece of this system with state and
//! timing semantics: it polls the payment provider for charge records on a
//! fixed interval, spots newly settled ones, and dispatches a thank-you
//! email to the donor (when the provider has an email on file) plus an
//! admin email for every settlement. A process-lifetime notified set keeps
//! each charge from being emailed twice.
//!
//! Mail delivery is abstracted behind the [`Mailer`] trait: [`SmtpMailer`]
//! speaks authenticated STARTTLS to a configured relay, and
//! [`RecordingMailer`] captures messages for tests.

pub mod error;
pub mod mailer;
pub mod message;
pub mod watcher;

pub use error::{NotifyError, Result};
pub use mailer::{Mailer, RecordingMailer, SentMail, SmtpConfig, SmtpMailer};
pub use message::Notice;
pub use watcher::{SettlementWatcher, WatcherConfig};
