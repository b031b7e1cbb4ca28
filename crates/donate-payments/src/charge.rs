//! Charge Records
//!
//! A charge is a requested payment as the provider reports it. The provider
//! owns these records; this crate only reads them. Listing responses are
//! parsed one record at a time so a single malformed entry never blocks the
//! rest of a batch.

use rust_decimal::Decimal;
use serde_json::Value;

/// Settlement status of a charge, as reported by the provider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeStatus {
    /// Awaiting action from the payer
    Pending,
    /// Completed by the payer (terminal)
    Settled,
    /// Cancelled by either party (terminal)
    Cancelled,
    /// Request expired before the payer acted (terminal)
    Expired,
    /// Provider-side failure (terminal)
    Failed,
    /// Status string this build does not recognize
    Unknown,
}

impl ChargeStatus {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pending" => ChargeStatus::Pending,
            "settled" => ChargeStatus::Settled,
            "cancelled" => ChargeStatus::Cancelled,
            "expired" => ChargeStatus::Expired,
            "failed" => ChargeStatus::Failed,
            _ => ChargeStatus::Unknown,
        }
    }

    /// Whether the payer has completed this charge
    pub fn is_settled(&self) -> bool {
        matches!(self, ChargeStatus::Settled)
    }
}

/// A payment-request record owned by the provider
#[derive(Clone, Debug)]
pub struct Charge {
    /// Provider-assigned identifier
    pub id: String,

    /// Settlement status
    pub status: ChargeStatus,

    /// Username of the account being charged (the donor)
    pub payer_username: String,

    /// Email on file for the payer, if the provider has one
    pub payer_email: Option<String>,

    /// Requested amount in dollars
    pub amount: Decimal,
}

impl Charge {
    /// Parse a single charge record from a provider listing.
    ///
    /// Returns `None` when required fields are missing or unreadable. The
    /// donor is the `target` of a charge request (the account being asked
    /// to pay); request amounts are reported negative by the provider, so
    /// the absolute value is kept.
    pub fn from_provider_record(record: &Value) -> Option<Self> {
        let id = record.get("id")?.as_str()?.to_string();
        let status = ChargeStatus::parse(record.get("status")?.as_str()?);
        let amount = parse_amount(record.get("amount")?)?.abs();

        let target = record.get("target")?;
        let payer_username = target.get("username")?.as_str()?.to_string();
        let payer_email = target
            .get("email")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            id,
            status,
            payer_username,
            payer_email,
            amount,
        })
    }
}

/// Read an amount that the provider may report as a JSON number or a string
fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_status_parsing() {
        assert_eq!(ChargeStatus::parse("settled"), ChargeStatus::Settled);
        assert_eq!(ChargeStatus::parse("SETTLED"), ChargeStatus::Settled);
        assert_eq!(ChargeStatus::parse("pending"), ChargeStatus::Pending);
        assert_eq!(ChargeStatus::parse("held"), ChargeStatus::Unknown);
        assert!(ChargeStatus::Settled.is_settled());
        assert!(!ChargeStatus::Pending.is_settled());
    }

    #[test]
    fn test_parse_full_record() {
        let record = json!({
            "id": "ch_1",
            "status": "settled",
            "amount": -25.5,
            "target": { "username": "donor1", "email": "donor@example.com" },
        });

        let charge = Charge::from_provider_record(&record).unwrap();
        assert_eq!(charge.id, "ch_1");
        assert_eq!(charge.status, ChargeStatus::Settled);
        assert_eq!(charge.amount, dec!(25.5));
        assert_eq!(charge.payer_username, "donor1");
        assert_eq!(charge.payer_email.as_deref(), Some("donor@example.com"));
    }

    #[test]
    fn test_parse_record_without_email() {
        let record = json!({
            "id": "ch_2",
            "status": "pending",
            "amount": "10.00",
            "target": { "username": "donor2", "email": "" },
        });

        let charge = Charge::from_provider_record(&record).unwrap();
        assert_eq!(charge.amount, dec!(10.00));
        assert!(charge.payer_email.is_none());
    }

    #[test]
    fn test_malformed_record_is_rejected() {
        // No target user at all
        let record = json!({ "id": "ch_3", "status": "settled", "amount": 5 });
        assert!(Charge::from_provider_record(&record).is_none());

        // Amount is not numeric
        let record = json!({
            "id": "ch_4",
            "status": "settled",
            "amount": {"value": 5},
            "target": { "username": "donor4" },
        });
        assert!(Charge::from_provider_record(&record).is_none());
    }
}
