//! Notification Messages

use rust_decimal::Decimal;

/// A rendered notification email, ready to hand to a [`crate::Mailer`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

impl Notice {
    /// Thank-you note sent to the donor once their charge settles
    pub fn donor(amount: Decimal) -> Self {
        Self {
            subject: "Thank you for your donation".into(),
            body: format!(
                "Thank you for donating ${} to Veterans in need!",
                amount.round_dp(2)
            ),
        }
    }

    /// Settlement notice sent to the administrator
    pub fn admin(payer_username: &str, amount: Decimal) -> Self {
        Self {
            subject: "Donation completed".into(),
            body: format!(
                "A donation of ${} was completed from {payer_username}",
                amount.round_dp(2)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_donor_notice_rounds_amount() {
        let notice = Notice::donor(dec!(25.005));
        assert!(notice.body.contains("$25.00") || notice.body.contains("$25.01"));
    }

    #[test]
    fn test_admin_notice_names_payer() {
        let notice = Notice::admin("donor1", dec!(10));
        assert_eq!(notice.subject, "Donation completed");
        assert!(notice.body.contains("donor1"));
        assert!(notice.body.contains("$10"));
    }
}
