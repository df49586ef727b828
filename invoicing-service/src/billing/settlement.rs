//! Derivation of an invoice's settlement status from its received payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::InvoiceStatus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlementInput {
    pub current: InvoiceStatus,
    pub gross: Decimal,
    pub due_date: Option<DateTime<Utc>>,
    /// Sum of the invoice's received payments.
    pub paid_amount: Decimal,
}

/// Applies the settlement rules in priority order; the first match wins.
///
/// 1. fully paid (and something was owed) → `Paid`
/// 2. due date in the past → `Overdue`
/// 3. partially paid → `Partial`
/// 4. previously `Paid` but no longer covered → `Sent`
/// 5. otherwise the current status is kept
pub fn derive_settlement_status(input: &SettlementInput, now: DateTime<Utc>) -> InvoiceStatus {
    if input.paid_amount >= input.gross && input.gross > Decimal::ZERO {
        return InvoiceStatus::Paid;
    }
    if input.due_date.is_some_and(|due| due < now) {
        return InvoiceStatus::Overdue;
    }
    if input.paid_amount > Decimal::ZERO {
        return InvoiceStatus::Partial;
    }
    if input.current == InvoiceStatus::Paid {
        return InvoiceStatus::Sent;
    }
    input.current
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(current: InvoiceStatus, gross: i64, paid: i64) -> SettlementInput {
        SettlementInput {
            current,
            gross: Decimal::from(gross),
            due_date: None,
            paid_amount: Decimal::from(paid),
        }
    }

    #[test]
    fn fully_paid_invoice_is_paid() {
        let now = Utc::now();
        assert_eq!(
            derive_settlement_status(&input(InvoiceStatus::Sent, 50, 50), now),
            InvoiceStatus::Paid
        );
        assert_eq!(
            derive_settlement_status(&input(InvoiceStatus::Sent, 50, 80), now),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn paid_wins_over_overdue() {
        let now = Utc::now();
        let mut settled = input(InvoiceStatus::Overdue, 100, 100);
        settled.due_date = Some(now - Duration::days(10));
        assert_eq!(derive_settlement_status(&settled, now), InvoiceStatus::Paid);
    }

    #[test]
    fn overdue_wins_over_partial() {
        let now = Utc::now();
        let mut late = input(InvoiceStatus::Sent, 100, 40);
        late.due_date = Some(now - Duration::days(1));
        assert_eq!(derive_settlement_status(&late, now), InvoiceStatus::Overdue);
    }

    #[test]
    fn partial_payment_before_due_date() {
        let now = Utc::now();
        let mut early = input(InvoiceStatus::Sent, 100, 40);
        early.due_date = Some(now + Duration::days(14));
        assert_eq!(derive_settlement_status(&early, now), InvoiceStatus::Partial);
    }

    #[test]
    fn paid_invoice_without_payments_reverts_to_sent() {
        assert_eq!(
            derive_settlement_status(&input(InvoiceStatus::Paid, 50, 0), Utc::now()),
            InvoiceStatus::Sent
        );
    }

    #[test]
    fn zero_gross_invoice_is_never_paid() {
        assert_eq!(
            derive_settlement_status(&input(InvoiceStatus::Draft, 0, 0), Utc::now()),
            InvoiceStatus::Draft
        );
    }

    #[test]
    fn unrelated_statuses_are_kept() {
        let now = Utc::now();
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Cancelled,
        ] {
            assert_eq!(derive_settlement_status(&input(status, 100, 0), now), status);
        }
    }
}
