//! Read-only fee reconciliation derived from enrollment fees and recorded payments.

use serde::{Deserialize, Serialize};

use super::domain::{Money, Payment, PaymentType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Unpaid,
}

impl PaymentStatus {
    /// A zero fee counts as paid; otherwise any partial amount is pending.
    pub fn from_amounts(fee_amount: Money, amount_paid: Money) -> Self {
        if amount_paid >= fee_amount {
            PaymentStatus::Paid
        } else if amount_paid.is_zero() {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Pending
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeReconciliation {
    pub fee_amount: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
    pub payment_status: PaymentStatus,
}

impl FeeReconciliation {
    pub fn new(fee_amount: Money, amount_paid: Money) -> Self {
        Self {
            fee_amount,
            amount_paid,
            balance_due: fee_amount.saturating_sub(amount_paid),
            payment_status: PaymentStatus::from_amounts(fee_amount, amount_paid),
        }
    }

    /// Sums course-fee payments; membership dues linked to the enrollment are ignored.
    pub fn from_payments(fee_amount: Money, payments: &[Payment]) -> Self {
        let amount_paid = payments
            .iter()
            .filter(|payment| payment.payment_type == PaymentType::CourseFee)
            .fold(Money::ZERO, |total, payment| {
                total.saturating_add(payment.amount)
            });
        Self::new(fee_amount, amount_paid)
    }
}
