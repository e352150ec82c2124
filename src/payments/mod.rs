pub mod allocation;
pub mod confirmation;
pub mod manual;
pub mod verification;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{FeeRecord, StudentId};

pub use allocation::{allocate, Allocation, AllocationMatch, VerifiedPayment};
pub use confirmation::confirm_payment;
pub use manual::ManualFeeEntry;
pub use verification::{sign, verify};

/// inbound payment confirmation, as posted back by the checkout flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub payment_id: String,
    /// lowercase hex HMAC-SHA256 of `order_id|payment_id`
    pub signature: String,
    pub amount: Money,
    pub student_id: StudentId,
}

impl PaymentNotification {
    /// shape checks done before the signature is even looked at
    pub fn validate(&self) -> Result<()> {
        let blank = [
            ("order id", self.order_id.trim().is_empty()),
            ("payment id", self.payment_id.trim().is_empty()),
            ("signature", self.signature.trim().is_empty()),
            ("student id", self.student_id.is_blank()),
        ];
        if let Some((field, _)) = blank.iter().find(|(_, is_blank)| *is_blank) {
            return Err(LedgerError::InvalidInput {
                message: format!("{} must not be empty", field),
            });
        }
        if !self.amount.is_positive() {
            return Err(LedgerError::InvalidPaymentAmount { amount: self.amount });
        }
        if Money::has_sub_paisa_precision(self.amount.as_decimal()) {
            return Err(LedgerError::InvalidInput {
                message: format!("amount {} has more than two decimal places", self.amount),
            });
        }
        Ok(())
    }

    pub fn verified(&self) -> VerifiedPayment {
        VerifiedPayment {
            order_id: self.order_id.clone(),
            payment_id: self.payment_id.clone(),
            amount: self.amount,
        }
    }
}

/// what the ledger did with a payment confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentDecision {
    /// booked against the earliest due month
    Recorded { record: FeeRecord },
    /// nothing was due; booked on the next open slot and flagged for review
    Flagged { record: FeeRecord },
    /// the payment id was already in the ledger; nothing written
    AlreadyRecorded { payment_id: String },
    /// verified money that could not be booked after retrying; the caller must
    /// park `record` for manual reconciliation
    ManualReviewRequired { record: FeeRecord, reason: String },
    /// not trusted or malformed; nothing written
    Rejected { error: LedgerError },
}

impl PaymentDecision {
    /// the persisted (or parked) record, if any
    pub fn record(&self) -> Option<&FeeRecord> {
        match self {
            PaymentDecision::Recorded { record }
            | PaymentDecision::Flagged { record }
            | PaymentDecision::ManualReviewRequired { record, .. } => Some(record),
            PaymentDecision::AlreadyRecorded { .. } | PaymentDecision::Rejected { .. } => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        !matches!(self, PaymentDecision::Rejected { .. })
    }

    /// boundary response for the web layer
    pub fn response(&self) -> ConfirmationResponse {
        let reason = match self {
            PaymentDecision::Recorded { .. } => None,
            PaymentDecision::Flagged { record } => Some(format!(
                "no month was due; recorded against {} {} for review",
                record.month, record.year
            )),
            PaymentDecision::AlreadyRecorded { payment_id } => {
                Some(format!("payment {} was already recorded", payment_id))
            }
            PaymentDecision::ManualReviewRequired { reason, .. } => Some(reason.clone()),
            PaymentDecision::Rejected { error } => Some(error.to_string()),
        };
        ConfirmationResponse {
            accepted: self.is_accepted(),
            reason,
        }
    }
}

/// `{ accepted, reason? }` returned to the caller of a confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
