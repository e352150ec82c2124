use thiserror::Error;

use crate::calendar::AcademicMonth;
use crate::decimal::Money;
use crate::types::StudentId;

/// which uniqueness constraint of the ledger rejected an insert
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InsertConflict {
    /// another record already carries this external payment id
    DuplicatePaymentId { payment_id: String },
    /// the (student, month, year) slot already holds a paid record
    DuplicateMonth {
        student_id: StudentId,
        month: AcademicMonth,
        year: i32,
    },
}

impl std::fmt::Display for InsertConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsertConflict::DuplicatePaymentId { payment_id } => {
                write!(f, "payment id {} already recorded", payment_id)
            }
            InsertConflict::DuplicateMonth { student_id, month, year } => {
                write!(f, "{} {} already paid for student {}", month, year, student_id)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("signature verification failed for order {order_id}, payment {payment_id}")]
    VerificationFailed {
        order_id: String,
        payment_id: String,
    },

    #[error("payment {payment_id} already allocated")]
    DuplicatePayment {
        payment_id: String,
    },

    #[error("ledger insert rejected: {conflict}")]
    ConflictOnInsert {
        conflict: InsertConflict,
    },

    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("student not found: {student_id}")]
    StudentNotFound {
        student_id: StudentId,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },
}

impl LedgerError {
    /// errors that reject a request before anything is written
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidInput { .. }
                | LedgerError::InvalidPaymentAmount { .. }
                | LedgerError::StudentNotFound { .. }
                | LedgerError::InvalidDate { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
