use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{AcademicCycle, AcademicMonth};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::schedule::resolve_schedule;
use crate::types::{FeeRecord, PaymentMethod, ReviewFlag, Student};

/// a gateway payment whose signature has already been checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    pub order_id: String,
    pub payment_id: String,
    pub amount: Money,
}

/// how the allocator picked the month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationMatch {
    /// earliest due month of the cycle
    EarliestDue,
    /// nothing was due; booked on the next open slot and flagged
    NoDueMonth,
}

/// a record ready to insert, plus how it was matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub record: FeeRecord,
    pub matched: AllocationMatch,
}

impl Allocation {
    pub fn needs_review(&self) -> bool {
        self.matched == AllocationMatch::NoDueMonth
    }
}

/// pick the month a verified payment pays for and build its ledger record.
///
/// `ledger` is the student's current records. the same payment id is never
/// allocated twice: if any record carries it, `DuplicatePayment` is returned
/// and nothing should be written.
pub fn allocate(
    student: &Student,
    payment: &VerifiedPayment,
    ledger: &[FeeRecord],
    now: DateTime<Utc>,
) -> Result<Allocation> {
    if payment.payment_id.trim().is_empty() {
        return Err(LedgerError::InvalidInput {
            message: "payment id must not be empty".to_string(),
        });
    }
    if !payment.amount.is_positive() {
        return Err(LedgerError::InvalidPaymentAmount {
            amount: payment.amount,
        });
    }

    if ledger.iter().any(|r| r.carries_payment_id(&payment.payment_id)) {
        return Err(LedgerError::DuplicatePayment {
            payment_id: payment.payment_id.clone(),
        });
    }

    let schedule = resolve_schedule(student, ledger, now);

    let (month, year, matched) = match schedule.first_due() {
        Some(due) => (due.month, due.year, AllocationMatch::EarliestDue),
        None => {
            let (month, year) = next_open_slot(student, ledger, now);
            (month, year, AllocationMatch::NoDueMonth)
        }
    };

    let mut record = FeeRecord::paid(student, month, year, payment.amount, PaymentMethod::Online, now)
        .with_payment_id(payment.payment_id.clone());
    if matched == AllocationMatch::NoDueMonth {
        record = record.flagged(ReviewFlag::NoDueMonth);
    }

    Ok(Allocation { record, matched })
}

/// first slot without a paid record, starting at the current month and
/// moving forward in academic order, into later cycles if needed.
///
/// when nothing is due the current month is already paid, so its own slot
/// can never take a second paid record.
fn next_open_slot(student: &Student, ledger: &[FeeRecord], now: DateTime<Utc>) -> (AcademicMonth, i32) {
    let today = now.date_naive();
    let mut cycle = AcademicCycle::containing(today);
    let mut from = AcademicMonth::of_date(today).academic_index();

    let is_paid = |month: AcademicMonth, year: i32| {
        ledger
            .iter()
            .any(|r| r.is_paid() && r.student_id == student.student_id && r.occupies(month, year))
    };

    // a fully paid cycle needs twelve records, so this ends within
    // ledger.len() / 12 + 1 cycles
    loop {
        for month in &AcademicMonth::ALL[from..] {
            let year = cycle.year_of(*month);
            if !is_paid(*month, year) {
                return (*month, year);
            }
        }
        cycle = cycle.next();
        from = 0;
    }
}
