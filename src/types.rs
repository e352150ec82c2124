use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::calendar::{AcademicCycle, AcademicMonth};
use crate::decimal::Money;

/// unique identifier for a fee record
pub type RecordId = Uuid;

/// external student identifier, as issued by the roster
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: impl Into<String>) -> Self {
        StudentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        StudentId::new(s)
    }
}

impl From<String> for StudentId {
    fn from(s: String) -> Self {
        StudentId(s)
    }
}

/// a student as the roster knows them; read-only to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    pub name: String,
    /// class or grade
    pub standard: String,
    pub monthly_fee: Money,
    pub mobile_no: Option<String>,
}

impl Student {
    pub fn new(
        student_id: impl Into<StudentId>,
        name: impl Into<String>,
        standard: impl Into<String>,
        monthly_fee: Money,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            standard: standard.into(),
            monthly_fee,
            mobile_no: None,
        }
    }

    pub fn with_mobile(mut self, mobile_no: impl Into<String>) -> Self {
        self.mobile_no = Some(mobile_no.into());
        self
    }
}

/// how a fee was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    /// gateway payment confirmed through a signed notification
    Online,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Upi, PaymentMethod::Online];
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("Cash"),
            PaymentMethod::Upi => f.write_str("UPI"),
            PaymentMethod::Online => f.write_str("Online"),
        }
    }
}

/// ledger entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStatus {
    Paid,
    Failed,
}

/// why a record needs a human to look at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewFlag {
    /// payment arrived while no month was due; booked against the next open slot
    NoDueMonth,
}

/// one ledger entry. never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRecord {
    pub record_id: RecordId,
    pub student_id: StudentId,
    pub student_name: String,
    pub standard: String,
    pub month: AcademicMonth,
    /// calendar year the month falls in
    pub year: i32,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: FeeStatus,
    pub date_paid: DateTime<Utc>,
    /// gateway payment id, online payments only
    pub external_payment_id: Option<String>,
    pub review: Option<ReviewFlag>,
}

impl FeeRecord {
    /// paid record for a student's (month, year) slot
    pub fn paid(
        student: &Student,
        month: AcademicMonth,
        year: i32,
        amount: Money,
        method: PaymentMethod,
        date_paid: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            student_id: student.student_id.clone(),
            student_name: student.name.clone(),
            standard: student.standard.clone(),
            month,
            year,
            amount,
            method,
            status: FeeStatus::Paid,
            date_paid,
            external_payment_id: None,
            review: None,
        }
    }

    pub fn with_payment_id(mut self, payment_id: impl Into<String>) -> Self {
        self.external_payment_id = Some(payment_id.into());
        self
    }

    pub fn flagged(mut self, flag: ReviewFlag) -> Self {
        self.review = Some(flag);
        self
    }

    pub fn is_paid(&self) -> bool {
        self.status == FeeStatus::Paid
    }

    pub fn needs_review(&self) -> bool {
        self.review.is_some()
    }

    /// same (month, year) slot
    pub fn occupies(&self, month: AcademicMonth, year: i32) -> bool {
        self.month == month && self.year == year
    }

    pub fn cycle(&self) -> AcademicCycle {
        AcademicCycle::of_slot(self.month, self.year)
    }

    pub fn carries_payment_id(&self, payment_id: &str) -> bool {
        self.external_payment_id.as_deref() == Some(payment_id)
    }
}
