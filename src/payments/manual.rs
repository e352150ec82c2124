use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::AcademicMonth;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{FeeRecord, PaymentMethod, Student, StudentId};

/// a fee taken at the desk (cash or UPI) and entered by staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualFeeEntry {
    pub student_id: StudentId,
    pub month: AcademicMonth,
    /// calendar year the month falls in
    pub year: i32,
    pub amount: Money,
    pub method: PaymentMethod,
    /// defaults to now when absent
    pub date_paid: Option<DateTime<Utc>>,
}

impl ManualFeeEntry {
    pub fn validate(&self) -> Result<()> {
        if self.student_id.is_blank() {
            return Err(LedgerError::InvalidInput {
                message: "student id must not be empty".to_string(),
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
        if self.method == PaymentMethod::Online {
            return Err(LedgerError::InvalidInput {
                message: "online payments are recorded through payment confirmation".to_string(),
            });
        }
        if !(2000..=9999).contains(&self.year) {
            return Err(LedgerError::InvalidDate {
                message: format!("implausible fee year {}", self.year),
            });
        }
        Ok(())
    }

    /// build the ledger record for the validated entry
    pub fn into_record(self, student: &Student, now: DateTime<Utc>) -> Result<FeeRecord> {
        self.validate()?;
        if student.student_id != self.student_id {
            return Err(LedgerError::InvalidInput {
                message: format!(
                    "entry for {} does not match student {}",
                    self.student_id, student.student_id
                ),
            });
        }
        Ok(FeeRecord::paid(
            student,
            self.month,
            self.year,
            self.amount,
            self.method,
            self.date_paid.unwrap_or(now),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> ManualFeeEntry {
        ManualFeeEntry {
            student_id: StudentId::from("S-001"),
            month: AcademicMonth::June,
            year: 2024,
            amount: Money::from_major(500),
            method: PaymentMethod::Cash,
            date_paid: None,
        }
    }

    fn student() -> Student {
        Student::new("S-001", "Asha", "8", Money::from_major(500))
    }

    #[test]
    fn test_entry_becomes_paid_record() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let record = entry().into_record(&student(), now).unwrap();
        assert!(record.is_paid());
        assert_eq!(record.method, PaymentMethod::Cash);
        assert_eq!(record.date_paid, now);
        assert!(record.external_payment_id.is_none());
        assert_eq!(record.standard, "8");
    }

    #[test]
    fn test_explicit_date_is_kept() {
        let paid_on = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut e = entry();
        e.date_paid = Some(paid_on);
        let record = e
            .into_record(&student(), Utc.with_ymd_and_hms(2024, 6, 9, 0, 0, 0).unwrap())
            .unwrap();
        assert_eq!(record.date_paid, paid_on);
    }

    #[test]
    fn test_validation() {
        let mut online = entry();
        online.method = PaymentMethod::Online;
        assert!(online.validate().is_err());

        let mut negative = entry();
        negative.amount = Money::from_major(-10);
        assert!(matches!(negative.validate(), Err(LedgerError::InvalidPaymentAmount { .. })));

        let mut year = entry();
        year.year = 24;
        assert!(matches!(year.validate(), Err(LedgerError::InvalidDate { .. })));

        let mut blank = entry();
        blank.student_id = StudentId::from("");
        assert!(blank.validate().is_err());

        let other = Student::new("S-002", "Ravi", "8", Money::from_major(500));
        assert!(entry().into_record(&other, Utc::now()).is_err());
    }
}
