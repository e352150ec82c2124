use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{months_elapsed_as_of, AcademicCycle, AcademicMonth};
use crate::decimal::Money;
use crate::types::{FeeRecord, RecordId, Student, StudentId};

/// status of one month of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthState {
    Paid,
    Due,
    NotYetDue,
}

/// derived status of one (month, year) slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStatus {
    pub month: AcademicMonth,
    pub year: i32,
    /// recorded amount when paid, the monthly fee otherwise
    pub amount: Money,
    pub status: MonthState,
    pub date_paid: Option<DateTime<Utc>>,
    pub record_id: Option<RecordId>,
}

impl MonthStatus {
    pub fn is_due(&self) -> bool {
        self.status == MonthState::Due
    }

    pub fn is_paid(&self) -> bool {
        self.status == MonthState::Paid
    }
}

/// twelve month status table for one student and one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub student_id: StudentId,
    pub cycle: AcademicCycle,
    pub months: Vec<MonthStatus>,
    pub total_outstanding: Money,
}

impl FeeSchedule {
    /// earliest due month in academic order
    pub fn first_due(&self) -> Option<&MonthStatus> {
        self.months.iter().find(|m| m.is_due())
    }

    pub fn due_months(&self) -> impl Iterator<Item = &MonthStatus> {
        self.months.iter().filter(|m| m.is_due())
    }

    pub fn count(&self, state: MonthState) -> usize {
        self.months.iter().filter(|m| m.status == state).count()
    }

    pub fn total_paid(&self) -> Money {
        self.months.iter().filter(|m| m.is_paid()).map(|m| m.amount).sum()
    }

    pub fn status_of(&self, month: AcademicMonth) -> Option<&MonthStatus> {
        self.months.iter().find(|m| m.month == month)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// resolve the schedule of the cycle containing `now`. recomputed on every
/// call, never stored.
///
/// ledger entries of other students and non-paid entries are ignored, so the
/// caller may pass an unfiltered ledger.
pub fn resolve_schedule(student: &Student, ledger: &[FeeRecord], now: DateTime<Utc>) -> FeeSchedule {
    let today = now.date_naive();
    let cycle = AcademicCycle::containing(today);
    let elapsed = months_elapsed_as_of(today);

    let months: Vec<MonthStatus> = cycle
        .slots()
        .map(|(month, year)| {
            let paid = ledger.iter().find(|r| {
                r.is_paid() && r.student_id == student.student_id && r.occupies(month, year)
            });

            match paid {
                Some(record) => MonthStatus {
                    month,
                    year,
                    amount: record.amount,
                    status: MonthState::Paid,
                    date_paid: Some(record.date_paid),
                    record_id: Some(record.record_id),
                },
                None => MonthStatus {
                    month,
                    year,
                    amount: student.monthly_fee,
                    status: if month.academic_index() < elapsed {
                        MonthState::Due
                    } else {
                        MonthState::NotYetDue
                    },
                    date_paid: None,
                    record_id: None,
                },
            }
        })
        .collect();

    let due = months.iter().filter(|m| m.is_due()).count();

    FeeSchedule {
        student_id: student.student_id.clone(),
        cycle,
        months,
        total_outstanding: student.monthly_fee.times(due),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeeStatus, PaymentMethod};
    use chrono::TimeZone;

    fn student() -> Student {
        Student::new("S-001", "Asha", "8", Money::from_major(500))
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn paid(month: AcademicMonth, year: i32) -> FeeRecord {
        FeeRecord::paid(&student(), month, year, Money::from_major(500), PaymentMethod::Cash, at(2024, 6, 1))
    }

    #[test]
    fn test_july_with_empty_ledger() {
        let schedule = resolve_schedule(&student(), &[], at(2024, 7, 10));

        assert_eq!(schedule.months.len(), 12);
        assert_eq!(schedule.cycle, AcademicCycle::starting(2024));
        for (i, status) in schedule.months.iter().enumerate() {
            if i < 3 {
                assert_eq!(status.status, MonthState::Due, "{}", status.month);
            } else {
                assert_eq!(status.status, MonthState::NotYetDue, "{}", status.month);
            }
            assert_eq!(status.amount, Money::from_major(500));
        }
        assert_eq!(schedule.total_outstanding, Money::from_major(1500));
        assert_eq!(schedule.first_due().unwrap().month, AcademicMonth::May);
    }

    #[test]
    fn test_paid_month_uses_recorded_amount() {
        let mut record = paid(AcademicMonth::June, 2024);
        record.amount = Money::from_major(450);
        let schedule = resolve_schedule(&student(), &[record.clone()], at(2024, 7, 10));

        let june = schedule.status_of(AcademicMonth::June).unwrap();
        assert_eq!(june.status, MonthState::Paid);
        assert_eq!(june.amount, Money::from_major(450));
        assert_eq!(june.record_id, Some(record.record_id));
        assert_eq!(schedule.total_outstanding, Money::from_major(1000));
        assert_eq!(schedule.total_paid(), Money::from_major(450));
    }

    #[test]
    fn test_year_must_match_the_cycle() {
        // january 2024 belongs to the previous cycle
        let stale = paid(AcademicMonth::January, 2024);
        let schedule = resolve_schedule(&student(), &[stale], at(2025, 2, 1));

        let january = schedule.status_of(AcademicMonth::January).unwrap();
        assert_eq!(january.year, 2025);
        assert_eq!(january.status, MonthState::Due);
        assert_eq!(schedule.count(MonthState::Due), 10);
    }

    #[test]
    fn test_failed_and_foreign_records_are_ignored() {
        let mut failed = paid(AcademicMonth::May, 2024);
        failed.status = FeeStatus::Failed;

        let other = Student::new("S-002", "Ravi", "8", Money::from_major(500));
        let foreign = FeeRecord::paid(&other, AcademicMonth::June, 2024, Money::from_major(500), PaymentMethod::Upi, at(2024, 6, 2));

        let schedule = resolve_schedule(&student(), &[failed, foreign], at(2024, 6, 20));
        assert_eq!(schedule.count(MonthState::Due), 2);
        assert_eq!(schedule.count(MonthState::Paid), 0);
    }

    #[test]
    fn test_monotonic_in_time() {
        let ledger = vec![paid(AcademicMonth::June, 2024)];
        let mut previous_due = 0;
        let mut previous_paid = 0;

        let mut day = at(2024, 5, 1);
        while day < at(2025, 4, 30) {
            let schedule = resolve_schedule(&student(), &ledger, day);
            let due = schedule.count(MonthState::Due);
            let paid = schedule.count(MonthState::Paid);
            assert!(due >= previous_due);
            assert_eq!(paid, 1);
            assert!(paid >= previous_paid);
            previous_due = due;
            previous_paid = paid;
            day = day + chrono::Duration::days(7);
        }
        assert_eq!(previous_due, 11);
    }

    #[test]
    fn test_deterministic() {
        let ledger = vec![paid(AcademicMonth::May, 2024)];
        let a = resolve_schedule(&student(), &ledger, at(2024, 9, 1));
        let b = resolve_schedule(&student(), &ledger, at(2024, 9, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_fee_student_owes_nothing() {
        let free = Student::new("S-003", "Meera", "5", Money::ZERO);
        let schedule = resolve_schedule(&free, &[], at(2025, 3, 1));
        assert_eq!(schedule.count(MonthState::Due), 11);
        assert_eq!(schedule.total_outstanding, Money::ZERO);
    }
}
