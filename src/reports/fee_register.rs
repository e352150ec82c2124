use serde::{Deserialize, Serialize};

use crate::calendar::{AcademicCycle, AcademicMonth};
use crate::decimal::Money;
use crate::types::{FeeRecord, Student, StudentId};

/// one cell of the register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MonthEntry {
    Paid { record: FeeRecord },
    Unpaid,
}

impl MonthEntry {
    pub fn is_paid(&self) -> bool {
        matches!(self, MonthEntry::Paid { .. })
    }
}

/// one student across the twelve months of a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRegisterRow {
    pub student_id: StudentId,
    pub name: String,
    pub standard: String,
    pub months: Vec<(AcademicMonth, i32, MonthEntry)>,
    pub total_paid: Money,
    /// monthly fee for the full cycle
    pub total_due: Money,
    /// what is left of `total_due`; negative when overpaid
    pub balance: Money,
}

impl FeeRegisterRow {
    pub fn entry(&self, month: AcademicMonth) -> Option<&MonthEntry> {
        self.months.iter().find(|(m, _, _)| *m == month).map(|(_, _, e)| e)
    }

    pub fn unpaid_months(&self) -> usize {
        self.months.iter().filter(|(_, _, e)| !e.is_paid()).count()
    }
}

/// student x month fee matrix for a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRegister {
    pub cycle: AcademicCycle,
    pub rows: Vec<FeeRegisterRow>,
}

impl FeeRegister {
    /// one row per roster student; unlike the schedule, months that have not
    /// arrived yet are just unpaid here
    pub fn build(roster: &[Student], records: &[FeeRecord], cycle: AcademicCycle) -> Self {
        let rows = roster
            .iter()
            .map(|student| {
                let months: Vec<(AcademicMonth, i32, MonthEntry)> = cycle
                    .slots()
                    .map(|(month, year)| {
                        let entry = records
                            .iter()
                            .find(|r| r.is_paid() && r.student_id == student.student_id && r.occupies(month, year))
                            .map(|r| MonthEntry::Paid { record: r.clone() })
                            .unwrap_or(MonthEntry::Unpaid);
                        (month, year, entry)
                    })
                    .collect();

                let total_paid: Money = months
                    .iter()
                    .filter_map(|(_, _, e)| match e {
                        MonthEntry::Paid { record } => Some(record.amount),
                        MonthEntry::Unpaid => None,
                    })
                    .sum();
                let total_due = student.monthly_fee.times(AcademicMonth::ALL.len());

                FeeRegisterRow {
                    student_id: student.student_id.clone(),
                    name: student.name.clone(),
                    standard: student.standard.clone(),
                    months,
                    total_paid,
                    total_due,
                    balance: total_due - total_paid,
                }
            })
            .collect();

        Self { cycle, rows }
    }

    pub fn row(&self, student_id: &StudentId) -> Option<&FeeRegisterRow> {
        self.rows.iter().find(|r| &r.student_id == student_id)
    }

    pub fn total_collected(&self) -> Money {
        self.rows.iter().map(|r| r.total_paid).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{TimeZone, Utc};

    fn paid(student: &Student, month: AcademicMonth, year: i32) -> FeeRecord {
        let when = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        FeeRecord::paid(student, month, year, student.monthly_fee, PaymentMethod::Cash, when)
    }

    #[test]
    fn test_register_totals() {
        let asha = Student::new("S-001", "Asha", "8", Money::from_major(500));
        let ravi = Student::new("S-002", "Ravi", "8", Money::from_major(400));
        let records = vec![
            paid(&asha, AcademicMonth::May, 2024),
            paid(&asha, AcademicMonth::February, 2025),
            // february of the previous cycle
            paid(&asha, AcademicMonth::February, 2024),
        ];

        let register = FeeRegister::build(&[asha.clone(), ravi], &records, AcademicCycle::starting(2024));
        assert_eq!(register.rows.len(), 2);

        let row = register.row(&asha.student_id).unwrap();
        assert_eq!(row.months.len(), 12);
        assert!(row.entry(AcademicMonth::May).unwrap().is_paid());
        assert!(row.entry(AcademicMonth::February).unwrap().is_paid());
        assert!(!row.entry(AcademicMonth::June).unwrap().is_paid());
        assert_eq!(row.unpaid_months(), 10);
        assert_eq!(row.total_paid, Money::from_major(1000));
        assert_eq!(row.total_due, Money::from_major(6000));
        assert_eq!(row.balance, Money::from_major(5000));

        let ravi_row = register.row(&StudentId::from("S-002")).unwrap();
        assert_eq!(ravi_row.total_paid, Money::ZERO);
        assert_eq!(ravi_row.balance, Money::from_major(4800));
        assert_eq!(register.total_collected(), Money::from_major(1000));
    }

    #[test]
    fn test_register_serializes() {
        let asha = Student::new("S-001", "Asha", "8", Money::from_major(500));
        let register = FeeRegister::build(
            &[asha.clone()],
            &[paid(&asha, AcademicMonth::May, 2024)],
            AcademicCycle::starting(2024),
        );
        let json = register.to_json_pretty().unwrap();
        assert!(json.contains("\"state\": \"paid\""));
        assert!(json.contains("\"state\": \"unpaid\""));
    }
}
