pub mod fee_register;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::calendar::{AcademicCycle, AcademicMonth};
use crate::decimal::Money;
use crate::types::{FeeRecord, PaymentMethod};

pub use fee_register::{FeeRegister, FeeRegisterRow, MonthEntry};

/// total and payment count for one class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StandardTotal {
    pub total: Money,
    pub count: usize,
}

/// revenue of one academic cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRollup {
    pub cycle: AcademicCycle,
    /// every month of the cycle, zero when nothing was paid
    pub monthly_totals: BTreeMap<AcademicMonth, Money>,
    pub per_standard_totals: BTreeMap<String, StandardTotal>,
    /// every payment method, zero when unused
    pub per_method_counts: BTreeMap<PaymentMethod, usize>,
    pub grand_total: Money,
    pub average_per_payment: Money,
    pub payment_count: usize,
}

impl RevenueRollup {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// month with the highest takings, earliest wins a tie
    pub fn best_month(&self) -> Option<(AcademicMonth, Money)> {
        self.monthly_totals
            .iter()
            .filter(|(_, total)| total.is_positive())
            .fold(None, |best: Option<(AcademicMonth, Money)>, (month, total)| match best {
                Some((_, top)) if top >= *total => best,
                _ => Some((*month, *total)),
            })
    }
}

/// fold the paid records of the cycle starting in `selected_year`
/// (May..Dec of that year, Jan..Apr of the next). a record listed twice is
/// counted once; empty input gives an all zero rollup.
pub fn rollup(records: &[FeeRecord], selected_year: i32) -> RevenueRollup {
    let cycle = AcademicCycle::starting(selected_year);

    let mut monthly_totals: BTreeMap<AcademicMonth, Money> =
        AcademicMonth::ALL.iter().map(|m| (*m, Money::ZERO)).collect();
    let mut per_method_counts: BTreeMap<PaymentMethod, usize> =
        PaymentMethod::ALL.iter().map(|m| (*m, 0)).collect();
    let mut per_standard_totals: BTreeMap<String, StandardTotal> = BTreeMap::new();
    let mut grand_total = Money::ZERO;
    let mut payment_count = 0;

    let mut seen = HashSet::new();
    for record in records {
        if !record.is_paid() || !cycle.contains(record.month, record.year) {
            continue;
        }
        if !seen.insert(record.record_id) {
            continue;
        }

        *monthly_totals.entry(record.month).or_insert(Money::ZERO) += record.amount;
        *per_method_counts.entry(record.method).or_insert(0) += 1;
        let standard = per_standard_totals.entry(record.standard.clone()).or_default();
        standard.total += record.amount;
        standard.count += 1;
        grand_total += record.amount;
        payment_count += 1;
    }

    RevenueRollup {
        cycle,
        monthly_totals,
        per_standard_totals,
        per_method_counts,
        grand_total,
        average_per_payment: grand_total.average_over(payment_count),
        payment_count,
    }
}

/// paid records, newest first
pub fn recent_payments(records: &[FeeRecord], limit: usize) -> Vec<FeeRecord> {
    let mut paid: Vec<&FeeRecord> = records.iter().filter(|r| r.is_paid()).collect();
    paid.sort_by(|a, b| b.date_paid.cmp(&a.date_paid));
    paid.into_iter().take(limit).cloned().collect()
}

/// distinct cycles that hold at least one record, newest first
pub fn available_years(records: &[FeeRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().map(|r| r.cycle().start_year).collect();
    years.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeeStatus, Student};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn record(student: &Student, month: AcademicMonth, year: i32, method: PaymentMethod) -> FeeRecord {
        FeeRecord::paid(student, month, year, student.monthly_fee, method, at(year, 6, 1))
    }

    fn students() -> (Student, Student) {
        (
            Student::new("S-001", "Asha", "8", Money::from_major(500)),
            Student::new("S-002", "Ravi", "9", Money::from_major(700)),
        )
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let rollup = rollup(&[], 2024);
        assert_eq!(rollup.monthly_totals.len(), 12);
        assert!(rollup.monthly_totals.values().all(|m| m.is_zero()));
        assert_eq!(rollup.per_method_counts.len(), 3);
        assert!(rollup.per_method_counts.values().all(|c| *c == 0));
        assert!(rollup.per_standard_totals.is_empty());
        assert_eq!(rollup.grand_total, Money::ZERO);
        assert_eq!(rollup.average_per_payment, Money::ZERO);
        assert_eq!(rollup.best_month(), None);
    }

    #[test]
    fn test_rollup_over_cycle() {
        let (asha, ravi) = students();
        let records = vec![
            record(&asha, AcademicMonth::May, 2024, PaymentMethod::Cash),
            record(&asha, AcademicMonth::June, 2024, PaymentMethod::Online),
            record(&ravi, AcademicMonth::May, 2024, PaymentMethod::Upi),
            // january of the same cycle carries the next calendar year
            record(&ravi, AcademicMonth::January, 2025, PaymentMethod::Online),
            // previous and next cycles
            record(&asha, AcademicMonth::January, 2024, PaymentMethod::Cash),
            record(&asha, AcademicMonth::May, 2025, PaymentMethod::Cash),
        ];

        let rollup = rollup(&records, 2024);
        assert_eq!(rollup.cycle.label(), "2024-25");
        assert_eq!(rollup.payment_count, 4);
        assert_eq!(rollup.grand_total, Money::from_major(2400));
        assert_eq!(rollup.average_per_payment, Money::from_major(600));
        assert_eq!(rollup.monthly_totals[&AcademicMonth::May], Money::from_major(1200));
        assert_eq!(rollup.monthly_totals[&AcademicMonth::January], Money::from_major(700));
        assert_eq!(rollup.monthly_totals[&AcademicMonth::April], Money::ZERO);
        assert_eq!(rollup.per_method_counts[&PaymentMethod::Online], 2);
        assert_eq!(rollup.per_method_counts[&PaymentMethod::Cash], 1);
        assert_eq!(
            rollup.per_standard_totals["9"],
            StandardTotal {
                total: Money::from_major(1400),
                count: 2
            }
        );
        assert_eq!(rollup.best_month(), Some((AcademicMonth::May, Money::from_major(1200))));
    }

    #[test]
    fn test_no_double_counting_and_paid_only() {
        let (asha, _) = students();
        let paid = record(&asha, AcademicMonth::July, 2024, PaymentMethod::Cash);
        let mut failed = record(&asha, AcademicMonth::August, 2024, PaymentMethod::Online);
        failed.status = FeeStatus::Failed;

        let rollup = rollup(&[paid.clone(), paid, failed], 2024);
        assert_eq!(rollup.payment_count, 1);
        assert_eq!(rollup.grand_total, Money::from_major(500));
        assert_eq!(rollup.monthly_totals[&AcademicMonth::August], Money::ZERO);
    }

    #[test]
    fn test_average_rounds_to_paise() {
        let (asha, _) = students();
        let mut records = Vec::new();
        for (month, amount) in [(AcademicMonth::May, 100), (AcademicMonth::June, 100), (AcademicMonth::July, 101)] {
            let mut r = record(&asha, month, 2024, PaymentMethod::Cash);
            r.amount = Money::from_major(amount);
            records.push(r);
        }
        assert_eq!(rollup(&records, 2024).average_per_payment, Money::from_str_exact("100.33").unwrap());
    }

    #[test]
    fn test_recent_payments_newest_first() {
        let (asha, ravi) = students();
        let mut old = record(&asha, AcademicMonth::May, 2024, PaymentMethod::Cash);
        old.date_paid = at(2024, 5, 3);
        let mut new = record(&ravi, AcademicMonth::May, 2024, PaymentMethod::Upi);
        new.date_paid = at(2024, 6, 9);
        let mut failed = record(&ravi, AcademicMonth::June, 2024, PaymentMethod::Online);
        failed.status = FeeStatus::Failed;
        failed.date_paid = at(2024, 7, 1);

        let recent = recent_payments(&[old.clone(), new.clone(), failed], 5);
        assert_eq!(recent, vec![new.clone(), old]);
        assert!(recent_payments(&[new], 0).is_empty());
    }

    #[test]
    fn test_available_years_descending() {
        let (asha, _) = students();
        let records = vec![
            record(&asha, AcademicMonth::May, 2023, PaymentMethod::Cash),
            record(&asha, AcademicMonth::February, 2025, PaymentMethod::Cash),
            record(&asha, AcademicMonth::June, 2024, PaymentMethod::Cash),
        ];
        assert_eq!(available_years(&records), vec![2024, 2023]);
        assert!(available_years(&[]).is_empty());
    }
}
