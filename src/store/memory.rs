use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{AttendanceStore, LedgerStore, RosterStore};
use crate::attendance::{AttendanceDay, DateRange};
use crate::errors::{InsertConflict, LedgerError, Result};
use crate::types::{FeeRecord, Student, StudentId};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| LedgerError::Storage {
        message: format!("{} lock poisoned", what),
    })
}

/// fee ledger held in memory; one lock covers check and insert
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<FeeRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// seed with existing records, applying the same uniqueness rules
    pub fn with_records(records: impl IntoIterator<Item = FeeRecord>) -> Result<Self> {
        let ledger = Self::new();
        for record in records {
            ledger.insert_fee_record(&record)?;
        }
        Ok(ledger)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.records, "ledger")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// first uniqueness rule the record would break, if any
fn conflict_for(existing: &[FeeRecord], record: &FeeRecord) -> Option<InsertConflict> {
    if let Some(payment_id) = record.external_payment_id.as_deref() {
        if existing.iter().any(|r| r.carries_payment_id(payment_id)) {
            return Some(InsertConflict::DuplicatePaymentId {
                payment_id: payment_id.to_string(),
            });
        }
    }

    if record.is_paid()
        && existing.iter().any(|r| {
            r.is_paid() && r.student_id == record.student_id && r.occupies(record.month, record.year)
        })
    {
        return Some(InsertConflict::DuplicateMonth {
            student_id: record.student_id.clone(),
            month: record.month,
            year: record.year,
        });
    }

    None
}

impl LedgerStore for MemoryLedger {
    fn list_fee_records(&self, student_id: &StudentId) -> Result<Vec<FeeRecord>> {
        let records = lock(&self.records, "ledger")?;
        Ok(records
            .iter()
            .filter(|r| &r.student_id == student_id)
            .cloned()
            .collect())
    }

    fn list_all_fee_records(&self) -> Result<Vec<FeeRecord>> {
        Ok(lock(&self.records, "ledger")?.clone())
    }

    fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<FeeRecord>> {
        let records = lock(&self.records, "ledger")?;
        Ok(records.iter().find(|r| r.carries_payment_id(payment_id)).cloned())
    }

    fn insert_fee_record(&self, record: &FeeRecord) -> Result<()> {
        let mut records = lock(&self.records, "ledger")?;
        if let Some(conflict) = conflict_for(&records, record) {
            debug!(record_id = %record.record_id, %conflict, "ledger insert rejected");
            return Err(LedgerError::ConflictOnInsert { conflict });
        }
        records.push(record.clone());
        Ok(())
    }
}

/// roster held in memory, keyed by student id
#[derive(Debug, Default)]
pub struct MemoryRoster {
    students: Mutex<BTreeMap<StudentId, Student>>,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let map = students
            .into_iter()
            .map(|s| (s.student_id.clone(), s))
            .collect();
        Self {
            students: Mutex::new(map),
        }
    }

    /// add or replace a student
    pub fn upsert(&self, student: Student) -> Result<()> {
        lock(&self.students, "roster")?.insert(student.student_id.clone(), student);
        Ok(())
    }
}

impl RosterStore for MemoryRoster {
    fn get_student(&self, student_id: &StudentId) -> Result<Option<Student>> {
        Ok(lock(&self.students, "roster")?.get(student_id).cloned())
    }

    fn list_students(&self) -> Result<Vec<Student>> {
        Ok(lock(&self.students, "roster")?.values().cloned().collect())
    }
}

/// attendance days held in memory, keyed by date
#[derive(Debug, Default)]
pub struct MemoryAttendance {
    days: Mutex<BTreeMap<chrono::NaiveDate, AttendanceDay>>,
}

impl MemoryAttendance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_days(days: impl IntoIterator<Item = AttendanceDay>) -> Self {
        let map = days.into_iter().map(|d| (d.date, d)).collect();
        Self {
            days: Mutex::new(map),
        }
    }
}

impl AttendanceStore for MemoryAttendance {
    fn list_attendance_days(&self, range: Option<DateRange>) -> Result<Vec<AttendanceDay>> {
        let days = lock(&self.days, "attendance")?;
        Ok(days
            .values()
            .filter(|d| range.map_or(true, |r| r.contains(d.date)))
            .cloned()
            .collect())
    }

    fn save_attendance_day(&self, day: AttendanceDay) -> Result<()> {
        lock(&self.days, "attendance")?.insert(day.date, day);
        Ok(())
    }
}
