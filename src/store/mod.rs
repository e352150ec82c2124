pub mod memory;

use crate::attendance::{AttendanceDay, DateRange};
use crate::errors::Result;
use crate::types::{FeeRecord, Student, StudentId};

pub use memory::{MemoryAttendance, MemoryLedger, MemoryRoster};

/// fee ledger storage.
///
/// owns the two uniqueness rules: at most one paid record per
/// (student, month, year) and at most one record per external payment id.
/// both are checked and applied atomically; a conflicting insert is rejected
/// with [`crate::errors::LedgerError::ConflictOnInsert`], never overwritten.
pub trait LedgerStore: Send + Sync {
    /// records of one student, in insertion order
    fn list_fee_records(&self, student_id: &StudentId) -> Result<Vec<FeeRecord>>;

    /// every record, in insertion order
    fn list_all_fee_records(&self) -> Result<Vec<FeeRecord>>;

    fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<FeeRecord>>;

    /// insert one record, enforcing both uniqueness rules atomically
    fn insert_fee_record(&self, record: &FeeRecord) -> Result<()>;
}

/// student roster, read-only to the ledger
pub trait RosterStore: Send + Sync {
    fn get_student(&self, student_id: &StudentId) -> Result<Option<Student>>;

    /// every student, ordered by student id
    fn list_students(&self) -> Result<Vec<Student>>;
}

/// daily attendance storage
pub trait AttendanceStore: Send + Sync {
    /// days in the range (all days when `None`), ordered by date
    fn list_attendance_days(&self, range: Option<DateRange>) -> Result<Vec<AttendanceDay>>;

    /// create or replace the day with the same date
    fn save_attendance_day(&self, day: AttendanceDay) -> Result<()>;
}
