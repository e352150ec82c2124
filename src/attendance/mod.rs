pub mod defaulters;
pub mod register;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::DEFAULT_DEFAULTER_THRESHOLD;
use crate::decimal::Percentage;
use crate::errors::{LedgerError, Result};
use crate::types::StudentId;

pub use defaulters::{find_defaulters, DefaulterEntry};
pub use register::{AttendanceRegister, RegisterRow};

/// status of one student on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceMark {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
    #[serde(rename = "H")]
    Holiday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub student_id: StudentId,
    pub status: AttendanceMark,
}

/// one calendar day of attendance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceDay {
    pub date: NaiveDate,
    pub records: Vec<AttendanceEntry>,
}

impl AttendanceDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            records: Vec::new(),
        }
    }

    /// append a mark (builder style)
    pub fn mark(mut self, student_id: impl Into<StudentId>, status: AttendanceMark) -> Self {
        self.records.push(AttendanceEntry {
            student_id: student_id.into(),
            status,
        });
        self
    }

    /// the student's mark for the day; the first entry wins if duplicated
    pub fn mark_of(&self, student_id: &StudentId) -> Option<AttendanceMark> {
        self.records
            .iter()
            .find(|r| &r.student_id == student_id)
            .map(|r| r.status)
    }
}

/// inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(LedgerError::InvalidDate {
                message: format!("range end {} is before start {}", end, start),
            });
        }
        Ok(Self { start, end })
    }

    /// the whole calendar month (month is 1..=12)
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| LedgerError::InvalidDate {
            message: format!("invalid month {}-{:02}", year, month),
        })?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| LedgerError::InvalidDate {
                message: format!("invalid month {}-{:02}", year, month),
            })?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn is_single_month(&self) -> bool {
        self.start.year() == self.end.year() && self.start.month() == self.end.month()
    }
}

/// derived attendance totals for one student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub student_id: StudentId,
    pub present_count: u32,
    pub absent_count: u32,
    pub holiday_count: u32,
    /// present + absent; holidays are not counted
    pub total_counted_days: u32,
    pub percentage: Percentage,
}

impl AttendanceSummary {
    pub fn is_defaulter_at(&self, threshold: Percentage) -> bool {
        self.percentage.is_below(threshold)
    }
}

/// fold a student's marks over the given days.
///
/// days with no entry for the student are skipped entirely, as are holidays.
pub fn summarize(student_id: &StudentId, days: &[AttendanceDay]) -> AttendanceSummary {
    let (present, absent, holiday) = days
        .iter()
        .filter_map(|d| d.mark_of(student_id))
        .fold((0u32, 0u32, 0u32), |(p, a, h), mark| match mark {
            AttendanceMark::Present => (p + 1, a, h),
            AttendanceMark::Absent => (p, a + 1, h),
            AttendanceMark::Holiday => (p, a, h + 1),
        });

    AttendanceSummary {
        student_id: student_id.clone(),
        present_count: present,
        absent_count: absent,
        holiday_count: holiday,
        total_counted_days: present + absent,
        percentage: Percentage::from_counts(present, absent),
    }
}

/// below the default 75% threshold
pub fn is_defaulter(percentage: Percentage) -> bool {
    percentage.is_below(Percentage::from_whole(DEFAULT_DEFAULTER_THRESHOLD))
}

/// date -> mark for one student, the data behind a calendar view
pub fn student_calendar(student_id: &StudentId, days: &[AttendanceDay]) -> BTreeMap<NaiveDate, AttendanceMark> {
    days.iter()
        .filter_map(|d| d.mark_of(student_id).map(|m| (d.date, m)))
        .collect()
}
