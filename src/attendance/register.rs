use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{student_calendar, summarize, AttendanceDay, AttendanceMark, AttendanceSummary};
use crate::types::{Student, StudentId};

/// one student's row of the register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRow {
    pub student_id: StudentId,
    pub name: String,
    pub marks: BTreeMap<NaiveDate, AttendanceMark>,
    pub summary: AttendanceSummary,
}

impl RegisterRow {
    pub fn mark_on(&self, date: NaiveDate) -> Option<AttendanceMark> {
        self.marks.get(&date).copied()
    }
}

/// date x student attendance matrix for a roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRegister {
    /// every date with an attendance day, ascending
    pub dates: Vec<NaiveDate>,
    /// one row per roster student, in roster order
    pub rows: Vec<RegisterRow>,
}

impl AttendanceRegister {
    /// entries for students missing from the roster are left out
    pub fn build(roster: &[Student], days: &[AttendanceDay]) -> Self {
        let dates: BTreeSet<NaiveDate> = days.iter().map(|d| d.date).collect();

        let rows = roster
            .iter()
            .map(|student| RegisterRow {
                student_id: student.student_id.clone(),
                name: student.name.clone(),
                marks: student_calendar(&student.student_id, days),
                summary: summarize(&student.student_id, days),
            })
            .collect();

        Self {
            dates: dates.into_iter().collect(),
            rows,
        }
    }

    pub fn row(&self, student_id: &StudentId) -> Option<&RegisterRow> {
        self.rows.iter().find(|r| &r.student_id == student_id)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
