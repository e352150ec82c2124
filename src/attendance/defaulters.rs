use serde::{Deserialize, Serialize};

use super::{summarize, AttendanceDay, AttendanceSummary};
use crate::decimal::Percentage;
use crate::types::{Student, StudentId};

/// a student whose attendance is below the threshold for the period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaulterEntry {
    pub student_id: StudentId,
    pub name: String,
    pub standard: String,
    pub mobile_no: Option<String>,
    pub summary: AttendanceSummary,
}

/// roster students below `threshold` over `days`, lowest percentage first.
///
/// a student with no counted day has 0% and is listed, so a period with no
/// attendance taken for someone shows up rather than hiding them.
pub fn find_defaulters(roster: &[Student], days: &[AttendanceDay], threshold: Percentage) -> Vec<DefaulterEntry> {
    let mut defaulters: Vec<DefaulterEntry> = roster
        .iter()
        .map(|student| (student, summarize(&student.student_id, days)))
        .filter(|(_, summary)| summary.is_defaulter_at(threshold))
        .map(|(student, summary)| DefaulterEntry {
            student_id: student.student_id.clone(),
            name: student.name.clone(),
            standard: student.standard.clone(),
            mobile_no: student.mobile_no.clone(),
            summary,
        })
        .collect();

    defaulters.sort_by(|a, b| {
        a.summary
            .percentage
            .cmp(&b.summary.percentage)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    defaulters
}
