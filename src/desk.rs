use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::info;

use crate::attendance::{
    find_defaulters, student_calendar, summarize, AttendanceDay, AttendanceMark, AttendanceRegister,
    AttendanceSummary, DateRange, DefaulterEntry,
};
use crate::calendar::AcademicCycle;
use crate::config::LedgerConfig;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::payments::{confirm_payment, ManualFeeEntry, PaymentDecision, PaymentNotification};
use crate::reports::{self, FeeRegister, RevenueRollup};
use crate::schedule::{resolve_schedule, FeeSchedule};
use crate::store::{AttendanceStore, LedgerStore, RosterStore};
use crate::types::{FeeRecord, Student, StudentId};

/// the fee and attendance desk of one institution, wired to its stores
pub struct FeeDesk {
    pub config: LedgerConfig,
    pub events: EventStore,
    ledger: Arc<dyn LedgerStore>,
    roster: Arc<dyn RosterStore>,
    attendance: Arc<dyn AttendanceStore>,
}

impl FeeDesk {
    /// fails on an invalid configuration
    pub fn new(
        config: LedgerConfig,
        ledger: Arc<dyn LedgerStore>,
        roster: Arc<dyn RosterStore>,
        attendance: Arc<dyn AttendanceStore>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            events: EventStore::new(),
            ledger,
            roster,
            attendance,
        })
    }

    fn student(&self, student_id: &StudentId) -> Result<Student> {
        self.roster
            .get_student(student_id)?
            .ok_or_else(|| LedgerError::StudentNotFound {
                student_id: student_id.clone(),
            })
    }

    // fees

    /// month-by-month status of the student's current cycle
    pub fn fee_schedule(&self, student_id: &StudentId, time_provider: &SafeTimeProvider) -> Result<FeeSchedule> {
        let student = self.student(student_id)?;
        let records = self.ledger.list_fee_records(student_id)?;
        Ok(resolve_schedule(&student, &records, time_provider.now()))
    }

    /// verify and book a gateway payment confirmation
    pub fn confirm_payment(
        &mut self,
        notification: &PaymentNotification,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentDecision> {
        confirm_payment(
            &*self.ledger,
            &*self.roster,
            &self.config,
            notification,
            time_provider,
            &mut self.events,
        )
    }

    /// book a cash or UPI fee taken at the desk. a month already paid is
    /// refused with `ConflictOnInsert`.
    pub fn record_manual_fee(&mut self, entry: ManualFeeEntry, time_provider: &SafeTimeProvider) -> Result<FeeRecord> {
        let now = time_provider.now();
        entry.validate()?;
        let student = self.student(&entry.student_id)?;
        let record = entry.into_record(&student, now)?;

        self.ledger.insert_fee_record(&record)?;

        info!(
            student_id = %record.student_id,
            month = %record.month,
            year = record.year,
            amount = %record.amount,
            method = %record.method,
            "manual fee recorded"
        );
        self.events.emit(Event::ManualFeeRecorded {
            record_id: record.record_id,
            student_id: record.student_id.clone(),
            month: record.month,
            year: record.year,
            amount: record.amount,
            method: record.method,
            timestamp: now,
        });
        Ok(record)
    }

    pub fn fee_records(&self, student_id: &StudentId) -> Result<Vec<FeeRecord>> {
        self.ledger.list_fee_records(student_id)
    }

    /// paid records of every student that carry a review flag
    pub fn flagged_records(&self) -> Result<Vec<FeeRecord>> {
        Ok(self
            .ledger
            .list_all_fee_records()?
            .into_iter()
            .filter(|r| r.needs_review())
            .collect())
    }

    // reports

    pub fn revenue_rollup(&self, selected_year: i32) -> Result<RevenueRollup> {
        Ok(reports::rollup(&self.ledger.list_all_fee_records()?, selected_year))
    }

    pub fn fee_register(&self, cycle: AcademicCycle) -> Result<FeeRegister> {
        let roster = self.roster.list_students()?;
        let records = self.ledger.list_all_fee_records()?;
        Ok(FeeRegister::build(&roster, &records, cycle))
    }

    pub fn recent_payments(&self, limit: usize) -> Result<Vec<FeeRecord>> {
        Ok(reports::recent_payments(&self.ledger.list_all_fee_records()?, limit))
    }

    pub fn available_years(&self) -> Result<Vec<i32>> {
        Ok(reports::available_years(&self.ledger.list_all_fee_records()?))
    }

    // attendance

    /// create or replace the day's attendance
    pub fn record_attendance(&self, day: AttendanceDay) -> Result<()> {
        info!(date = %day.date, entries = day.records.len(), "attendance saved");
        self.attendance.save_attendance_day(day)
    }

    pub fn attendance_summary(&self, student_id: &StudentId, range: Option<DateRange>) -> Result<AttendanceSummary> {
        let days = self.attendance.list_attendance_days(range)?;
        Ok(summarize(student_id, &days))
    }

    pub fn attendance_calendar(
        &self,
        student_id: &StudentId,
        range: Option<DateRange>,
    ) -> Result<BTreeMap<NaiveDate, AttendanceMark>> {
        let days = self.attendance.list_attendance_days(range)?;
        Ok(student_calendar(student_id, &days))
    }

    /// students below the configured threshold for a calendar month
    pub fn defaulters_for_month(&self, year: i32, month: u32) -> Result<Vec<DefaulterEntry>> {
        let range = DateRange::month(year, month)?;
        let days = self.attendance.list_attendance_days(Some(range))?;
        let roster = self.roster.list_students()?;
        Ok(find_defaulters(&roster, &days, self.config.attendance.defaulter_threshold))
    }

    pub fn attendance_register(&self, range: Option<DateRange>) -> Result<AttendanceRegister> {
        let days = self.attendance.list_attendance_days(range)?;
        let roster = self.roster.list_students()?;
        Ok(AttendanceRegister::build(&roster, &days))
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
