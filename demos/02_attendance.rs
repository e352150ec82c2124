/// attendance - monthly summaries, defaulters and the register
use std::sync::Arc;

use chrono::NaiveDate;
use tuition_ledger_rs::{
    AttendanceDay, AttendanceMark, DateRange, FeeDesk, LedgerConfig, MemoryAttendance, MemoryLedger, MemoryRoster,
    Money, Student, StudentId,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let roster = MemoryRoster::with_students(vec![
        Student::new("S-001", "Asha", "8", Money::from_major(500)),
        Student::new("S-002", "Ravi", "8", Money::from_major(500)).with_mobile("9800000000"),
    ]);
    let desk = FeeDesk::new(
        LedgerConfig::with_secret("demo_secret"),
        Arc::new(MemoryLedger::new()),
        Arc::new(roster),
        Arc::new(MemoryAttendance::new()),
    )?;

    for day in 2..=13 {
        let Some(date) = NaiveDate::from_ymd_opt(2024, 9, day) else {
            continue;
        };
        let ravi = if day % 3 == 0 { AttendanceMark::Present } else { AttendanceMark::Absent };
        let asha = if day == 7 { AttendanceMark::Holiday } else { AttendanceMark::Present };
        desk.record_attendance(AttendanceDay::new(date).mark("S-001", asha).mark("S-002", ravi))?;
    }

    let september = DateRange::month(2024, 9)?;
    for id in ["S-001", "S-002"] {
        let summary = desk.attendance_summary(&StudentId::from(id), Some(september))?;
        println!(
            "{}: {} present, {} absent, {} holiday -> {}",
            id, summary.present_count, summary.absent_count, summary.holiday_count, summary.percentage
        );
    }

    println!("\ndefaulters for september:");
    for entry in desk.defaulters_for_month(2024, 9)? {
        println!(
            "  {} ({}) {} mobile {}",
            entry.name,
            entry.standard,
            entry.summary.percentage,
            entry.mobile_no.as_deref().unwrap_or("-")
        );
    }

    let register = desk.attendance_register(Some(september))?;
    println!("\n{}", register.to_json_pretty()?);

    Ok(())
}
