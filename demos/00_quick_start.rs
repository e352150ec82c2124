/// quick start - a student's fee schedule before and after a desk payment
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tuition_ledger_rs::{
    AcademicMonth, FeeDesk, LedgerConfig, ManualFeeEntry, MemoryAttendance, MemoryLedger, MemoryRoster, Money,
    PaymentMethod, SafeTimeProvider, Student, StudentId, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let roster = MemoryRoster::with_students(vec![Student::new("S-001", "Asha", "8", Money::from_major(500))]);
    let mut desk = FeeDesk::new(
        LedgerConfig::with_secret("demo_secret"),
        Arc::new(MemoryLedger::new()),
        Arc::new(roster),
        Arc::new(MemoryAttendance::new()),
    )?;

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap()));
    let asha = StudentId::from("S-001");

    let schedule = desk.fee_schedule(&asha, &time)?;
    println!("outstanding on {}: {}", time.now().format("%Y-%m-%d"), schedule.total_outstanding);

    // cash for may at the desk
    desk.record_manual_fee(
        ManualFeeEntry {
            student_id: asha.clone(),
            month: AcademicMonth::May,
            year: 2024,
            amount: Money::from_major(500),
            method: PaymentMethod::Cash,
            date_paid: None,
        },
        &time,
    )?;

    let schedule = desk.fee_schedule(&asha, &time)?;
    println!("{}", schedule.to_json_pretty()?);

    Ok(())
}
