/// payment confirmation - signed gateway callbacks, duplicates and forgeries
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tracing_subscriber::EnvFilter;
use tuition_ledger_rs::payments::sign;
use tuition_ledger_rs::{
    FeeDesk, LedgerConfig, MemoryAttendance, MemoryLedger, MemoryRoster, Money, PaymentNotification,
    SafeTimeProvider, Student, StudentId, TimeSource,
};

const SECRET: &str = "demo_secret";

fn notification(payment_id: &str) -> Result<PaymentNotification, Box<dyn std::error::Error>> {
    let order_id = format!("order_{}", payment_id);
    Ok(PaymentNotification {
        signature: sign(&order_id, payment_id, SECRET)?,
        order_id,
        payment_id: payment_id.to_string(),
        amount: Money::from_major(500),
        student_id: StudentId::from("S-001"),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== payment confirmation example ===\n");

    let roster = MemoryRoster::with_students(vec![Student::new("S-001", "Asha", "8", Money::from_major(500))]);
    let mut desk = FeeDesk::new(
        LedgerConfig::with_secret(SECRET),
        Arc::new(MemoryLedger::new()),
        Arc::new(roster),
        Arc::new(MemoryAttendance::new()),
    )?;
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap()));

    let first = notification("pay_DGDMgoq2DjJ9tR")?;
    let decision = desk.confirm_payment(&first, &time)?;
    println!("first callback: {:?}", decision.response());
    if let Some(record) = decision.record() {
        println!("  booked against {} {}", record.month, record.year);
    }

    // gateways retry callbacks; the ledger stays unchanged
    let decision = desk.confirm_payment(&first, &time)?;
    println!("repeated callback: {:?}", decision.response());

    let mut forged = notification("pay_forged")?;
    forged.signature = "0".repeat(64);
    let decision = desk.confirm_payment(&forged, &time)?;
    println!("forged callback: {:?}", decision.response());

    println!("\nevents:");
    for event in desk.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
