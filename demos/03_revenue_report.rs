/// revenue report - cycle rollup and fee register across a year
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tuition_ledger_rs::payments::sign;
use tuition_ledger_rs::{
    AcademicCycle, AcademicMonth, FeeDesk, LedgerConfig, ManualFeeEntry, MemoryAttendance, MemoryLedger,
    MemoryRoster, Money, PaymentMethod, PaymentNotification, SafeTimeProvider, Student, StudentId, TimeSource,
};

const SECRET: &str = "demo_secret";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== revenue report example ===\n");

    let roster = MemoryRoster::with_students(vec![
        Student::new("S-001", "Asha", "8", Money::from_major(500)),
        Student::new("S-002", "Ravi", "9", Money::from_major(650)),
    ]);
    let mut desk = FeeDesk::new(
        LedgerConfig::with_secret(SECRET),
        Arc::new(MemoryLedger::new()),
        Arc::new(roster),
        Arc::new(MemoryAttendance::new()),
    )?;

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap()));
    let controller = time.test_control().unwrap();

    // asha pays online each month, ravi pays cash at the desk every other month
    for step in 0..10 {
        let payment_id = format!("pay_{:03}", step);
        let order_id = format!("order_{:03}", step);
        let notification = PaymentNotification {
            signature: sign(&order_id, &payment_id, SECRET)?,
            order_id,
            payment_id,
            amount: Money::from_major(500),
            student_id: StudentId::from("S-001"),
        };
        desk.confirm_payment(&notification, &time)?;

        if step % 2 == 0 {
            let today = time.now().date_naive();
            let cycle = AcademicCycle::containing(today);
            let month = AcademicMonth::of_date(today);
            desk.record_manual_fee(
                ManualFeeEntry {
                    student_id: StudentId::from("S-002"),
                    month,
                    year: cycle.year_of(month),
                    amount: Money::from_major(650),
                    method: PaymentMethod::Upi,
                    date_paid: None,
                },
                &time,
            )?;
        }

        controller.advance(Duration::days(30));
    }

    let rollup = desk.revenue_rollup(2024)?;
    println!("cycle {}", rollup.cycle);
    for (month, total) in &rollup.monthly_totals {
        println!("  {:<10} {}", month.name(), total);
    }
    println!("grand total {} over {} payments", rollup.grand_total, rollup.payment_count);
    println!("average per payment {}", rollup.average_per_payment);
    if let Some((month, total)) = rollup.best_month() {
        println!("best month {} ({})", month, total);
    }

    let register = desk.fee_register(AcademicCycle::starting(2024))?;
    for row in &register.rows {
        println!(
            "{} ({}): paid {} of {}, balance {}",
            row.name, row.standard, row.total_paid, row.total_due, row.balance
        );
    }

    println!("\nrecent payments:");
    for record in desk.recent_payments(3)? {
        println!("  {} {} {} {} via {}", record.student_name, record.month, record.year, record.amount, record.method);
    }

    Ok(())
}
