pub mod attendance;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod desk;
pub mod errors;
pub mod events;
pub mod payments;
pub mod reports;
pub mod schedule;
pub mod store;
pub mod types;

// re-export key types
pub use attendance::{
    find_defaulters, is_defaulter, student_calendar, summarize, AttendanceDay, AttendanceEntry,
    AttendanceMark, AttendanceRegister, AttendanceSummary, DateRange, DefaulterEntry,
};
pub use calendar::{academic_index_of, academic_year_for, months_elapsed_as_of, AcademicCycle, AcademicMonth};
pub use config::{AllocationConfig, AttendanceConfig, GatewayConfig, LedgerConfig};
pub use decimal::{Money, Percentage};
pub use desk::FeeDesk;
pub use errors::{InsertConflict, LedgerError, Result};
pub use events::{Event, EventStore};
pub use payments::{
    allocate, confirm_payment, Allocation, AllocationMatch, ConfirmationResponse, ManualFeeEntry,
    PaymentDecision, PaymentNotification, VerifiedPayment,
};
pub use reports::{available_years, recent_payments, rollup, FeeRegister, RevenueRollup, StandardTotal};
pub use schedule::{resolve_schedule, FeeSchedule, MonthState, MonthStatus};
pub use store::{AttendanceStore, LedgerStore, MemoryAttendance, MemoryLedger, MemoryRoster, RosterStore};
pub use types::{FeeRecord, FeeStatus, PaymentMethod, RecordId, ReviewFlag, Student, StudentId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
