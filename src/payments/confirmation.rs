use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info, warn};

use super::{allocate, verify, AllocationMatch, PaymentDecision, PaymentNotification};
use crate::config::LedgerConfig;
use crate::errors::{InsertConflict, LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::store::{LedgerStore, RosterStore};

/// verify a gateway confirmation and book it on the student's ledger.
///
/// untrusted or malformed input comes back as `Ok(Rejected)` with nothing
/// written. a verified payment id already in the ledger is
/// `Ok(AlreadyRecorded)`, whatever the roster now says.
/// when the insert keeps losing a race for the chosen month after
/// `conflict_retries` re-reads, the verified record is handed back as
/// `ManualReviewRequired` instead of being dropped. only storage failures
/// surface as `Err`.
pub fn confirm_payment<L, R>(
    ledger: &L,
    roster: &R,
    config: &LedgerConfig,
    notification: &PaymentNotification,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<PaymentDecision>
where
    L: LedgerStore + ?Sized,
    R: RosterStore + ?Sized,
{
    let now = time_provider.now();

    if let Err(error) = notification.validate() {
        return Ok(reject(notification, error, events, now));
    }

    if !verify(
        &notification.order_id,
        &notification.payment_id,
        &notification.signature,
        &config.gateway.key_secret,
    ) {
        let error = LedgerError::VerificationFailed {
            order_id: notification.order_id.clone(),
            payment_id: notification.payment_id.clone(),
        };
        return Ok(reject(notification, error, events, now));
    }

    events.emit(Event::PaymentVerified {
        order_id: notification.order_id.clone(),
        payment_id: notification.payment_id.clone(),
        student_id: notification.student_id.clone(),
        timestamp: now,
    });

    // payment ids are unique across the whole ledger, and a repeat stays a
    // no-op even once the student is off the roster
    if ledger.find_by_payment_id(&notification.payment_id)?.is_some() {
        return Ok(already_recorded(notification, events, now));
    }

    let Some(student) = roster.get_student(&notification.student_id)? else {
        let error = LedgerError::StudentNotFound {
            student_id: notification.student_id.clone(),
        };
        return Ok(reject(notification, error, events, now));
    };

    let payment = notification.verified();
    let retries = config.allocation.conflict_retries;
    let mut attempt = 0;

    loop {
        let records = ledger.list_fee_records(&student.student_id)?;
        let allocation = match allocate(&student, &payment, &records, now) {
            Ok(allocation) => allocation,
            Err(LedgerError::DuplicatePayment { .. }) => {
                return Ok(already_recorded(notification, events, now));
            }
            Err(error) if error.is_input_error() => {
                return Ok(reject(notification, error, events, now));
            }
            Err(error) => return Err(error),
        };
        let record = allocation.record;

        match ledger.insert_fee_record(&record) {
            Ok(()) => {
                if allocation.matched == AllocationMatch::NoDueMonth {
                    let reason = "no month was due at payment time".to_string();
                    warn!(
                        student_id = %record.student_id,
                        payment_id = %payment.payment_id,
                        month = %record.month,
                        year = record.year,
                        "payment booked with no due month, flagged for review"
                    );
                    events.emit(Event::AllocationFlagged {
                        record_id: record.record_id,
                        student_id: record.student_id.clone(),
                        payment_id: payment.payment_id.clone(),
                        month: record.month,
                        year: record.year,
                        amount: record.amount,
                        reason,
                        timestamp: now,
                    });
                    return Ok(PaymentDecision::Flagged { record });
                }

                info!(
                    student_id = %record.student_id,
                    payment_id = %payment.payment_id,
                    month = %record.month,
                    year = record.year,
                    amount = %record.amount,
                    "payment allocated"
                );
                events.emit(Event::FeeAllocated {
                    record_id: record.record_id,
                    student_id: record.student_id.clone(),
                    payment_id: payment.payment_id.clone(),
                    month: record.month,
                    year: record.year,
                    amount: record.amount,
                    timestamp: now,
                });
                return Ok(PaymentDecision::Recorded { record });
            }
            Err(LedgerError::ConflictOnInsert {
                conflict: InsertConflict::DuplicatePaymentId { .. },
            }) => {
                return Ok(already_recorded(notification, events, now));
            }
            Err(LedgerError::ConflictOnInsert { conflict }) => {
                debug!(attempt, %conflict, "insert lost a race for the month");
                events.emit(Event::InsertConflicted {
                    student_id: record.student_id.clone(),
                    conflict: conflict.clone(),
                    attempt,
                    timestamp: now,
                });

                if attempt >= retries {
                    let reason = format!(
                        "insert still conflicting after {} attempt(s): {}",
                        attempt + 1,
                        conflict
                    );
                    warn!(
                        student_id = %record.student_id,
                        payment_id = %payment.payment_id,
                        amount = %record.amount,
                        %reason,
                        "verified payment needs manual review"
                    );
                    events.emit(Event::ManualReviewRequired {
                        student_id: record.student_id.clone(),
                        payment_id: payment.payment_id.clone(),
                        amount: record.amount,
                        reason: reason.clone(),
                        timestamp: now,
                    });
                    return Ok(PaymentDecision::ManualReviewRequired { record, reason });
                }
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

fn reject(
    notification: &PaymentNotification,
    error: LedgerError,
    events: &mut EventStore,
    now: DateTime<Utc>,
) -> PaymentDecision {
    warn!(
        order_id = %notification.order_id,
        payment_id = %notification.payment_id,
        %error,
        "payment confirmation rejected"
    );
    events.emit(Event::PaymentRejected {
        order_id: notification.order_id.clone(),
        payment_id: notification.payment_id.clone(),
        reason: error.to_string(),
        timestamp: now,
    });
    PaymentDecision::Rejected { error }
}

fn already_recorded(
    notification: &PaymentNotification,
    events: &mut EventStore,
    now: DateTime<Utc>,
) -> PaymentDecision {
    info!(payment_id = %notification.payment_id, "duplicate confirmation ignored");
    events.emit(Event::DuplicatePaymentIgnored {
        student_id: notification.student_id.clone(),
        payment_id: notification.payment_id.clone(),
        timestamp: now,
    });
    PaymentDecision::AlreadyRecorded {
        payment_id: notification.payment_id.clone(),
    }
}
