use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::AcademicMonth;
use crate::decimal::Money;
use crate::errors::InsertConflict;
use crate::types::{PaymentMethod, RecordId, StudentId};

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // verification events
    PaymentVerified {
        order_id: String,
        payment_id: String,
        student_id: StudentId,
        timestamp: DateTime<Utc>,
    },
    PaymentRejected {
        order_id: String,
        payment_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // allocation events
    FeeAllocated {
        record_id: RecordId,
        student_id: StudentId,
        payment_id: String,
        month: AcademicMonth,
        year: i32,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    AllocationFlagged {
        record_id: RecordId,
        student_id: StudentId,
        payment_id: String,
        month: AcademicMonth,
        year: i32,
        amount: Money,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    DuplicatePaymentIgnored {
        student_id: StudentId,
        payment_id: String,
        timestamp: DateTime<Utc>,
    },
    InsertConflicted {
        student_id: StudentId,
        conflict: InsertConflict,
        attempt: u32,
        timestamp: DateTime<Utc>,
    },
    ManualReviewRequired {
        student_id: StudentId,
        payment_id: String,
        amount: Money,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // manual entry events
    ManualFeeRecorded {
        record_id: RecordId,
        student_id: StudentId,
        month: AcademicMonth,
        year: i32,
        amount: Money,
        method: PaymentMethod,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
