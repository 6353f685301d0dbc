use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::LoanId;

/// all events that can be emitted while walking a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ScheduleStarted {
        loan_id: LoanId,
        principal: Money,
        annual_rate: Rate,
        emi: Money,
        term_months: u32,
        start_date: NaiveDate,
    },
    RateChangeApplied {
        loan_id: LoanId,
        month: u32,
        date: NaiveDate,
        old_rate: Rate,
        new_rate: Rate,
        old_emi: Money,
        new_emi: Money,
        remaining_months: u32,
    },
    PrepaymentApplied {
        loan_id: LoanId,
        month: u32,
        date: NaiveDate,
        amount: Money,
        closing_balance: Money,
    },
    RoundingResidualAbsorbed {
        loan_id: LoanId,
        month: u32,
        residual: Money,
    },
    LoanPaidOff {
        loan_id: LoanId,
        month: u32,
        date: NaiveDate,
        total_interest: Money,
    },
}

/// event store for collecting events during a simulation
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

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
