use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};
use crate::events::{Event, EventStore};
use crate::loan::LoanTerms;
use crate::types::{LoanId, PrepaymentEvent, RateChangeEvent};

use super::emi::{calculate_emi, reamortize_emi, remaining_tenure};
use super::prepayment::{month_date, EventApplier};

/// one simulated month in an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: u32,
    pub date: NaiveDate,
    /// amount charged this month; differs from the nominal EMI only on the final month
    pub emi: Money,
    pub principal: Money,
    pub interest: Money,
    pub closing_balance: Money,
    /// prepayment actually applied after this month's EMI
    pub prepayment: Option<Money>,
}

/// amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub loan_id: LoanId,
    pub principal: Money,
    /// nominal EMI in effect when the schedule closed
    pub emi: Money,
    pub entries: Vec<ScheduleEntry>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_prepaid: Money,
    pub total_paid: Money,
}

impl AmortizationSchedule {
    /// schedule with no prepayments and no rate changes
    pub fn baseline(loan: &LoanTerms, config: &EngineConfig) -> Result<Self> {
        ScheduleGenerator::new(loan, config).generate()
    }

    fn from_entries(loan_id: LoanId, principal: Money, emi: Money, entries: Vec<ScheduleEntry>) -> Self {
        let total_interest: Money = entries.iter().map(|e| e.interest).sum();
        let total_principal: Money = entries.iter().map(|e| e.principal).sum();
        let total_prepaid: Money = entries.iter().filter_map(|e| e.prepayment).sum();
        let total_paid = entries.iter().map(|e| e.emi).sum::<Money>() + total_prepaid;

        Self {
            loan_id,
            principal,
            emi,
            entries,
            total_interest,
            total_principal,
            total_prepaid,
            total_paid,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// date of the final entry
    pub fn debt_free_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|e| e.date)
    }

    /// get entry for a 1-based month
    pub fn entry(&self, month: u32) -> Option<&ScheduleEntry> {
        month
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx as usize))
    }

    /// entries dated on or before `date`
    pub fn entries_through(&self, date: NaiveDate) -> &[ScheduleEntry] {
        let end = self.entries.partition_point(|e| e.date <= date);
        &self.entries[..end]
    }

    pub fn interest_through(&self, date: NaiveDate) -> Money {
        self.entries_through(date).iter().map(|e| e.interest).sum()
    }

    /// closing balance of the last entry on or before `date`;
    /// the full principal before the first month
    pub fn balance_as_of(&self, date: NaiveDate) -> Money {
        self.entries_through(date)
            .last()
            .map(|e| e.closing_balance)
            .unwrap_or(self.principal)
    }
}

/// walk state carried from one month to the next
#[derive(Debug, Clone, Copy, PartialEq)]
struct WalkState {
    month: u32,
    date: NaiveDate,
    balance: Money,
    rate: Rate,
    emi: Money,
    remaining_months: u32,
    /// EMI came from the closed form, so the last scheduled month clears the balance
    closes_on_schedule: bool,
    rate_cursor: usize,
}

struct StepContext<'a> {
    loan_id: LoanId,
    start_date: NaiveDate,
    scale: u32,
    applier: &'a EventApplier,
}

impl WalkState {
    fn initial(loan: &LoanTerms, emi: Money, closes_on_schedule: bool) -> Self {
        Self {
            month: 1,
            date: loan.start_date,
            balance: loan.principal,
            rate: loan.annual_rate,
            emi,
            remaining_months: loan.term_months,
            closes_on_schedule,
            rate_cursor: 0,
        }
    }

    /// simulate this month; returns the state for the following month and
    /// the entry for this one
    fn step(self, ctx: &StepContext<'_>, events: &mut EventStore) -> Result<(WalkState, ScheduleEntry)> {
        let mut rate = self.rate;
        let mut emi = self.emi;
        let mut remaining_months = self.remaining_months;
        let mut closes_on_schedule = self.closes_on_schedule;

        // rate changes first: re-amortize what is left over the remaining term
        let (rate_cursor, change) = ctx.applier.due_rate_change(self.rate_cursor, self.date);
        if let Some(change) = change.filter(|c| c.new_rate != self.rate) {
            remaining_months = remaining_tenure(self.balance, self.rate, self.emi)?;
            if self.closes_on_schedule {
                // the walk clears the balance on its last scheduled month, sooner than the
                // solver's estimate for a rounded-down EMI
                remaining_months = remaining_months.min(self.remaining_months.max(1));
            }
            let new_emi = reamortize_emi(self.balance, change.new_rate, remaining_months, ctx.scale)?;

            log::debug!(
                "loan {} month {}: rate {} -> {}, emi {} -> {} over {} months",
                ctx.loan_id, self.month, self.rate, change.new_rate, self.emi, new_emi, remaining_months
            );
            events.emit(Event::RateChangeApplied {
                loan_id: ctx.loan_id,
                month: self.month,
                date: self.date,
                old_rate: self.rate,
                new_rate: change.new_rate,
                old_emi: self.emi,
                new_emi,
                remaining_months,
            });

            rate = change.new_rate;
            emi = new_emi;
            closes_on_schedule = true;
        }

        let interest = self.balance.monthly_interest(rate).round_to_scale(ctx.scale);

        let mut principal = emi - interest;
        if !principal.is_positive() {
            log::warn!(
                "loan {} month {}: emi {} does not cover interest {}",
                ctx.loan_id, self.month, emi, interest
            );
            return Err(SimulationError::StalledAmortization {
                balance: self.balance,
                rate,
                emi,
            });
        }

        let mut charged = emi;
        if principal >= self.balance {
            principal = self.balance;
            charged = principal + interest;
        } else if closes_on_schedule && remaining_months <= 1 {
            // EMI and interest are rounded, so the last scheduled month settles what is left
            let residual = self.balance - principal;
            events.emit(Event::RoundingResidualAbsorbed {
                loan_id: ctx.loan_id,
                month: self.month,
                residual,
            });
            principal = self.balance;
            charged = principal + interest;
        }

        let mut balance = self.balance - principal;

        let prepayment = match ctx.applier.prepayment_for_month(self.month) {
            Some(amount) if balance.is_positive() => {
                let applied = amount.min(balance);
                balance -= applied;
                events.emit(Event::PrepaymentApplied {
                    loan_id: ctx.loan_id,
                    month: self.month,
                    date: self.date,
                    amount: applied,
                    closing_balance: balance,
                });
                Some(applied)
            }
            _ => None,
        };

        let entry = ScheduleEntry {
            month: self.month,
            date: self.date,
            emi: charged,
            principal,
            interest,
            closing_balance: balance,
            prepayment,
        };

        let next_date = if balance.is_zero() {
            self.date
        } else {
            month_date(ctx.start_date, self.month + 1)?
        };

        let next = WalkState {
            month: self.month + 1,
            date: next_date,
            balance,
            rate,
            emi,
            remaining_months: remaining_months.saturating_sub(1),
            closes_on_schedule,
            rate_cursor,
        };

        Ok((next, entry))
    }
}

/// month-by-month schedule generator
pub struct ScheduleGenerator<'a> {
    loan: &'a LoanTerms,
    config: &'a EngineConfig,
    prepayments: &'a [PrepaymentEvent],
    rate_changes: &'a [RateChangeEvent],
}

impl<'a> ScheduleGenerator<'a> {
    pub fn new(loan: &'a LoanTerms, config: &'a EngineConfig) -> Self {
        Self {
            loan,
            config,
            prepayments: &[],
            rate_changes: &[],
        }
    }

    pub fn prepayments(mut self, prepayments: &'a [PrepaymentEvent]) -> Self {
        self.prepayments = prepayments;
        self
    }

    pub fn rate_changes(mut self, rate_changes: &'a [RateChangeEvent]) -> Self {
        self.rate_changes = rate_changes;
        self
    }

    /// generate the schedule, discarding the event trace
    pub fn generate(&self) -> Result<AmortizationSchedule> {
        let mut events = EventStore::new();
        self.generate_with_events(&mut events)
    }

    /// generate the schedule, recording what happened along the way
    pub fn generate_with_events(&self, events: &mut EventStore) -> Result<AmortizationSchedule> {
        self.config.validate()?;
        self.loan.validate()?;

        let applier = EventApplier::new(self.loan, self.prepayments, self.rate_changes)?;
        let derived_emi = calculate_emi(
            self.loan.principal,
            self.loan.annual_rate,
            self.loan.term_months,
            self.config.currency_scale,
        )?;
        let emi = self.loan.emi.unwrap_or(derived_emi);
        let limit = self.config.iteration_limit(self.loan.term_months);

        events.emit(Event::ScheduleStarted {
            loan_id: self.loan.id,
            principal: self.loan.principal,
            annual_rate: self.loan.annual_rate,
            emi,
            term_months: self.loan.term_months,
            start_date: self.loan.start_date,
        });

        let ctx = StepContext {
            loan_id: self.loan.id,
            start_date: self.loan.start_date,
            scale: self.config.currency_scale,
            applier: &applier,
        };

        let mut entries = Vec::with_capacity(self.loan.term_months as usize);
        let mut state = WalkState::initial(self.loan, emi, emi == derived_emi);

        let final_emi = loop {
            if state.month > limit {
                log::warn!(
                    "loan {}: schedule still open after {} months, balance {}",
                    self.loan.id, limit, state.balance
                );
                return Err(SimulationError::IterationLimitExceeded {
                    limit,
                    remaining_balance: state.balance,
                });
            }

            let (next, entry) = state.step(&ctx, events)?;
            let closed = entry.closing_balance.is_zero();
            entries.push(entry);

            if closed {
                break next.emi;
            }
            state = next;
        };

        let schedule = AmortizationSchedule::from_entries(self.loan.id, self.loan.principal, final_emi, entries);

        if let Some(last) = schedule.entries.last() {
            events.emit(Event::LoanPaidOff {
                loan_id: self.loan.id,
                month: last.month,
                date: last.date,
                total_interest: schedule.total_interest,
            });
        }

        log::debug!(
            "loan {}: {} months, interest {}, events applied: {}",
            self.loan.id,
            schedule.len(),
            schedule.total_interest,
            applier.has_events()
        );

        Ok(schedule)
    }
}
