use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, SimulationError};
use crate::loan::LoanTerms;
use crate::types::{EventId, LoanId, PrepaymentEvent, PrepaymentKind, RateChangeEvent};

/// calendar date of a simulated month (1-based). always measured from the
/// start date so a 31st start does not drift to the 28th after February.
pub fn month_date(start_date: NaiveDate, month: u32) -> Result<NaiveDate> {
    start_date
        .checked_add_months(Months::new(month.saturating_sub(1)))
        .ok_or_else(|| SimulationError::invalid("date", format!("month {} after {} is out of range", month, start_date)))
}

/// simulated month whose date is nearest to `date`; ties go to the earlier month
pub fn nearest_month(start_date: NaiveDate, date: NaiveDate) -> Result<u32> {
    if date <= start_date {
        return Ok(1);
    }

    let diff = (date.year() - start_date.year()) * 12 + date.month() as i32 - start_date.month() as i32;
    let mut lower = diff.max(0) as u32 + 1;
    if month_date(start_date, lower)? > date {
        lower -= 1;
    }

    let lower_date = month_date(start_date, lower)?;
    let upper_date = month_date(start_date, lower + 1)?;

    if date - lower_date <= upper_date - date {
        Ok(lower)
    } else {
        Ok(lower + 1)
    }
}

/// one concrete prepayment in a given month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentOccurrence {
    pub event_id: EventId,
    pub month: u32,
    pub date: NaiveDate,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq)]
struct AnchoredPrepayment {
    event_id: EventId,
    anchor_month: u32,
    amount: Money,
    kind: PrepaymentKind,
}

impl AnchoredPrepayment {
    fn occurs_in(&self, month: u32) -> bool {
        match self.kind {
            PrepaymentKind::OneTime => month == self.anchor_month,
            PrepaymentKind::Recurring(frequency) => {
                month >= self.anchor_month
                    && (month - self.anchor_month) % frequency.interval_months() == 0
            }
        }
    }
}

/// resolves which prepayments and rate changes are in effect for each month
#[derive(Debug, Clone, PartialEq)]
pub struct EventApplier {
    start_date: NaiveDate,
    prepayments: Vec<AnchoredPrepayment>,
    rate_changes: Vec<RateChangeEvent>,
}

impl EventApplier {
    pub fn new(
        loan: &LoanTerms,
        prepayments: &[PrepaymentEvent],
        rate_changes: &[RateChangeEvent],
    ) -> Result<Self> {
        let mut anchored = Vec::with_capacity(prepayments.len());
        for event in prepayments {
            event.validate()?;
            check_owner(loan, event.loan_id, "prepayment.loan_id")?;

            anchored.push(AnchoredPrepayment {
                event_id: event.id,
                anchor_month: nearest_month(loan.start_date, event.effective_date)?,
                amount: event.amount,
                kind: event.kind,
            });
        }

        for change in rate_changes {
            change.validate()?;
            check_owner(loan, change.loan_id, "rate_change.loan_id")?;
        }

        // stable: same-day changes keep their input order
        let mut sorted = rate_changes.to_vec();
        sorted.sort_by_key(|c| c.effective_date);

        Ok(Self {
            start_date: loan.start_date,
            prepayments: anchored,
            rate_changes: sorted,
        })
    }

    pub fn has_events(&self) -> bool {
        !self.prepayments.is_empty() || !self.rate_changes.is_empty()
    }

    /// total prepayment falling in `month`, if any
    pub fn prepayment_for_month(&self, month: u32) -> Option<Money> {
        let mut total = None;
        for prepayment in self.prepayments.iter().filter(|p| p.occurs_in(month)) {
            total = Some(total.unwrap_or(Money::ZERO) + prepayment.amount);
        }
        total
    }

    /// rate changes effective on or before `date` that sit past `cursor`.
    /// returns the advanced cursor and the last such change, which is the
    /// only one that takes effect.
    pub fn due_rate_change(&self, cursor: usize, date: NaiveDate) -> (usize, Option<&RateChangeEvent>) {
        let mut next = cursor;
        while next < self.rate_changes.len() && self.rate_changes[next].effective_date <= date {
            next += 1;
        }

        if next > cursor {
            (next, self.rate_changes.get(next - 1))
        } else {
            (cursor, None)
        }
    }

    /// concrete prepayment occurrences over the first `horizon_months` months
    pub fn expand(&self, horizon_months: u32) -> Result<Vec<PrepaymentOccurrence>> {
        let mut occurrences = Vec::new();
        for month in 1..=horizon_months {
            for prepayment in self.prepayments.iter().filter(|p| p.occurs_in(month)) {
                occurrences.push(PrepaymentOccurrence {
                    event_id: prepayment.event_id,
                    month,
                    date: month_date(self.start_date, month)?,
                    amount: prepayment.amount,
                });
            }
        }
        Ok(occurrences)
    }
}

fn check_owner(loan: &LoanTerms, owner: LoanId, field: &str) -> Result<()> {
    if owner != loan.id {
        return Err(SimulationError::invalid(
            field,
            format!("event belongs to loan {}, not {}", owner, loan.id),
        ));
    }
    Ok(())
}
