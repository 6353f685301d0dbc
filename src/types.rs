use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a prepayment or rate-change record
pub type EventId = Uuid;

/// how often a recurring prepayment repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrepaymentFrequency {
    /// every simulated month
    Monthly,
    /// every 12 simulated months
    Yearly,
    /// every `interval_months` simulated months
    Custom { interval_months: u32 },
}

impl PrepaymentFrequency {
    /// months between two occurrences
    pub fn interval_months(&self) -> u32 {
        match self {
            PrepaymentFrequency::Monthly => 1,
            PrepaymentFrequency::Yearly => 12,
            PrepaymentFrequency::Custom { interval_months } => *interval_months,
        }
    }
}

/// one-time or recurring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrepaymentKind {
    OneTime,
    Recurring(PrepaymentFrequency),
}

/// extra payment against principal, outside the regular EMI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentEvent {
    pub id: EventId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub effective_date: NaiveDate,
    pub kind: PrepaymentKind,
}

impl PrepaymentEvent {
    pub fn one_time(loan_id: LoanId, amount: Money, effective_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            amount,
            effective_date,
            kind: PrepaymentKind::OneTime,
        }
    }

    pub fn recurring(
        loan_id: LoanId,
        amount: Money,
        effective_date: NaiveDate,
        frequency: PrepaymentFrequency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            amount,
            effective_date,
            kind: PrepaymentKind::Recurring(frequency),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(SimulationError::invalid(
                "prepayment.amount",
                format!("must be positive, got {}", self.amount),
            ));
        }
        if let PrepaymentKind::Recurring(PrepaymentFrequency::Custom { interval_months: 0 }) = self.kind {
            return Err(SimulationError::invalid(
                "prepayment.interval_months",
                "custom interval must be at least one month",
            ));
        }
        Ok(())
    }
}

/// change of annual rate effective from a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateChangeEvent {
    pub id: EventId,
    pub loan_id: LoanId,
    pub new_rate: Rate,
    pub effective_date: NaiveDate,
}

impl RateChangeEvent {
    pub fn new(loan_id: LoanId, new_rate: Rate, effective_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            new_rate,
            effective_date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.new_rate.is_negative() {
            return Err(SimulationError::invalid(
                "rate_change.new_rate",
                format!("must not be negative, got {}", self.new_rate),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_frequency_intervals() {
        assert_eq!(PrepaymentFrequency::Monthly.interval_months(), 1);
        assert_eq!(PrepaymentFrequency::Yearly.interval_months(), 12);
        assert_eq!(PrepaymentFrequency::Custom { interval_months: 3 }.interval_months(), 3);
    }

    #[test]
    fn test_prepayment_validation() {
        let loan_id = Uuid::new_v4();

        let ok = PrepaymentEvent::one_time(loan_id, Money::from_major(1_000), date(2024, 1, 1));
        assert!(ok.validate().is_ok());

        let zero = PrepaymentEvent::one_time(loan_id, Money::ZERO, date(2024, 1, 1));
        assert!(zero.validate().is_err());

        let bad_interval = PrepaymentEvent::recurring(
            loan_id,
            Money::from_major(1_000),
            date(2024, 1, 1),
            PrepaymentFrequency::Custom { interval_months: 0 },
        );
        assert!(matches!(
            bad_interval.validate(),
            Err(SimulationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_rate_change_validation() {
        let loan_id = Uuid::new_v4();
        assert!(RateChangeEvent::new(loan_id, Rate::ZERO, date(2024, 1, 1)).validate().is_ok());

        let negative = RateChangeEvent::new(
            loan_id,
            Rate::from_decimal(rust_decimal_macros::dec!(-0.01)),
            date(2024, 1, 1),
        );
        assert!(negative.validate().is_err());
    }
}
