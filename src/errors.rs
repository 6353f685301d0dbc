use thiserror::Error;

use crate::decimal::{Money, Rate};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid input: {field}: {reason}")]
    InvalidInput {
        field: String,
        reason: String,
    },

    #[error("stalled amortization: emi {emi} cannot pay off balance {balance} at {rate}")]
    StalledAmortization {
        balance: Money,
        rate: Rate,
        emi: Money,
    },

    #[error("iteration limit exceeded: schedule still open after {limit} months, balance {remaining_balance}")]
    IterationLimitExceeded {
        limit: u32,
        remaining_balance: Money,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

impl SimulationError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// true when the loan cannot be paid off at the EMI in effect.
    /// hitting the iteration limit is reported the same way.
    pub fn is_stalled(&self) -> bool {
        matches!(
            self,
            SimulationError::StalledAmortization { .. } | SimulationError::IterationLimitExceeded { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
