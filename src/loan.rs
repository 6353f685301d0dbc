use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};
use crate::payments::emi::calculate_emi;
use crate::types::LoanId;

/// terms of a single loan as held by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub id: LoanId,
    /// free-form label ("home", "car", "personal", ...)
    pub category: String,
    pub name: Option<String>,
    pub principal: Money,
    pub outstanding_balance: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    /// stored EMI; `None` means derive it from principal, rate and tenure
    pub emi: Option<Money>,
}

impl LoanTerms {
    pub fn builder() -> LoanTermsBuilder {
        LoanTermsBuilder::new()
    }

    /// check the invariants of a value handed over by a caller
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(SimulationError::invalid(
                "principal",
                format!("must be positive, got {}", self.principal),
            ));
        }
        if self.term_months == 0 {
            return Err(SimulationError::invalid("term_months", "must be at least one month"));
        }
        if self.annual_rate.is_negative() {
            return Err(SimulationError::invalid(
                "annual_rate",
                format!("must not be negative, got {}", self.annual_rate),
            ));
        }
        if self.outstanding_balance.is_negative() {
            return Err(SimulationError::invalid(
                "outstanding_balance",
                format!("must not be negative, got {}", self.outstanding_balance),
            ));
        }
        if self.outstanding_balance > self.principal {
            return Err(SimulationError::invalid(
                "outstanding_balance",
                format!(
                    "{} exceeds principal {}",
                    self.outstanding_balance, self.principal
                ),
            ));
        }
        if let Some(emi) = self.emi {
            if !emi.is_positive() {
                return Err(SimulationError::invalid(
                    "emi",
                    format!("must be positive, got {}", emi),
                ));
            }
        }
        Ok(())
    }

    /// stored EMI if present, otherwise the closed-form EMI
    pub fn effective_emi(&self, config: &EngineConfig) -> Result<Money> {
        match self.emi {
            Some(emi) => Ok(emi),
            None => calculate_emi(
                self.principal,
                self.annual_rate,
                self.term_months,
                config.currency_scale,
            ),
        }
    }

    /// display name, falling back to the category
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.category)
    }

    pub fn paid_principal(&self) -> Money {
        self.principal - self.outstanding_balance
    }
}

/// builder for loan terms
#[derive(Debug, Default)]
pub struct LoanTermsBuilder {
    id: Option<LoanId>,
    category: Option<String>,
    name: Option<String>,
    principal: Option<Money>,
    outstanding_balance: Option<Money>,
    annual_rate: Option<Rate>,
    term_months: Option<u32>,
    start_date: Option<NaiveDate>,
    emi: Option<Money>,
}

impl LoanTermsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: LoanId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn principal(mut self, amount: Money) -> Self {
        self.principal = Some(amount);
        self
    }

    pub fn outstanding_balance(mut self, amount: Money) -> Self {
        self.outstanding_balance = Some(amount);
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.annual_rate = Some(rate);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// store an EMI instead of deriving it
    pub fn emi(mut self, emi: Money) -> Self {
        self.emi = Some(emi);
        self
    }

    pub fn build(self) -> Result<LoanTerms> {
        let principal = self
            .principal
            .ok_or_else(|| SimulationError::invalid("principal", "required"))?;
        let annual_rate = self
            .annual_rate
            .ok_or_else(|| SimulationError::invalid("annual_rate", "required"))?;
        let term_months = self
            .term_months
            .ok_or_else(|| SimulationError::invalid("term_months", "required"))?;
        let start_date = self
            .start_date
            .ok_or_else(|| SimulationError::invalid("start_date", "required"))?;

        let loan = LoanTerms {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            category: self.category.unwrap_or_else(|| "personal".to_string()),
            name: self.name,
            principal,
            // a fresh loan owes its full principal
            outstanding_balance: self.outstanding_balance.unwrap_or(principal),
            annual_rate,
            term_months,
            start_date,
            emi: self.emi,
        };

        loan.validate()?;
        Ok(loan)
    }
}
