/// serialization support for saved simulations
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};
use crate::loan::LoanTerms;
use crate::simulation::SimulationResult;
use crate::types::{LoanId, PrepaymentEvent, RateChangeEvent};

/// a what-if run as the persistence layer stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub id: Uuid,
    pub loan_id: LoanId,
    pub title: String,
    pub created_on: NaiveDate,
    pub loan: LoanTerms,
    pub prepayments: Vec<PrepaymentEvent>,
    pub rate_changes: Vec<RateChangeEvent>,
    pub summary: SummaryView,
    /// full schedules are optional; they can always be regenerated from the inputs
    pub result: Option<SimulationResult>,
}

/// headline numbers of a simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryView {
    pub original_emi: Money,
    pub new_emi: Money,
    pub annual_rate: Rate,
    pub baseline_months: usize,
    pub modified_months: usize,
    pub baseline_interest: Money,
    pub modified_interest: Money,
    pub interest_saved: Money,
    pub months_saved: i64,
    pub total_prepaid: Money,
    pub new_debt_free_date: NaiveDate,
}

impl SummaryView {
    pub fn from_result(loan: &LoanTerms, result: &SimulationResult) -> Self {
        SummaryView {
            original_emi: result.baseline.emi,
            new_emi: result.new_emi,
            annual_rate: loan.annual_rate,
            baseline_months: result.baseline.len(),
            modified_months: result.modified.len(),
            baseline_interest: result.baseline.total_interest,
            modified_interest: result.modified.total_interest,
            interest_saved: result.interest_saved,
            months_saved: result.months_saved,
            total_prepaid: result.modified.total_prepaid,
            new_debt_free_date: result.new_debt_free_date,
        }
    }
}

impl SimulationRecord {
    pub fn new(
        title: impl Into<String>,
        created_on: NaiveDate,
        loan: &LoanTerms,
        prepayments: &[PrepaymentEvent],
        rate_changes: &[RateChangeEvent],
        result: &SimulationResult,
    ) -> Self {
        SimulationRecord {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            title: title.into(),
            created_on,
            loan: loan.clone(),
            prepayments: prepayments.to_vec(),
            rate_changes: rate_changes.to_vec(),
            summary: SummaryView::from_result(loan, result),
            result: Some(result.clone()),
        }
    }

    /// drop the schedules, keeping inputs and summary
    pub fn without_schedules(mut self) -> Self {
        self.result = None;
        self
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SimulationError::CalculationError {
            message: format!("failed to serialize simulation record: {}", e),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SimulationError::invalid("simulation_record", e.to_string()))
    }
}
