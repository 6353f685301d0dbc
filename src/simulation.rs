use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{Result, SimulationError};
use crate::events::EventStore;
use crate::loan::LoanTerms;
use crate::payments::{AmortizationSchedule, ScheduleGenerator};
use crate::types::{PrepaymentEvent, RateChangeEvent};

/// outcome of a what-if run against the baseline schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub baseline: AmortizationSchedule,
    pub modified: AmortizationSchedule,
    /// baseline interest minus modified interest; negative when the change costs more
    pub interest_saved: Money,
    /// baseline length minus modified length; negative when the loan runs longer
    pub months_saved: i64,
    pub new_debt_free_date: NaiveDate,
    pub new_emi: Money,
}

impl SimulationResult {
    pub fn is_improvement(&self) -> bool {
        self.interest_saved.is_positive() || self.months_saved > 0
    }
}

/// diffs a baseline schedule against a modified one
pub struct SavingsAnalyzer;

impl SavingsAnalyzer {
    pub fn compare(baseline: &AmortizationSchedule, modified: &AmortizationSchedule) -> Result<SimulationResult> {
        if baseline.loan_id != modified.loan_id {
            return Err(SimulationError::invalid(
                "modified.loan_id",
                format!("schedules belong to different loans: {} vs {}", baseline.loan_id, modified.loan_id),
            ));
        }

        let new_debt_free_date = modified
            .debt_free_date()
            .ok_or_else(|| SimulationError::invalid("modified", "schedule has no entries"))?;

        Ok(SimulationResult {
            baseline: baseline.clone(),
            modified: modified.clone(),
            interest_saved: baseline.total_interest - modified.total_interest,
            months_saved: baseline.len() as i64 - modified.len() as i64,
            new_debt_free_date,
            new_emi: modified.emi,
        })
    }
}

/// run baseline and modified schedules from the same loan snapshot and diff them
pub fn simulate(
    loan: &LoanTerms,
    prepayments: &[PrepaymentEvent],
    rate_changes: &[RateChangeEvent],
    config: &EngineConfig,
) -> Result<SimulationResult> {
    let mut events = EventStore::new();
    simulate_with_events(loan, prepayments, rate_changes, config, &mut events)
}

/// like `simulate`, recording the modified run's events
pub fn simulate_with_events(
    loan: &LoanTerms,
    prepayments: &[PrepaymentEvent],
    rate_changes: &[RateChangeEvent],
    config: &EngineConfig,
    events: &mut EventStore,
) -> Result<SimulationResult> {
    let baseline = AmortizationSchedule::baseline(loan, config)?;
    let modified = ScheduleGenerator::new(loan, config)
        .prepayments(prepayments)
        .rate_changes(rate_changes)
        .generate_with_events(events)?;

    SavingsAnalyzer::compare(&baseline, &modified)
}
