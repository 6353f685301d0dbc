use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::loan::LoanTerms;
use crate::payments::{calculate_emi, remaining_tenure, AmortizationSchedule};
use crate::types::LoanId;

/// paid / remaining figures for one loan as of a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAnalytics {
    pub loan_id: LoanId,
    pub label: String,
    pub category: String,
    pub as_of: NaiveDate,
    pub annual_rate: Rate,
    pub emi: Money,
    pub principal: Money,
    pub paid_principal: Money,
    /// interest on baseline entries dated on or before `as_of`
    pub paid_interest: Money,
    pub remaining_principal: Money,
    pub total_interest: Money,
    pub remaining_interest: Money,
    pub months_elapsed: u32,
    /// months to clear the outstanding balance at the current EMI
    pub months_remaining: u32,
    pub debt_free_date: Option<NaiveDate>,
}

impl LoanAnalytics {
    pub fn for_loan(loan: &LoanTerms, config: &EngineConfig, as_of: NaiveDate) -> Result<Self> {
        let schedule = AmortizationSchedule::baseline(loan, config)?;
        let emi = loan.effective_emi(config)?;

        let paid_interest = schedule.interest_through(as_of);
        let months_elapsed = schedule.entries_through(as_of).len() as u32;
        let months_remaining = months_left(loan, config, &schedule, emi, as_of, months_elapsed)?;

        Ok(Self {
            loan_id: loan.id,
            label: loan.label().to_string(),
            category: loan.category.clone(),
            as_of,
            annual_rate: loan.annual_rate,
            emi,
            principal: loan.principal,
            paid_principal: loan.paid_principal(),
            paid_interest,
            remaining_principal: loan.outstanding_balance,
            total_interest: schedule.total_interest,
            remaining_interest: (schedule.total_interest - paid_interest).max(Money::ZERO),
            months_elapsed,
            months_remaining,
            debt_free_date: schedule.debt_free_date(),
        })
    }

    /// analytics as of today's date on the given clock
    pub fn now(loan: &LoanTerms, config: &EngineConfig, time: &SafeTimeProvider) -> Result<Self> {
        Self::for_loan(loan, config, time.now().date_naive())
    }

    /// share of principal repaid
    pub fn progress(&self) -> Rate {
        self.paid_principal.ratio_to(self.principal).unwrap_or(Rate::ZERO)
    }

    pub fn is_closed(&self) -> bool {
        self.remaining_principal.is_zero()
    }
}

/// months left on the loan. a balance that matches the baseline schedule follows
/// that schedule; anything else is solved from the balance at the current EMI,
/// capped at the term when the EMI is the closed-form one.
fn months_left(
    loan: &LoanTerms,
    config: &EngineConfig,
    schedule: &AmortizationSchedule,
    emi: Money,
    as_of: NaiveDate,
    months_elapsed: u32,
) -> Result<u32> {
    if loan.outstanding_balance == schedule.balance_as_of(as_of) {
        return Ok((schedule.len() as u32).saturating_sub(months_elapsed));
    }

    let solved = remaining_tenure(loan.outstanding_balance, loan.annual_rate, emi)?;
    let derived = calculate_emi(loan.principal, loan.annual_rate, loan.term_months, config.currency_scale)?;
    if emi == derived && solved > 0 {
        let left_in_term = loan.term_months.saturating_sub(months_elapsed).max(1);
        return Ok(solved.min(left_in_term));
    }
    Ok(solved)
}

/// totals across a collection of loans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioAnalytics {
    pub as_of: NaiveDate,
    pub loan_count: usize,
    pub active_loan_count: usize,
    pub total_principal: Money,
    pub total_paid_principal: Money,
    pub total_paid_interest: Money,
    pub total_remaining_principal: Money,
    pub total_interest: Money,
    pub total_remaining_interest: Money,
    /// EMI across loans that still owe something
    pub total_emi: Money,
    /// average rate weighted by outstanding balance
    pub weighted_average_rate: Rate,
    pub latest_debt_free_date: Option<NaiveDate>,
    pub loans: Vec<LoanAnalytics>,
}

impl PortfolioAnalytics {
    pub fn aggregate(loans: &[LoanTerms], config: &EngineConfig, as_of: NaiveDate) -> Result<Self> {
        let per_loan = loans
            .iter()
            .map(|loan| LoanAnalytics::for_loan(loan, config, as_of))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_loans(as_of, per_loan))
    }

    pub fn now(loans: &[LoanTerms], config: &EngineConfig, time: &SafeTimeProvider) -> Result<Self> {
        Self::aggregate(loans, config, time.now().date_naive())
    }

    fn from_loans(as_of: NaiveDate, loans: Vec<LoanAnalytics>) -> Self {
        let active: Vec<&LoanAnalytics> = loans.iter().filter(|l| !l.is_closed()).collect();
        let total_remaining_principal: Money = loans.iter().map(|l| l.remaining_principal).sum();

        Self {
            as_of,
            loan_count: loans.len(),
            active_loan_count: active.len(),
            total_principal: loans.iter().map(|l| l.principal).sum(),
            total_paid_principal: loans.iter().map(|l| l.paid_principal).sum(),
            total_paid_interest: loans.iter().map(|l| l.paid_interest).sum(),
            total_remaining_principal,
            total_interest: loans.iter().map(|l| l.total_interest).sum(),
            total_remaining_interest: loans.iter().map(|l| l.remaining_interest).sum(),
            total_emi: active.iter().map(|l| l.emi).sum(),
            weighted_average_rate: weighted_rate(&loans, total_remaining_principal),
            latest_debt_free_date: loans.iter().filter_map(|l| l.debt_free_date).max(),
            loans,
        }
    }

    /// total EMI over monthly income; `None` for a zero income
    pub fn emi_to_income_ratio(&self, monthly_income: Money) -> Option<Rate> {
        if !monthly_income.is_positive() {
            return None;
        }
        self.total_emi.ratio_to(monthly_income)
    }
}

fn weighted_rate(loans: &[LoanAnalytics], total_outstanding: Money) -> Rate {
    if loans.is_empty() {
        return Rate::ZERO;
    }

    if total_outstanding.is_zero() {
        // everything repaid: plain average
        let sum: Decimal = loans.iter().map(|l| l.annual_rate.as_decimal()).sum();
        return Rate::from_decimal(sum / Decimal::from(loans.len()));
    }

    let weighted: Decimal = loans
        .iter()
        .map(|l| l.remaining_principal.as_decimal() * l.annual_rate.as_decimal())
        .sum();
    Rate::from_decimal(weighted / total_outstanding.as_decimal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn car_loan() -> LoanTerms {
        LoanTerms::builder()
            .category("car")
            .principal(Money::from_major(100_000))
            .outstanding_balance(Money::from_major(84_151))
            .rate(Rate::from_percentage(12))
            .term_months(12)
            .start_date(date(2024, 1, 1))
            .build()
            .unwrap()
    }

    fn home_loan() -> LoanTerms {
        LoanTerms::builder()
            .category("home")
            .name("flat")
            .principal(Money::from_major(1_200_000))
            .outstanding_balance(Money::from_major(1_000_000))
            .rate(Rate::from_percentage(9))
            .term_months(120)
            .start_date(date(2024, 1, 1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_loan_analytics() {
        let loan = car_loan();
        let config = EngineConfig::default();
        let analytics = LoanAnalytics::for_loan(&loan, &config, date(2024, 2, 15)).unwrap();

        assert_eq!(analytics.label, "car");
        assert_eq!(analytics.paid_principal, Money::from_major(15_849));
        assert_eq!(analytics.remaining_principal, Money::from_major(84_151));
        assert_eq!(analytics.months_elapsed, 2);
        // 1,000 in january, 921 in february
        assert_eq!(analytics.paid_interest, Money::from_major(1_921));
        assert_eq!(analytics.remaining_interest, analytics.total_interest - Money::from_major(1_921));
        assert_eq!(analytics.months_remaining, 10);
        assert_eq!(analytics.debt_free_date, Some(date(2024, 12, 1)));
        assert!(analytics.progress() > Rate::from_percentage(15));
        assert!(analytics.progress() < Rate::from_percentage(16));
    }

    #[test]
    fn test_analytics_with_pinned_clock() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap()));
        let loan = car_loan();
        let config = EngineConfig::default();

        let now = LoanAnalytics::now(&loan, &config, &time).unwrap();
        let fixed = LoanAnalytics::for_loan(&loan, &config, date(2024, 2, 15)).unwrap();
        assert_eq!(now, fixed);
    }

    #[test]
    fn test_months_remaining_matches_schedule() {
        let loan = LoanTerms::builder()
            .category("home")
            .principal(Money::from_major(1_200_000))
            .rate(Rate::from_percentage(9))
            .term_months(120)
            .start_date(date(2024, 1, 1))
            .build()
            .unwrap();
        let config = EngineConfig::default();

        let fresh = LoanAnalytics::for_loan(&loan, &config, date(2023, 12, 1)).unwrap();
        assert_eq!(fresh.debt_free_date, Some(date(2033, 12, 1)));
        assert_eq!(fresh.months_remaining, 120);

        // on schedule a year in
        let mut a_year_in = loan.clone();
        a_year_in.outstanding_balance = Money::from_major(1_115_658);
        let analytics = LoanAnalytics::for_loan(&a_year_in, &config, date(2025, 1, 15)).unwrap();
        assert_eq!(analytics.months_elapsed, 13);
        assert_eq!(analytics.months_remaining, 107);

        // a few units behind schedule near the end still closes within the term
        let mut behind = loan.clone();
        behind.outstanding_balance = Money::from_major(30_083);
        let analytics = LoanAnalytics::for_loan(&behind, &config, date(2033, 10, 15)).unwrap();
        assert_eq!(analytics.months_elapsed, 118);
        assert_eq!(analytics.months_remaining, 2);
    }

    #[test]
    fn test_off_schedule_balance_is_solved() {
        let analytics = LoanAnalytics::for_loan(&home_loan(), &EngineConfig::default(), date(2024, 2, 15)).unwrap();
        assert_eq!(analytics.months_remaining, 92);
    }

    #[test]
    fn test_before_start_nothing_paid() {
        let loan = car_loan();
        let analytics = LoanAnalytics::for_loan(&loan, &EngineConfig::default(), date(2023, 12, 1)).unwrap();

        assert_eq!(analytics.months_elapsed, 0);
        assert_eq!(analytics.paid_interest, Money::ZERO);
        assert_eq!(analytics.remaining_interest, analytics.total_interest);
    }

    #[test]
    fn test_portfolio_aggregation() {
        let loans = vec![car_loan(), home_loan()];
        let config = EngineConfig::default();
        let as_of = date(2024, 2, 15);
        let portfolio = PortfolioAnalytics::aggregate(&loans, &config, as_of).unwrap();

        let car = LoanAnalytics::for_loan(&loans[0], &config, as_of).unwrap();
        let home = LoanAnalytics::for_loan(&loans[1], &config, as_of).unwrap();

        assert_eq!(portfolio.loan_count, 2);
        assert_eq!(portfolio.active_loan_count, 2);
        assert_eq!(portfolio.total_principal, Money::from_major(1_300_000));
        assert_eq!(portfolio.total_remaining_principal, Money::from_major(1_084_151));
        assert_eq!(portfolio.total_paid_principal, car.paid_principal + home.paid_principal);
        assert_eq!(portfolio.total_paid_interest, car.paid_interest + home.paid_interest);
        assert_eq!(portfolio.total_interest, car.total_interest + home.total_interest);
        assert_eq!(portfolio.total_emi, Money::from_major(8_885 + 15_201));
        assert_eq!(portfolio.latest_debt_free_date, Some(date(2033, 12, 1)));

        // dominated by the larger home loan
        assert!(portfolio.weighted_average_rate > Rate::from_percentage(9));
        assert!(portfolio.weighted_average_rate < Rate::from_bps(925));

        let ratio = portfolio.emi_to_income_ratio(Money::from_major(100_000)).unwrap();
        assert_eq!(ratio.as_decimal(), rust_decimal_macros::dec!(0.24086));
        assert!(portfolio.emi_to_income_ratio(Money::ZERO).is_none());
    }

    #[test]
    fn test_closed_loans_excluded_from_emi() {
        let mut repaid = car_loan();
        repaid.outstanding_balance = Money::ZERO;
        let loans = vec![repaid, home_loan()];
        let portfolio = PortfolioAnalytics::aggregate(&loans, &EngineConfig::default(), date(2025, 1, 1)).unwrap();

        assert_eq!(portfolio.active_loan_count, 1);
        assert_eq!(portfolio.total_emi, Money::from_major(15_201));
        assert_eq!(portfolio.weighted_average_rate, Rate::from_percentage(9));
    }

    #[test]
    fn test_empty_portfolio() {
        let portfolio = PortfolioAnalytics::aggregate(&[], &EngineConfig::default(), date(2024, 1, 1)).unwrap();
        assert_eq!(portfolio.loan_count, 0);
        assert_eq!(portfolio.total_emi, Money::ZERO);
        assert_eq!(portfolio.weighted_average_rate, Rate::ZERO);
        assert!(portfolio.latest_debt_free_date.is_none());
    }
}
