use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use loan_sim_rs::{
    calculate_emi, simulate, AmortizationSchedule, EngineConfig, LoanTerms, Money, PrepaymentEvent,
    PrepaymentFrequency, Rate, RateChangeEvent, ScheduleGenerator,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn loan(principal: i64, rate_bps: u32, term: u32) -> LoanTerms {
    LoanTerms::builder()
        .principal(Money::from_major(principal))
        .rate(Rate::from_bps(rate_bps))
        .term_months(term)
        .start_date(start())
        .build()
        .unwrap()
}

fn month(n: u32) -> NaiveDate {
    start().checked_add_months(chrono::Months::new(n - 1)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn zero_rate_emi_is_even_split(principal in 1i64..10_000_000, term in 1u32..480) {
        let emi = calculate_emi(Money::from_major(principal), Rate::ZERO, term, 0).unwrap();
        let expected = (Money::from_major(principal) / Decimal::from(term)).round_to_scale(0);
        prop_assert_eq!(emi, expected);
    }

    #[test]
    fn baseline_closes_within_term(
        principal in 10_000i64..5_000_000,
        rate_bps in 0u32..1_800,
        term in 6u32..360,
    ) {
        let loan = loan(principal, rate_bps, term);
        let schedule = AmortizationSchedule::baseline(&loan, &EngineConfig::default()).unwrap();

        prop_assert!(schedule.len() <= term as usize);
        prop_assert_eq!(schedule.entries.last().unwrap().closing_balance, Money::ZERO);
        prop_assert_eq!(schedule.total_principal, loan.principal);
        for entry in &schedule.entries {
            prop_assert_eq!(entry.principal + entry.interest, entry.emi);
        }
    }

    #[test]
    fn generation_is_idempotent(
        principal in 10_000i64..5_000_000,
        rate_bps in 0u32..1_800,
        term in 6u32..360,
        amount in 1_000i64..50_000,
        change_bps in 0u32..1_800,
    ) {
        let loan = loan(principal, rate_bps, term);
        let config = EngineConfig::default();
        let prepayments = [PrepaymentEvent::recurring(loan.id, Money::from_major(amount), month(2), PrepaymentFrequency::Monthly)];
        let changes = [RateChangeEvent::new(loan.id, Rate::from_bps(change_bps), month(term / 2 + 1))];

        let first = ScheduleGenerator::new(&loan, &config).prepayments(&prepayments).rate_changes(&changes).generate();
        let second = ScheduleGenerator::new(&loan, &config).prepayments(&prepayments).rate_changes(&changes).generate();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prepayment_never_costs_interest(
        principal in 10_000i64..5_000_000,
        rate_bps in 0u32..1_800,
        term in 6u32..360,
        share in 1u32..100,
        at in 1u32..360,
    ) {
        let loan = loan(principal, rate_bps, term);
        let amount = Money::from_major((principal * share as i64 / 100).max(1));
        let prepayments = [PrepaymentEvent::one_time(loan.id, amount, month(at.min(term)))];

        let result = simulate(&loan, &prepayments, &[], &EngineConfig::default()).unwrap();
        prop_assert!(result.months_saved >= 0);
        prop_assert!(!result.interest_saved.is_negative());
        prop_assert!(result.modified.total_interest <= result.baseline.total_interest);
    }

    #[test]
    fn recurring_prepayment_never_costs_interest(
        principal in 10_000i64..5_000_000,
        rate_bps in 0u32..1_800,
        term in 6u32..360,
        amount in 1i64..100_000,
        interval in 1u32..24,
    ) {
        let loan = loan(principal, rate_bps, term);
        let prepayments = [PrepaymentEvent::recurring(
            loan.id,
            Money::from_major(amount),
            start(),
            PrepaymentFrequency::Custom { interval_months: interval },
        )];

        let result = simulate(&loan, &prepayments, &[], &EngineConfig::default()).unwrap();
        prop_assert!(result.months_saved >= 0);
        prop_assert!(!result.interest_saved.is_negative());
    }

    #[test]
    fn same_or_lower_rate_never_costs(
        principal in 10_000i64..5_000_000,
        rate_bps in 0u32..1_800,
        term in 6u32..360,
        cut_share in 0u32..=100,
        at in 1u32..180,
    ) {
        let loan = loan(principal, rate_bps, term);
        let at = at.min((term / 2).max(1));
        // 0 keeps the rate unchanged; small shares give cuts of a few basis points
        let new_bps = rate_bps - rate_bps * cut_share / 100;
        let changes = [RateChangeEvent::new(loan.id, Rate::from_bps(new_bps), month(at))];

        let result = simulate(&loan, &[], &changes, &EngineConfig::default()).unwrap();
        prop_assert!(result.months_saved >= 0);
        prop_assert!(!result.interest_saved.is_negative());
        prop_assert!(result.modified.len() <= result.baseline.len());
    }

    #[test]
    fn rate_increase_never_saves_interest(
        principal in 10_000i64..5_000_000,
        rate_bps in 0u32..1_800,
        term in 6u32..360,
        increase_bps in 100u32..600,
        at in 1u32..180,
    ) {
        let loan = loan(principal, rate_bps, term);
        let at = at.min((term / 2).max(1));
        let changes = [RateChangeEvent::new(loan.id, Rate::from_bps(rate_bps + increase_bps), month(at))];

        let result = simulate(&loan, &[], &changes, &EngineConfig::default()).unwrap();
        prop_assert!(result.modified.total_interest >= result.baseline.total_interest);
        prop_assert_eq!(result.modified.entries.last().unwrap().closing_balance, Money::ZERO);
    }
}
