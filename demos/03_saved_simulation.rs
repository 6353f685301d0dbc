/// saved simulation - json record for the persistence layer
use chrono::NaiveDate;
use loan_sim_rs::{
    simulate, EngineConfig, LoanTerms, Money, PrepaymentEvent, PrepaymentFrequency, Rate, SimulationRecord,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let loan = LoanTerms::builder()
        .category("personal")
        .principal(Money::from_major(300_000))
        .rate(Rate::from_percentage(14))
        .term_months(36)
        .start_date(start)
        .build()?;

    let prepayments = vec![PrepaymentEvent::recurring(
        loan.id,
        Money::from_major(15_000),
        start,
        PrepaymentFrequency::Custom { interval_months: 3 },
    )];
    let result = simulate(&loan, &prepayments, &[], &EngineConfig::default())?;

    let record = SimulationRecord::new("quarterly top-up", start, &loan, &prepayments, &[], &result).without_schedules();
    println!("{}", record.to_json_pretty()?);

    Ok(())
}
