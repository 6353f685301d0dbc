/// quick start - baseline schedule for a home loan
use chrono::NaiveDate;
use loan_sim_rs::{AmortizationSchedule, EngineConfig, LoanTerms, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loan = LoanTerms::builder()
        .category("home")
        .principal(Money::from_major(1_200_000))
        .rate(Rate::from_percentage(9))
        .term_months(120)
        .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?)
        .build()?;

    let schedule = AmortizationSchedule::baseline(&loan, &EngineConfig::default())?;

    println!("emi: {}", schedule.emi);
    println!("months: {}", schedule.len());
    println!("total interest: {}", schedule.total_interest);

    for entry in schedule.entries.iter().take(3) {
        println!(
            "{:>3} {} emi {} principal {} interest {} balance {}",
            entry.month, entry.date, entry.emi, entry.principal, entry.interest, entry.closing_balance
        );
    }

    Ok(())
}
