/// portfolio - analytics across several loans with a pinned clock
use chrono::{NaiveDate, TimeZone, Utc};
use loan_sim_rs::{EngineConfig, LoanTerms, Money, PortfolioAnalytics, Rate, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().ok_or("bad time")?));

    let loans = vec![
        LoanTerms::builder()
            .category("home")
            .principal(Money::from_major(1_200_000))
            .outstanding_balance(Money::from_major(1_050_000))
            .rate(Rate::from_percentage(9))
            .term_months(120)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?)
            .build()?,
        LoanTerms::builder()
            .category("car")
            .principal(Money::from_major(600_000))
            .outstanding_balance(Money::from_major(420_000))
            .rate(Rate::from_percentage(11))
            .term_months(60)
            .start_date(NaiveDate::from_ymd_opt(2023, 7, 1).ok_or("bad date")?)
            .build()?,
    ];

    let portfolio = PortfolioAnalytics::now(&loans, &EngineConfig::default(), &time)?;

    println!("as of {}", portfolio.as_of);
    println!("loans: {} ({} active)", portfolio.loan_count, portfolio.active_loan_count);
    println!("outstanding: {}", portfolio.total_remaining_principal);
    println!("interest paid so far: {}", portfolio.total_paid_interest);
    println!("total emi: {}", portfolio.total_emi);
    println!("weighted rate: {}", portfolio.weighted_average_rate);

    if let Some(ratio) = portfolio.emi_to_income_ratio(Money::from_major(150_000)) {
        println!("emi / income: {}", ratio);
    }

    for loan in &portfolio.loans {
        println!("{}: {} remaining months, progress {}", loan.label, loan.months_remaining, loan.progress());
    }

    Ok(())
}
