/// what-if - prepayments and a rate hike against the baseline
use chrono::NaiveDate;
use loan_sim_rs::{
    simulate_with_events, EngineConfig, Event, EventStore, LoanTerms, Money, PrepaymentEvent,
    PrepaymentFrequency, Rate, RateChangeEvent,
};
use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(log::LevelFilter::Debug).init()?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let loan = LoanTerms::builder()
        .category("home")
        .name("apartment")
        .principal(Money::from_major(1_200_000))
        .rate(Rate::from_percentage(9))
        .term_months(120)
        .start_date(start)
        .build()?;

    let prepayments = vec![
        PrepaymentEvent::one_time(loan.id, Money::from_major(200_000), NaiveDate::from_ymd_opt(2024, 12, 1).ok_or("bad date")?),
        PrepaymentEvent::recurring(loan.id, Money::from_major(50_000), start, PrepaymentFrequency::Yearly),
    ];
    let rate_changes = vec![RateChangeEvent::new(
        loan.id,
        Rate::from_percentage(10),
        NaiveDate::from_ymd_opt(2025, 12, 1).ok_or("bad date")?,
    )];

    let mut events = EventStore::new();
    let result = simulate_with_events(&loan, &prepayments, &rate_changes, &EngineConfig::default(), &mut events)?;

    println!("baseline: {} months, interest {}", result.baseline.len(), result.baseline.total_interest);
    println!("modified: {} months, interest {}", result.modified.len(), result.modified.total_interest);
    println!("interest saved: {}", result.interest_saved);
    println!("months saved: {}", result.months_saved);
    println!("debt free on: {}", result.new_debt_free_date);
    println!("emi now: {}", result.new_emi);

    for event in events.events() {
        if let Event::RateChangeApplied { month, old_emi, new_emi, .. } = event {
            println!("month {}: emi {} -> {}", month, old_emi, new_emi);
        }
    }

    Ok(())
}
