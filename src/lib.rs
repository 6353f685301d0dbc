pub mod analytics;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod payments;
pub mod serialization;
pub mod simulation;
pub mod types;

// re-export key types
pub use analytics::{LoanAnalytics, PortfolioAnalytics};
pub use config::EngineConfig;
pub use decimal::{Money, Rate};
pub use errors::{Result, SimulationError};
pub use events::{Event, EventStore};
pub use loan::{LoanTerms, LoanTermsBuilder};
pub use payments::{
    calculate_emi, reamortize_emi, remaining_tenure, AmortizationSchedule, EventApplier, PrepaymentOccurrence,
    ScheduleEntry, ScheduleGenerator,
};
pub use serialization::{SimulationRecord, SummaryView};
pub use simulation::{simulate, simulate_with_events, SavingsAnalyzer, SimulationResult};
pub use types::{
    EventId, LoanId, PrepaymentEvent, PrepaymentFrequency, PrepaymentKind, RateChangeEvent,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
