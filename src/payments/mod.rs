pub mod amortization;
pub mod emi;
pub mod prepayment;

pub use amortization::{AmortizationSchedule, ScheduleEntry, ScheduleGenerator};
pub use emi::{calculate_emi, reamortize_emi, remaining_tenure};
pub use prepayment::{month_date, nearest_month, EventApplier, PrepaymentOccurrence};
