pub mod emi;
pub mod ledger;
pub mod schedule;

pub use emi::{monthly_payment, payment_breakdown};
pub use ledger::{allocate, apply_payment, PaymentAllocation};
pub use schedule::{AmortizationRow, AmortizationSchedule};
