pub mod auth;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod payments;
pub mod service;
pub mod state;
pub mod storage;
pub mod types;

// re-export key types
pub use auth::{authorize, Action, AuthContext, Role};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use payments::{
    allocate, apply_payment, monthly_payment, payment_breakdown, AmortizationRow,
    AmortizationSchedule, PaymentAllocation,
};
pub use service::{LoanService, NewClient};
pub use state::{ClientLoanState, ClientRecord, PaymentLedgerEntry};
pub use storage::{ClientStore, InMemoryClientStore};
pub use types::{ClientId, ClientStatus, LoanStatus, LoanTerms, PaymentBreakdown};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
