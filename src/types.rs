use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};

/// unique identifier for a client
pub type ClientId = Uuid;

/// loan terms fixed at origination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate,
            term_months,
        }
    }

    /// degenerate terms produce zero-valued calculations rather than errors
    pub fn is_valid(&self) -> bool {
        self.principal.is_positive() && self.term_months > 0 && !self.annual_rate.is_negative()
    }
}

/// loan lifecycle status, derived from the outstanding balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// outstanding balance above zero, payments accepted
    Active,
    /// balance reached zero; terminal, no further payments
    PaidOff,
}

/// client account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
}

/// theoretical split of the next installment against a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaymentBreakdown {
    pub monthly_payment: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
}

impl PaymentBreakdown {
    pub fn is_zero(&self) -> bool {
        self.monthly_payment.is_zero()
            && self.interest_portion.is_zero()
            && self.principal_portion.is_zero()
    }
}
