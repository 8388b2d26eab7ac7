use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{ClientId, ClientStatus, LoanStatus, LoanTerms};

/// mutable loan state for one client; the payment ledger is the only mutator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientLoanState {
    pub terms: LoanTerms,
    /// starts at principal, monotonically non-increasing, floor zero
    pub current_outstanding_balance: Money,
    /// count of recorded payments; drives remaining-term derivation
    pub payment_count: u32,
    /// append-only realized payment history, insertion-ordered
    pub history: Vec<PaymentLedgerEntry>,
}

impl ClientLoanState {
    /// originate loan state; balance opens at the full principal
    pub fn new(terms: LoanTerms) -> Self {
        Self {
            terms,
            current_outstanding_balance: terms.principal.max(Money::ZERO),
            payment_count: 0,
            history: Vec::new(),
        }
    }

    /// months left on the nominal term, floored at 1 so a loan that has run
    /// past its term without reaching zero still re-amortizes over one month
    pub fn remaining_term_months(&self) -> u32 {
        if self.payment_count >= self.terms.term_months {
            1
        } else {
            self.terms.term_months - self.payment_count
        }
    }

    pub fn status(&self) -> LoanStatus {
        if self.current_outstanding_balance.is_positive() {
            LoanStatus::Active
        } else {
            LoanStatus::PaidOff
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.status() == LoanStatus::PaidOff
    }

    /// total interest collected so far
    pub fn total_interest_paid(&self) -> Money {
        self.history
            .iter()
            .map(|e| e.interest_paid)
            .fold(Money::ZERO, |acc, x| acc + x)
    }

    /// total principal collected so far
    pub fn total_principal_paid(&self) -> Money {
        self.history
            .iter()
            .map(|e| e.principal_paid)
            .fold(Money::ZERO, |acc, x| acc + x)
    }

    pub fn last_payment(&self) -> Option<&PaymentLedgerEntry> {
        self.history.last()
    }
}

/// immutable record of one realized payment event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLedgerEntry {
    pub payment_date: DateTime<Utc>,
    pub amount_paid: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub remaining_balance: Money,
    pub period_month: u32,
    pub period_year: i32,
}

/// client record with an explicit schema; optional contact fields default
/// to none rather than riding along as dynamically-shaped extras
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_id: ClientId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub joined_date: DateTime<Utc>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default)]
    pub revenue: Money,
    pub loan: ClientLoanState,
}

impl ClientRecord {
    pub fn new(name: String, terms: LoanTerms, joined_date: DateTime<Utc>) -> Self {
        Self {
            client_id: Uuid::new_v4(),
            name,
            email: None,
            phone: None,
            address: None,
            joined_date,
            status: ClientStatus::Active,
            revenue: Money::ZERO,
            loan: ClientLoanState::new(terms),
        }
    }
}
