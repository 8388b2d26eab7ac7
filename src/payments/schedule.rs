use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::payments::emi::monthly_payment;
use crate::types::LoanTerms;

/// one projected month in an amortization schedule, reported in minor units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub starting_balance: Money,
    pub scheduled_payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
}

/// full month-by-month projection from origination to payoff
///
/// Projects from the original loan terms only. It never consults the payment
/// ledger: realized splits re-amortize the live balance and will diverge from
/// this projection once actual payments deviate from the scheduled ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub rows: Vec<AmortizationRow>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate the projection; empty for degenerate terms
    pub fn generate(terms: &LoanTerms) -> Self {
        if !terms.is_valid() {
            return Self {
                terms: *terms,
                rows: Vec::new(),
                total_interest: Money::ZERO,
                total_payment: Money::ZERO,
            };
        }

        let monthly_rate = terms.annual_rate.monthly();
        let scheduled_payment = monthly_payment(terms.principal, terms.annual_rate, terms.term_months);

        // full-precision running balance; rounding happens per emitted row
        let mut balance = terms.principal;
        let mut rows = Vec::with_capacity(terms.term_months as usize);

        for month in 1..=terms.term_months {
            let interest = Money::from_decimal(balance.as_decimal() * monthly_rate);
            let mut principal = scheduled_payment - interest;
            let mut payment = scheduled_payment;

            if month == terms.term_months {
                // final period pays off exactly what remains, absorbing
                // the rounding drift accumulated across the term
                principal = balance;
                payment = principal + interest;
            }

            balance = (balance - principal).max(Money::ZERO);

            rows.push(AmortizationRow {
                month,
                starting_balance: (balance + principal).to_minor_units(),
                scheduled_payment: payment.to_minor_units(),
                principal_portion: principal.to_minor_units(),
                interest_portion: interest.to_minor_units(),
                ending_balance: balance.to_minor_units(),
            });
        }

        let total_interest = rows
            .iter()
            .map(|r| r.interest_portion)
            .fold(Money::ZERO, |acc, x| acc + x);

        let total_payment = rows
            .iter()
            .map(|r| r.scheduled_payment)
            .fold(Money::ZERO, |acc, x| acc + x);

        Self {
            terms: *terms,
            rows,
            total_interest,
            total_payment,
        }
    }

    /// projected row for a given month (1-based)
    pub fn row(&self, month: u32) -> Option<&AmortizationRow> {
        self.rows.get(month.checked_sub(1)? as usize)
    }
}
