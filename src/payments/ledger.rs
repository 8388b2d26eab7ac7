use chrono::{DateTime, Datelike, Utc};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::payments::emi::payment_breakdown;
use crate::state::{ClientLoanState, PaymentLedgerEntry};

/// how a real-world payment was reconciled against the scheduled split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentAllocation {
    pub amount_paid: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub new_outstanding_balance: Money,
}

/// split a payment against the current balance without mutating anything
///
/// Interest-first waterfall: the scheduled interest portion is satisfied
/// before any principal. Principal is capped at the scheduled principal
/// portion and at what is actually owed; anything paid beyond the full
/// installment is not applied. A payment below the interest portion is
/// absorbed entirely as interest.
pub fn allocate(state: &ClientLoanState, amount: Money) -> Result<PaymentAllocation> {
    if !state.current_outstanding_balance.is_positive() {
        return Err(LedgerError::LoanAlreadyPaidOff { client_id: None });
    }

    if !amount.is_positive() {
        return Err(LedgerError::InvalidPaymentAmount { amount });
    }

    let breakdown = payment_breakdown(
        state.current_outstanding_balance,
        state.terms.annual_rate,
        state.remaining_term_months(),
    );

    let (interest_paid, principal_paid) = if amount >= breakdown.interest_portion {
        let principal = (amount - breakdown.interest_portion)
            .min(breakdown.principal_portion)
            .min(state.current_outstanding_balance);
        (breakdown.interest_portion, principal)
    } else {
        // underpaid interest is absorbed, not capitalized
        (amount, Money::ZERO)
    };

    let new_outstanding_balance =
        (state.current_outstanding_balance - principal_paid).max(Money::ZERO);

    Ok(PaymentAllocation {
        amount_paid: amount,
        interest_paid,
        principal_paid,
        new_outstanding_balance,
    })
}

/// apply a payment: the only transition that mutates the outstanding balance
///
/// On success the balance and payment counter are updated and the ledger
/// entry is returned; persisting it is the caller's concern (see
/// [`crate::storage::ClientStore::append_ledger_entry`]). Nothing is
/// mutated on error.
pub fn apply_payment(
    state: &mut ClientLoanState,
    amount: Money,
    payment_date: DateTime<Utc>,
) -> Result<PaymentLedgerEntry> {
    let allocation = allocate(state, amount)?;

    state.current_outstanding_balance = allocation.new_outstanding_balance;
    state.payment_count += 1;

    Ok(PaymentLedgerEntry {
        payment_date,
        amount_paid: allocation.amount_paid,
        principal_paid: allocation.principal_paid,
        interest_paid: allocation.interest_paid,
        remaining_balance: allocation.new_outstanding_balance,
        period_month: payment_date.month(),
        period_year: payment_date.year(),
    })
}
