use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::types::PaymentBreakdown;

/// fixed monthly installment (EMI) for a principal amortized over a term
///
/// Degenerate inputs resolve to zero rather than an error: callers treat
/// a zero installment as "nothing to pay", matching the validation rule
/// on [`crate::types::LoanTerms`].
pub fn monthly_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    if !principal.is_positive() || term_months == 0 || annual_rate.is_negative() {
        return Money::ZERO;
    }

    let monthly_rate = annual_rate.monthly();

    if monthly_rate.is_zero() {
        // straight-line, no interest
        return principal / Decimal::from(term_months);
    }

    // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)
    let r = monthly_rate;
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..term_months {
        compound *= base;
    }

    let numerator = principal.as_decimal() * r * compound;
    let denominator = compound - Decimal::ONE;

    Money::from_decimal(numerator / denominator)
}

/// split one installment against an outstanding balance into interest and
/// principal portions
///
/// The balance is re-amortized as a fresh principal over the remaining term
/// on every call; the split is NOT read off a fixed original schedule and
/// will drift from [`crate::payments::schedule`] once real payments deviate
/// from the projection. Results are reported in minor units (2 dp) since
/// the ledger allocates against them directly.
pub fn payment_breakdown(
    outstanding_balance: Money,
    annual_rate: Rate,
    remaining_term_months: u32,
) -> PaymentBreakdown {
    if !outstanding_balance.is_positive()
        || remaining_term_months == 0
        || annual_rate.is_negative()
    {
        return PaymentBreakdown::default();
    }

    let emi = monthly_payment(outstanding_balance, annual_rate, remaining_term_months);
    let interest = Money::from_decimal(outstanding_balance.as_decimal() * annual_rate.monthly());
    let principal = emi - interest;

    PaymentBreakdown {
        monthly_payment: emi.to_minor_units(),
        interest_portion: interest.to_minor_units(),
        principal_portion: principal.to_minor_units(),
    }
}
