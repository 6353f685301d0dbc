use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, SimulationError};

/// calculate EMI for given parameters, rounded to `scale` decimal places
pub fn calculate_emi(principal: Money, annual_rate: Rate, months: u32, scale: u32) -> Result<Money> {
    Ok(exact_emi(principal, annual_rate, months)?.round_to_scale(scale))
}

/// EMI for re-amortizing `balance` over the months left after a rate change.
/// rounded up, so the balance is always cleared within `months`.
pub fn reamortize_emi(balance: Money, annual_rate: Rate, months: u32, scale: u32) -> Result<Money> {
    Ok(exact_emi(balance, annual_rate, months)?.ceil_to_scale(scale))
}

fn exact_emi(principal: Money, annual_rate: Rate, months: u32) -> Result<Money> {
    if !principal.is_positive() {
        return Err(SimulationError::invalid(
            "principal",
            format!("must be positive, got {}", principal),
        ));
    }
    if months == 0 {
        return Err(SimulationError::invalid("term_months", "must be at least one month"));
    }
    if annual_rate.is_negative() {
        return Err(SimulationError::invalid(
            "annual_rate",
            format!("must not be negative, got {}", annual_rate),
        ));
    }

    let r = annual_rate.monthly_rate().as_decimal();

    if r.is_zero() {
        // no interest case
        return Ok(principal / Decimal::from(months));
    }

    // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)
    let compound = (Decimal::ONE + r)
        .checked_powu(months as u64)
        .ok_or_else(|| SimulationError::CalculationError {
            message: format!("(1 + {})^{} overflows", r, months),
        })?;

    let numerator = principal.as_decimal() * r * compound;
    let denominator = compound - Decimal::ONE;

    Ok(Money::from_decimal(numerator / denominator))
}

/// months needed to pay off `balance` at a fixed EMI and rate
pub fn remaining_tenure(balance: Money, annual_rate: Rate, emi: Money) -> Result<u32> {
    if !emi.is_positive() {
        return Err(SimulationError::invalid(
            "emi",
            format!("must be positive, got {}", emi),
        ));
    }
    if annual_rate.is_negative() {
        return Err(SimulationError::invalid(
            "annual_rate",
            format!("must not be negative, got {}", annual_rate),
        ));
    }
    if !balance.is_positive() {
        return Ok(0);
    }

    let r = annual_rate.monthly_rate().as_decimal();
    let b = balance.as_decimal();
    let e = emi.as_decimal();

    if r.is_zero() {
        return months_from_decimal((b / e).ceil());
    }

    // interest alone eats the whole EMI
    if b * r >= e {
        return Err(SimulationError::StalledAmortization {
            balance,
            rate: annual_rate,
            emi,
        });
    }

    // n = -ln(1 - B*r / EMI) / ln(1 + r)
    let numerator = (Decimal::ONE - b * r / e)
        .checked_ln()
        .ok_or_else(|| SimulationError::CalculationError {
            message: format!("ln undefined for balance {} at emi {}", balance, emi),
        })?;
    let denominator = (Decimal::ONE + r)
        .checked_ln()
        .ok_or_else(|| SimulationError::CalculationError {
            message: format!("ln undefined for monthly rate {}", r),
        })?;

    let n = -numerator / denominator;

    // ln is a series approximation; absorb noise just above a whole month
    months_from_decimal((n - dec!(0.000000001)).ceil().max(Decimal::ONE))
}

fn months_from_decimal(n: Decimal) -> Result<u32> {
    n.to_u32().ok_or_else(|| SimulationError::CalculationError {
        message: format!("month count {} out of range", n),
    })
}
