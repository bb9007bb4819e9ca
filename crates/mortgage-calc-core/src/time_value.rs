use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MortgageCalcError;
use crate::types::{Money, Rate};
use crate::MortgageCalcResult;

/// Payment periods per year. Every loan is treated as a monthly mortgage.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Convert an annual percentage (5.5 meaning 5.5%) into the monthly rate.
pub fn periodic_rate(annual_rate_pct: Decimal) -> Rate {
    annual_rate_pct / dec!(100) / Decimal::from(PERIODS_PER_YEAR)
}

/// Compound growth factor `(1 + rate)^nper`.
pub fn compound_factor(rate: Rate, nper: u32) -> MortgageCalcResult<Decimal> {
    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| MortgageCalcError::overflow("compound factor base"))?;

    one_plus_r
        .checked_powu(u64::from(nper))
        .ok_or_else(|| MortgageCalcError::overflow(format!("compound factor (1 + r)^{nper}")))
}

/// Level payment that retires `principal` over `nper` periods at `rate`.
///
/// Returned as a positive amount, unlike spreadsheet PMT.
pub fn level_payment(principal: Money, rate: Rate, nper: u32) -> MortgageCalcResult<Money> {
    if nper == 0 {
        return Err(MortgageCalcError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_denominator = factor - Decimal::ONE;

    if annuity_denominator.is_zero() {
        return Err(MortgageCalcError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    // x / (x - 1) stays near 1, so only a payment that is itself out of
    // range can overflow here.
    let annuity_ratio = factor
        .checked_div(annuity_denominator)
        .ok_or_else(|| MortgageCalcError::overflow("level payment annuity ratio"))?;

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(annuity_ratio))
        .ok_or_else(|| MortgageCalcError::overflow("level payment"))
}
