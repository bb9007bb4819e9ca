use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::request::{LoanForm, LoanRequest};
use crate::error::MortgageCalcError;
use crate::time_value;
use crate::types::*;
use crate::MortgageCalcResult;

/// Largest final balance, in currency units, treated as fully repaid.
const RESIDUAL_TOLERANCE: Decimal = dec!(0.01);

const METHODOLOGY: &str = "Fixed-rate level payment amortization (monthly compounding)";
const INCOMPLETE_WARNING: &str =
    "Loan parameters incomplete: principal, term and rate must all be positive numbers";

/// One payment period of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based payment number
    pub payment_index: u32,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Outstanding principal after this payment
    pub remaining_balance: Money,
}

/// Loan-level figures computed once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub principal: Money,
    pub number_of_payments: u32,
    pub periodic_rate: Rate,
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub total_interest_paid: Money,
    /// Principal as a percentage of everything paid over the life of the loan
    pub amortization_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amortization {
    pub currency: Currency,
    pub summary: LoanSummary,
    pub schedule: Vec<AmortizationRow>,
}

/// Lazily generated amortization schedule.
///
/// Each row depends on the previous balance, so rows come out strictly in
/// payment order. Cloning gives an independent cursor; [`Schedule::rewind`]
/// starts over from the first payment.
#[derive(Debug, Clone)]
pub struct Schedule {
    principal: Money,
    rate: Rate,
    payment: Money,
    nper: u32,
    next_index: u32,
    balance: Money,
}

impl Schedule {
    fn new(principal: Money, rate: Rate, payment: Money, nper: u32) -> Self {
        Self {
            principal,
            rate,
            payment,
            nper,
            next_index: 1,
            balance: principal,
        }
    }

    pub fn payment(&self) -> Money {
        self.payment
    }

    pub fn rewind(&mut self) {
        self.next_index = 1;
        self.balance = self.principal;
    }
}

impl Iterator for Schedule {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<AmortizationRow> {
        if self.next_index > self.nper {
            return None;
        }

        // Level payment exceeds P * r, and the balance never grows, so none
        // of these steps can leave the range the payment was computed in.
        let interest_portion = self.balance * self.rate;
        let principal_portion = self.payment - interest_portion;
        self.balance -= principal_portion;

        let row = AmortizationRow {
            payment_index: self.next_index,
            payment_amount: self.payment,
            principal_portion,
            interest_portion,
            remaining_balance: self.balance,
        };
        self.next_index += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.nper + 1).saturating_sub(self.next_index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Schedule {}

/// Build the lazy schedule for a request, or `None` when the request is
/// incomplete (non-positive principal, term or rate).
pub fn schedule(request: &LoanRequest) -> MortgageCalcResult<Option<Schedule>> {
    if !request.is_complete() {
        debug!(
            principal = %request.principal,
            number_of_payments = request.number_of_payments,
            annual_rate_pct = %request.annual_interest_rate_pct,
            "loan request incomplete, no result"
        );
        return Ok(None);
    }

    let rate = request.periodic_rate();
    let payment = time_value::level_payment(request.principal, rate, request.number_of_payments)
        .inspect_err(|e| warn!(error = %e, "level payment could not be computed"))?;

    // A principal below the decimal resolution rounds the payment to zero;
    // there is nothing to amortize.
    if payment <= Decimal::ZERO {
        debug!(
            principal = %request.principal,
            "level payment rounds to zero, no result"
        );
        return Ok(None);
    }

    Ok(Some(Schedule::new(
        request.principal,
        rate,
        payment,
        request.number_of_payments,
    )))
}

/// Amortize a loan: level monthly payment, summary statistics and the full
/// payment schedule. `Ok(None)` means the request is incomplete.
pub fn calculate(request: &LoanRequest) -> MortgageCalcResult<Option<Amortization>> {
    let Some(rows) = schedule(request)? else {
        return Ok(None);
    };

    let summary = summarize(request, rows.rate, rows.payment())?;
    let schedule: Vec<AmortizationRow> = rows.collect();

    debug!(
        monthly_payment = %summary.monthly_payment,
        periods = schedule.len(),
        "amortization calculated"
    );

    Ok(Some(Amortization {
        currency: request.currency,
        summary,
        schedule,
    }))
}

/// Parse raw form text and amortize it. Unparseable fields give `Ok(None)`
/// just like out-of-range ones.
pub fn calculate_form(form: &LoanForm) -> MortgageCalcResult<Option<Amortization>> {
    match form.parse() {
        Some(request) => calculate(&request),
        None => {
            debug!("loan form has unparseable fields, no result");
            Ok(None)
        }
    }
}

/// [`calculate`] wrapped in the standard computation envelope.
pub fn amortize(
    request: &LoanRequest,
) -> MortgageCalcResult<ComputationOutput<Option<Amortization>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = calculate(request)?;

    match &output {
        None => warnings.push(INCOMPLETE_WARNING.into()),
        Some(amortization) => {
            if let Some(last) = amortization.schedule.last() {
                if last.remaining_balance.abs() >= RESIDUAL_TOLERANCE {
                    warnings.push(format!(
                        "Final balance {} did not converge to zero",
                        last.remaining_balance
                    ));
                }
            }
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        METHODOLOGY,
        &serde_json::json!({
            "principal": request.principal.to_string(),
            "number_of_payments": request.number_of_payments,
            "annual_interest_rate_pct": request.annual_interest_rate_pct.to_string(),
            "periods_per_year": time_value::PERIODS_PER_YEAR,
            "currency": request.currency.code(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// [`calculate_form`] wrapped in the standard computation envelope.
pub fn amortize_form(
    form: &LoanForm,
) -> MortgageCalcResult<ComputationOutput<Option<Amortization>>> {
    let start = Instant::now();
    if let Some(request) = form.parse() {
        return amortize(&request);
    }

    debug!("loan form has unparseable fields, no result");
    Ok(with_metadata(
        METHODOLOGY,
        form,
        vec![INCOMPLETE_WARNING.into()],
        start.elapsed().as_micros() as u64,
        None,
    ))
}

fn summarize(
    request: &LoanRequest,
    rate: Rate,
    payment: Money,
) -> MortgageCalcResult<LoanSummary> {
    let total_paid = payment
        .checked_mul(Decimal::from(request.number_of_payments))
        .ok_or_else(|| MortgageCalcError::overflow("total paid"))?;

    let principal_share = request.principal.checked_div(total_paid).ok_or_else(|| {
        MortgageCalcError::DivisionByZero {
            context: "amortization rate".into(),
        }
    })?;
    let amortization_rate = principal_share
        .checked_mul(dec!(100))
        .ok_or_else(|| MortgageCalcError::overflow("amortization rate"))?;

    Ok(LoanSummary {
        principal: request.principal,
        number_of_payments: request.number_of_payments,
        periodic_rate: rate,
        monthly_payment: payment,
        total_paid,
        total_interest_paid: total_paid - request.principal,
        amortization_rate,
    })
}
