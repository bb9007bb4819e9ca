use napi::Result as NapiResult;
use napi_derive::napi;

use mortgage_calc_core::amortization::{self, LoanForm, LoanRequest};
use mortgage_calc_core::{format_money, Currency};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

/// Amortize a typed loan request. Returns the computation envelope as JSON;
/// an incomplete request yields `"result": null`.
#[napi]
pub fn calculate_amortization(input_json: String) -> NapiResult<String> {
    let input: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Amortize raw form text, e.g. `{"principal": "200,000", ...}`.
#[napi]
pub fn calculate_loan_form(input_json: String) -> NapiResult<String> {
    let input: LoanForm = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::amortize_form(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Format a decimal amount string for display in one of DOP, USD, EUR.
#[napi]
pub fn format_amount(amount: String, currency: String) -> NapiResult<String> {
    let value: rust_decimal::Decimal = amount.trim().parse().map_err(to_napi_error)?;
    let currency: Currency = currency.parse().map_err(to_napi_error)?;
    Ok(format_money(value, currency))
}
