use serde_json::Value;

use super::{currency_of, decimal_of, result_of};
use mortgage_calc_core::format_money;

/// Print just the monthly payment, or "no result" for an incomplete loan.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let Some(result) = result_of(value) else {
        return "no result".to_string();
    };

    result
        .pointer("/summary/monthly_payment")
        .and_then(decimal_of)
        .map(|payment| format_money(payment, currency_of(result)))
        .unwrap_or_else(|| "no result".to_string())
}
