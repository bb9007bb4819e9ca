pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use mortgage_calc_core::Currency;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` of a computation envelope, if the calculation produced one.
fn result_of(envelope: &Value) -> Option<&Value> {
    envelope.get("result").filter(|r| !r.is_null())
}

/// Currency named in the result, falling back to the default.
fn currency_of(result: &Value) -> Currency {
    result
        .get("currency")
        .and_then(Value::as_str)
        .and_then(|code| code.parse().ok())
        .unwrap_or_default()
}

/// Decimals serialise as strings; accept plain numbers too.
fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
