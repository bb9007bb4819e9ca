use rust_decimal::Decimal;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{currency_of, decimal_of, plain, result_of};
use mortgage_calc_core::{format_money, Currency};

const SCHEDULE_COLUMNS: [(&str, &str); 4] = [
    ("Payment", "payment_amount"),
    ("Principal", "principal_portion"),
    ("Interest", "interest_portion"),
    ("Balance", "remaining_balance"),
];

/// Summary and schedule as tables, amounts formatted in the loan currency.
pub fn print_table(value: &Value) {
    print!("{}", render(value));
}

fn render(value: &Value) -> String {
    let mut out = String::new();

    match result_of(value) {
        Some(result) => {
            let currency = currency_of(result);
            if let Some(summary) = result.get("summary") {
                out.push_str(&summary_table(summary, currency).to_string());
                out.push('\n');
            }
            if let Some(Value::Array(rows)) = result.get("schedule") {
                out.push('\n');
                out.push_str(&schedule_table(rows, currency).to_string());
                out.push('\n');
            }
        }
        None => out.push_str("No result: loan parameters incomplete\n"),
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for w in warnings.iter().filter_map(Value::as_str) {
                out.push_str(&format!("  - {}\n", w));
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        out.push_str(&format!("\nMethodology: {}\n", meth));
    }

    out
}

fn summary_table(summary: &Value, currency: Currency) -> Table {
    let money = |key: &str| {
        summary
            .get(key)
            .and_then(decimal_of)
            .map(|d| format_money(d, currency))
            .unwrap_or_default()
    };
    let percent = |key: &str, scale: u32| {
        summary
            .get(key)
            .and_then(decimal_of)
            .map(|d| format!("{}%", d.round_dp(scale)))
            .unwrap_or_default()
    };
    let monthly_rate_pct = summary
        .get("periodic_rate")
        .and_then(decimal_of)
        .map(|r| format!("{}%", (r * Decimal::ONE_HUNDRED).round_dp(4)))
        .unwrap_or_default();

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["Principal".to_string(), money("principal")]);
    builder.push_record([
        "Payments".to_string(),
        summary.get("number_of_payments").map(plain).unwrap_or_default(),
    ]);
    builder.push_record(["Monthly rate".to_string(), monthly_rate_pct]);
    builder.push_record(["Monthly payment".to_string(), money("monthly_payment")]);
    builder.push_record(["Total paid".to_string(), money("total_paid")]);
    builder.push_record(["Total interest".to_string(), money("total_interest_paid")]);
    builder.push_record(["Amortization rate".to_string(), percent("amortization_rate", 2)]);
    builder.build()
}

fn schedule_table(rows: &[Value], currency: Currency) -> Table {
    let mut builder = Builder::default();
    let mut header = vec!["No.".to_string()];
    header.extend(SCHEDULE_COLUMNS.iter().map(|(title, _)| title.to_string()));
    builder.push_record(header);

    for row in rows {
        let mut record = vec![row.get("payment_index").map(plain).unwrap_or_default()];
        record.extend(SCHEDULE_COLUMNS.iter().map(|(_, key)| {
            row.get(*key)
                .and_then(decimal_of)
                .map(|d| format_money(d, currency))
                .unwrap_or_default()
        }));
        builder.push_record(record);
    }

    builder.build()
}
