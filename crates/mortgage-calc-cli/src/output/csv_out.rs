use serde_json::Value;
use std::io;

use super::{plain, result_of};

const COLUMNS: [&str; 5] = [
    "payment_index",
    "payment_amount",
    "principal_portion",
    "interest_portion",
    "remaining_balance",
];

/// Write the schedule as CSV to stdout, one row per payment, unrounded.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_schedule(&mut wtr, value) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_schedule<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    wtr.write_record(COLUMNS)?;

    let rows = result_of(value)
        .and_then(|r| r.get("schedule"))
        .and_then(Value::as_array);

    for row in rows.into_iter().flatten() {
        let record: Vec<String> = COLUMNS
            .iter()
            .map(|col| row.get(*col).map(plain).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
