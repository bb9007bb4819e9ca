//! Fixed-rate mortgage amortization.
//!
//! [`request`] turns raw form text into a typed [`LoanRequest`];
//! [`schedule`] derives the level payment, the summary statistics and the
//! payment-by-payment schedule from it.

pub mod request;
pub mod schedule;

pub use request::{LoanForm, LoanRequest};
pub use schedule::{
    amortize, amortize_form, calculate, calculate_form, schedule, Amortization, AmortizationRow,
    LoanSummary, Schedule,
};
