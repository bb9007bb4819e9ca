use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::time_value;
use crate::types::*;

/// Loan parameters exactly as a person typed them.
///
/// Every field is free text; nothing is validated until [`LoanForm::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanForm {
    #[serde(default)]
    pub principal: String,
    #[serde(default)]
    pub number_of_payments: String,
    #[serde(default)]
    pub annual_interest_rate: String,
    #[serde(default)]
    pub currency: Currency,
}

impl LoanForm {
    pub fn new(
        principal: impl Into<String>,
        number_of_payments: impl Into<String>,
        annual_interest_rate: impl Into<String>,
        currency: Currency,
    ) -> Self {
        Self {
            principal: principal.into(),
            number_of_payments: number_of_payments.into(),
            annual_interest_rate: annual_interest_rate.into(),
            currency,
        }
    }

    /// Interpret the form text. Returns `None` when any field is not a number.
    ///
    /// Range checks (positive principal and so on) are left to the calculator
    /// so that "0" parses here but still produces no result.
    pub fn parse(&self) -> Option<LoanRequest> {
        Some(LoanRequest {
            principal: parse_amount(&self.principal)?,
            number_of_payments: parse_count(&self.number_of_payments)?,
            annual_interest_rate_pct: parse_rate(&self.annual_interest_rate)?,
            currency: self.currency,
        })
    }
}

/// Typed loan parameters for one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    /// Any JSON number or numeric string is accepted; negative or fractional
    /// terms become 0 so the request reads as incomplete.
    #[serde(deserialize_with = "deserialize_payment_count")]
    pub number_of_payments: u32,
    /// Annual rate as a percentage, 5.5 meaning 5.5%.
    pub annual_interest_rate_pct: Decimal,
    #[serde(default)]
    pub currency: Currency,
}

impl LoanRequest {
    pub fn periodic_rate(&self) -> Rate {
        time_value::periodic_rate(self.annual_interest_rate_pct)
    }

    /// True when the request carries enough to amortize: a positive
    /// principal, at least one payment and a positive monthly rate.
    pub fn is_complete(&self) -> bool {
        self.principal > Decimal::ZERO
            && self.number_of_payments > 0
            && self.periodic_rate() > Decimal::ZERO
    }
}

/// Amount text with grouping separators removed: "200,000" -> 200000.
fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();
    parse_decimal(&cleaned)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Rate text, tolerating a trailing percent sign: "5.5%" -> 5.5.
fn parse_rate(raw: &str) -> Option<Decimal> {
    parse_decimal(raw.trim().trim_end_matches('%'))
}

/// Whole number of payments. "360" and "360.0" are accepted, "12.5" is not.
fn parse_count(raw: &str) -> Option<u32> {
    parse_decimal(raw).and_then(whole_payments)
}

/// Positive whole payment count. Counts past `u32::MAX` saturate and are
/// reported as overflow by the calculator.
fn whole_payments(value: Decimal) -> Option<u32> {
    if value <= Decimal::ZERO || !value.fract().is_zero() {
        return None;
    }
    Some(value.to_u32().unwrap_or(u32::MAX))
}

fn deserialize_payment_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = <Decimal as Deserialize>::deserialize(deserializer)?;
    Ok(whole_payments(value).unwrap_or(0))
}
