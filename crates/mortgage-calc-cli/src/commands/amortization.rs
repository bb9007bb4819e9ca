use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use mortgage_calc_core::amortization::{self, LoanForm, LoanRequest};
use mortgage_calc_core::Currency;

use crate::config::AppConfig;
use crate::input;

/// Arguments for the amortization calculation
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to a JSON or YAML loan file (ignored when loan flags are given)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount; thousands separators are fine (e.g. "200,000")
    #[arg(long, allow_hyphen_values = true)]
    pub principal: Option<String>,

    /// Number of monthly payments (e.g. 360 for 30 years)
    #[arg(long, allow_hyphen_values = true)]
    pub payments: Option<String>,

    /// Annual interest rate in percent (5.5 means 5.5%)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<String>,

    /// Display currency: DOP, USD or EUR
    #[arg(long)]
    pub currency: Option<Currency>,
}

impl AmortizeArgs {
    fn has_loan_flags(&self) -> bool {
        self.principal.is_some() || self.payments.is_some() || self.rate.is_some()
    }
}

/// A loan document is either already typed or raw form text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoanInput {
    Typed(LoanRequest),
    Form(LoanForm),
}

impl LoanInput {
    fn set_currency(&mut self, currency: Currency) {
        match self {
            LoanInput::Typed(req) => req.currency = currency,
            LoanInput::Form(form) => form.currency = currency,
        }
    }
}

pub fn run_amortize(
    args: AmortizeArgs,
    config: &AppConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut loan = if args.has_loan_flags() {
        LoanInput::Form(LoanForm::new(
            args.principal.clone().unwrap_or_default(),
            args.payments.clone().unwrap_or_default(),
            args.rate.clone().unwrap_or_default(),
            config.default_currency,
        ))
    } else if let Some(ref path) = args.input {
        loan_from_value(input::file::read_value(path)?, config.default_currency)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        loan_from_value(data, config.default_currency)?
    } else {
        return Err(
            "--principal, --payments and --rate are required (or provide --input or stdin)".into(),
        );
    };

    if let Some(currency) = args.currency {
        loan.set_currency(currency);
    }

    tracing::debug!(?loan, "amortizing");

    let output = match &loan {
        LoanInput::Typed(req) => amortization::amortize(req)?,
        LoanInput::Form(form) => amortization::amortize_form(form)?,
    };
    Ok(serde_json::to_value(output)?)
}

/// Interpret a loan document, filling in the configured currency when the
/// document does not name one.
fn loan_from_value(
    mut value: Value,
    default_currency: Currency,
) -> Result<LoanInput, Box<dyn std::error::Error>> {
    let Value::Object(ref mut map) = value else {
        return Err("loan input must be an object".into());
    };
    map.entry("currency")
        .or_insert_with(|| Value::String(default_currency.code().to_string()));

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn typed_document_is_preferred() {
        let loan = loan_from_value(
            json!({"principal": "10000", "number_of_payments": 12, "annual_interest_rate_pct": 12}),
            Currency::DOP,
        )
        .unwrap();
        match loan {
            LoanInput::Typed(req) => {
                assert_eq!(req.principal, dec!(10000));
                assert_eq!(req.currency, Currency::DOP);
            }
            other => panic!("expected typed request, got {other:?}"),
        }
    }

    #[test]
    fn form_text_falls_back_to_form() {
        let loan = loan_from_value(
            json!({"principal": "200,000", "number_of_payments": "360", "annual_interest_rate": "5.5"}),
            Currency::EUR,
        )
        .unwrap();
        match loan {
            LoanInput::Form(form) => {
                assert_eq!(form.principal, "200,000");
                assert_eq!(form.currency, Currency::EUR);
            }
            other => panic!("expected raw form, got {other:?}"),
        }
    }

    #[test]
    fn document_currency_beats_config_default() {
        let loan = loan_from_value(
            json!({"principal": "1000", "number_of_payments": 12, "annual_interest_rate_pct": 5, "currency": "USD"}),
            Currency::EUR,
        )
        .unwrap();
        let LoanInput::Typed(req) = loan else {
            panic!("expected typed request");
        };
        assert_eq!(req.currency, Currency::USD);
    }

    #[test]
    fn typed_document_with_invalid_term_is_no_result() {
        for term in [json!(-1), json!(0), json!(12.5)] {
            let loan = loan_from_value(
                json!({"principal": 100, "number_of_payments": term, "annual_interest_rate_pct": 5}),
                Currency::DOP,
            )
            .unwrap();
            let LoanInput::Typed(ref req) = loan else {
                panic!("expected typed request, got {loan:?}");
            };
            assert_eq!(req.number_of_payments, 0);

            let output = amortization::amortize(req).unwrap();
            assert!(output.result.is_none());
        }
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(loan_from_value(json!([1, 2, 3]), Currency::DOP).is_err());
    }

    #[test]
    fn flags_produce_envelope() {
        let args = AmortizeArgs {
            input: None,
            principal: Some("10,000".into()),
            payments: Some("12".into()),
            rate: Some("12".into()),
            currency: Some(Currency::USD),
        };
        let config = AppConfig {
            log_level: "warn".into(),
            log_format: LogFormat::Compact,
            default_currency: Currency::DOP,
        };
        let value = run_amortize(args, &config).unwrap();
        assert_eq!(value["result"]["currency"], "USD");
        assert_eq!(value["result"]["schedule"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn incomplete_flags_are_not_an_error() {
        let args = AmortizeArgs {
            input: None,
            principal: Some("0".into()),
            payments: Some("12".into()),
            rate: Some("5".into()),
            currency: None,
        };
        let config = AppConfig {
            log_level: "warn".into(),
            log_format: LogFormat::Compact,
            default_currency: Currency::DOP,
        };
        let value = run_amortize(args, &config).unwrap();
        assert!(value["result"].is_null());
    }
}
