use mortgage_calc_core::amortization::{self, LoanForm, LoanRequest};
use mortgage_calc_core::{Currency, MortgageCalcError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const EPSILON: Decimal = dec!(0.01);

fn loan(principal: Decimal, n: u32, pct: Decimal) -> LoanRequest {
    LoanRequest {
        principal,
        number_of_payments: n,
        annual_interest_rate_pct: pct,
        currency: Currency::USD,
    }
}

// ===========================================================================
// Known-answer scenarios
// ===========================================================================

#[test]
fn test_thirty_year_mortgage_known_answer() {
    let result = amortization::calculate(&loan(dec!(200000), 360, dec!(5.5)))
        .unwrap()
        .expect("complete request");

    let s = &result.summary;
    assert!(
        (s.periodic_rate - dec!(0.0045833333)).abs() < dec!(0.0000000001),
        "Expected periodic rate ~0.004583, got {}",
        s.periodic_rate
    );
    assert!(
        (s.monthly_payment - dec!(1135.58)).abs() < EPSILON,
        "Expected payment ~1135.58, got {}",
        s.monthly_payment
    );

    let first = &result.schedule[0];
    assert!((first.interest_portion - dec!(916.67)).abs() < EPSILON);
    assert!((first.principal_portion - dec!(218.91)).abs() < EPSILON);

    let last = &result.schedule[359];
    assert_eq!(last.payment_index, 360);
    assert!(
        last.remaining_balance.abs() < EPSILON,
        "Expected final balance ~0, got {}",
        last.remaining_balance
    );
}

#[test]
fn test_one_year_loan_known_answer() {
    let result = amortization::calculate(&loan(dec!(10000), 12, dec!(12)))
        .unwrap()
        .unwrap();

    assert_eq!(result.summary.periodic_rate, dec!(0.01));
    assert!((result.summary.monthly_payment - dec!(888.49)).abs() < EPSILON);
    assert!((result.summary.total_interest_paid - dec!(661.85)).abs() < EPSILON);
    assert_eq!(result.currency, Currency::USD);
}

// ===========================================================================
// Schedule invariants
// ===========================================================================

#[test]
fn test_schedule_invariants_across_loans() {
    let loans = [
        loan(dec!(200000), 360, dec!(5.5)),
        loan(dec!(10000), 12, dec!(12)),
        loan(dec!(3500000), 240, dec!(11.75)),
        loan(dec!(750), 3, dec!(0.5)),
        loan(dec!(1), 1, dec!(30)),
    ];

    for req in &loans {
        let result = amortization::calculate(req).unwrap().unwrap();
        let s = &result.summary;

        assert_eq!(result.schedule.len(), req.number_of_payments as usize);

        let mut previous_balance = req.principal;
        let mut interest_sum = Decimal::ZERO;
        for (i, row) in result.schedule.iter().enumerate() {
            assert_eq!(row.payment_index, i as u32 + 1);
            assert_eq!(row.payment_amount, s.monthly_payment);
            assert!(
                (row.principal_portion + row.interest_portion - row.payment_amount).abs() < EPSILON
            );
            assert!(
                row.remaining_balance < previous_balance,
                "Balance must fall every period (row {})",
                row.payment_index
            );
            previous_balance = row.remaining_balance;
            interest_sum += row.interest_portion;
        }

        let last = result.schedule.last().unwrap();
        assert!(last.remaining_balance.abs() < EPSILON);

        let expected_interest =
            s.monthly_payment * Decimal::from(req.number_of_payments) - req.principal;
        assert!((s.total_interest_paid - expected_interest).abs() < EPSILON);
        assert!((s.total_interest_paid - interest_sum).abs() < EPSILON);
    }
}

#[test]
fn test_amortization_rate_is_principal_share_of_total_paid() {
    let result = amortization::calculate(&loan(dec!(10000), 12, dec!(12)))
        .unwrap()
        .unwrap();
    let s = &result.summary;

    let expected = s.principal / (s.monthly_payment * dec!(12)) * dec!(100);
    assert!((s.amortization_rate - expected).abs() < dec!(0.0001));
    // 10000 / 10661.85 ≈ 93.79%
    assert!((s.amortization_rate - dec!(93.79)).abs() < EPSILON);
    assert!(s.amortization_rate < dec!(100));
}

#[test]
fn test_calculate_is_deterministic() {
    let req = loan(dec!(185000), 180, dec!(6.125));
    let first = amortization::calculate(&req).unwrap().unwrap();
    let second = amortization::calculate(&req).unwrap().unwrap();
    assert_eq!(first, second);
}

// ===========================================================================
// No-result handling
// ===========================================================================

#[test]
fn test_invalid_requests_yield_no_result() {
    let cases = [
        loan(Decimal::ZERO, 360, dec!(5.5)),
        loan(dec!(-100), 10, dec!(5)),
        loan(dec!(100), 0, dec!(5)),
        loan(dec!(100), 10, Decimal::ZERO),
        loan(dec!(100), 10, dec!(-3)),
    ];
    for req in &cases {
        assert_eq!(amortization::calculate(req).unwrap(), None);
    }
}

#[test]
fn test_form_with_grouping_separators() {
    let form = LoanForm::new("200,000", "360", "5.5", Currency::EUR);
    let result = amortization::calculate_form(&form).unwrap().unwrap();
    assert_eq!(result.summary.principal, dec!(200000));
    assert_eq!(result.currency, Currency::EUR);
    assert!((result.summary.monthly_payment - dec!(1135.58)).abs() < EPSILON);
}

#[test]
fn test_form_with_unparseable_fields_yields_no_result() {
    let forms = [
        LoanForm::new("", "360", "5.5", Currency::DOP),
        LoanForm::new("200,000", "thirty years", "5.5", Currency::DOP),
        LoanForm::new("200,000", "360", "", Currency::DOP),
        LoanForm::new("-5,000", "360", "5.5", Currency::DOP),
    ];
    for form in &forms {
        assert_eq!(amortization::calculate_form(form).unwrap(), None);
    }
}

#[test]
fn test_form_deserialises_from_json() {
    let form: LoanForm = serde_json::from_str(
        r#"{"principal": "10,000", "number_of_payments": "12", "annual_interest_rate": "12", "currency": "USD"}"#,
    )
    .unwrap();
    let result = amortization::calculate_form(&form).unwrap().unwrap();
    assert!((result.summary.monthly_payment - dec!(888.49)).abs() < EPSILON);
}

#[test]
fn test_extreme_term_reports_overflow() {
    let err = amortization::calculate(&loan(dec!(200000), 100_000, dec!(12))).unwrap_err();
    assert!(matches!(err, MortgageCalcError::NumericOverflow { .. }));
}

#[test]
fn test_tiny_principal_is_no_result_not_a_panic() {
    let req = loan(dec!(0.0000000000000000000000000001), 12, dec!(12));
    assert_eq!(amortization::calculate(&req).unwrap(), None);

    let form = LoanForm::new("0.00000000000000000000000001", "360", "5.5", Currency::DOP);
    assert_eq!(amortization::calculate_form(&form).unwrap(), None);

    let out = amortization::amortize(&req).unwrap();
    assert!(out.result.is_none());
}

#[test]
fn test_long_high_rate_loan_payment_fits() {
    // x = 1.05^1200 ≈ 2.9e25; the payment is essentially interest-only
    for principal in [dec!(250000), dec!(5000000), dec!(999999999)] {
        let result = amortization::calculate(&loan(principal, 1200, dec!(60)))
            .unwrap()
            .expect("complete request");
        let expected = principal * dec!(0.05);
        assert!(
            (result.summary.monthly_payment - expected).abs() < EPSILON,
            "Expected payment ~{}, got {}",
            expected,
            result.summary.monthly_payment
        );
        assert_eq!(result.schedule.len(), 1200);
    }
}

#[test]
fn test_residual_balance_is_flagged() {
    let out = amortization::amortize(&loan(dec!(1000), 1200, dec!(60))).unwrap();
    let last = out.result.as_ref().unwrap().schedule.last().unwrap().clone();
    assert!(last.remaining_balance.abs() >= EPSILON);
    assert!(
        out.warnings.iter().any(|w| w.contains("did not converge")),
        "Expected residual warning, got {:?}",
        out.warnings
    );
}

#[test]
fn test_typed_request_with_invalid_term_is_no_result() {
    for term in ["-1", "0", "12.5"] {
        let req: LoanRequest = serde_json::from_str(&format!(
            r#"{{"principal": 100, "number_of_payments": {term}, "annual_interest_rate_pct": 5}}"#
        ))
        .unwrap();
        assert_eq!(req.number_of_payments, 0);
        assert_eq!(amortization::calculate(&req).unwrap(), None);
    }
}

#[test]
fn test_amortize_envelope_serialises() {
    let out = amortization::amortize(&loan(dec!(10000), 12, dec!(12))).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["schedule"].as_array().unwrap().len(), 12);
    assert_eq!(json["metadata"]["precision"], "rust_decimal_128bit");

    let empty = amortization::amortize(&loan(dec!(100), 0, dec!(5))).unwrap();
    let json = serde_json::to_value(&empty).unwrap();
    assert!(json["result"].is_null());
}
