mod common;

use std::str::FromStr;

use rust_decimal::Decimal;

use certified_statement::Statement;
use certified_statement::model::{
    SummaryAdjustments, SummaryValues, TransactionLine, format_amount, parse_amount,
    resolve_balances,
};
use certified_statement::layout::layout_statement;
use certified_statement::{LayoutConfig, statement_filename};
use common::{asset_dims, context, date, issued_at};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn lines(amounts: &[&str]) -> Vec<TransactionLine> {
    amounts
        .iter()
        .map(|a| TransactionLine::new(dec(a), date(2024, 2, 1)))
        .collect()
}

#[test]
fn running_balance_accumulates_amounts() {
    let balances = resolve_balances(&lines(&["100", "-30", "50"]));
    assert_eq!(balances, vec![dec("100"), dec("70"), dec("120")]);
}

#[test]
fn supplied_balance_reseeds_running_total() {
    let mut rows = lines(&["100", "-30", "50"]);
    rows[1].balance = Some(dec("500"));
    let balances = resolve_balances(&rows);
    assert_eq!(balances, vec![dec("100"), dec("500"), dec("550")]);
}

#[test]
fn no_rows_means_zero_book_value() {
    let values = SummaryValues::compute(&[], &SummaryAdjustments::default(), issued_at());
    assert_eq!(values.book_value, Decimal::ZERO);
    assert_eq!(values.available_balance, Decimal::ZERO);
}

#[test]
fn available_balance_applies_adjustments() {
    let balances = resolve_balances(&lines(&["100", "-30", "50"]));
    let adjustments = SummaryAdjustments {
        facilities: dec("10"),
        non_settlement_items: dec("5"),
        held_balance: dec("20"),
    };
    let values = SummaryValues::compute(&balances, &adjustments, issued_at());
    assert_eq!(values.book_value, dec("120"));
    assert_eq!(values.available_balance, dec("105"));
    assert_eq!(values.issue_date, "2024-05-01");
    assert_eq!(values.issue_time, "09:30");
}

#[test]
fn running_balance_clamps_instead_of_overflowing() {
    let json = r#"{
        "account": { "account_number": "42" },
        "lines": [
            { "amount": "50000000000000000000000000000", "posting_date": "2024-01-05" },
            { "amount": "50000000000000000000000000000", "posting_date": "2024-01-06" },
            { "amount": "-1", "posting_date": "2024-01-07" }
        ]
    }"#;
    let statement = Statement::from_json(json).unwrap();

    let balances = resolve_balances(&statement.lines);
    assert_eq!(balances[0], dec("50000000000000000000000000000"));
    assert_eq!(balances[1], Decimal::MAX);
    assert_eq!(balances[2], Decimal::MAX - Decimal::ONE);

    let config = LayoutConfig::default();
    let images = asset_dims();
    let pages = layout_statement(&statement, &context(&config, &images), issued_at());
    assert_eq!(pages.len(), 2);
}

#[test]
fn available_balance_clamps_instead_of_overflowing() {
    let adjustments = SummaryAdjustments {
        facilities: Decimal::MAX,
        non_settlement_items: Decimal::ZERO,
        held_balance: dec("1"),
    };
    let values = SummaryValues::compute(&[Decimal::MAX], &adjustments, issued_at());
    assert_eq!(values.book_value, Decimal::MAX);
    assert_eq!(values.available_balance, Decimal::MAX - Decimal::ONE);
}

#[test]
fn statement_json_accepts_loose_amounts() {
    let json = r#"{
        "account": { "account_number": "42", "name": "Test" },
        "lines": [
            { "amount": "1,250.50", "narrative1": "Salary", "posting_date": "2024-01-05" },
            { "amount": -200, "narrative1": "ATM", "narrative2": " cash ", "posting_date": "2024-01-06" },
            { "amount": "1.5E2", "posting_date": "2024-01-07", "balance": "9,999.00" },
            { "amount": "garbage", "posting_date": "2024-01-08" },
            { "amount": null, "posting_date": "2024-01-09", "reference": "REF-9" }
        ],
        "adjustments": { "held_balance": "100" }
    }"#;
    let statement = Statement::from_json(json).unwrap();
    let amounts: Vec<Decimal> = statement.lines.iter().map(|l| l.amount).collect();
    assert_eq!(
        amounts,
        vec![dec("1250.50"), dec("-200"), dec("150"), Decimal::ZERO, Decimal::ZERO]
    );
    assert_eq!(statement.lines[1].description(), "ATM cash");
    assert_eq!(statement.lines[2].balance, Some(dec("9999.00")));
    assert_eq!(statement.lines[4].reference.as_deref(), Some("REF-9"));
    assert_eq!(statement.adjustments.held_balance, dec("100"));
    assert_eq!(statement.account.currency, "");

    let balances = resolve_balances(&statement.lines);
    assert_eq!(balances.last().copied(), Some(dec("9999.00")));
}

#[test]
fn statement_json_requires_posting_date() {
    let json = r#"{ "account": {}, "lines": [ { "amount": 1 } ] }"#;
    assert!(matches!(
        Statement::from_json(json),
        Err(certified_statement::Error::Json(_))
    ));
}

#[test]
fn parse_amount_forms() {
    assert_eq!(parse_amount(" 12,345.6 "), Some(dec("12345.6")));
    assert_eq!(parse_amount("-3e1"), Some(dec("-30")));
    assert_eq!(parse_amount(""), None);
    assert_eq!(parse_amount("n/a"), None);
}

#[test]
fn format_amount_groups_thousands() {
    assert_eq!(format_amount(dec("0")), "0.00");
    assert_eq!(format_amount(dec("999.5")), "999.50");
    assert_eq!(format_amount(dec("1234567.891")), "1,234,567.89");
    assert_eq!(format_amount(dec("-1000")), "-1,000.00");
    assert_eq!(format_amount(dec("-0.001")), "0.00");
}

#[test]
fn filename_sanitizes_account_number() {
    assert_eq!(
        statement_filename("0123-456/78 9", date(2024, 3, 31)),
        "certified_statement_0123-456_78_9_2024-03-31.pdf"
    );
    assert_eq!(
        statement_filename("ACC_1", date(2024, 1, 2)),
        "certified_statement_ACC_1_2024-01-02.pdf"
    );
}
