use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Error;

/// One ledger entry as delivered by the statement-line service.
#[derive(Clone, Debug, Deserialize)]
pub struct TransactionLine {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Decimal,
    #[serde(default)]
    pub narrative1: String,
    #[serde(default)]
    pub narrative2: String,
    #[serde(default)]
    pub narrative3: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub posting_date: NaiveDate,
    /// Running balance after this entry, when the source already computed it.
    #[serde(default, deserialize_with = "lenient_balance")]
    pub balance: Option<Decimal>,
}

impl TransactionLine {
    pub fn new(amount: Decimal, posting_date: NaiveDate) -> Self {
        Self {
            amount,
            narrative1: String::new(),
            narrative2: String::new(),
            narrative3: String::new(),
            reference: None,
            posting_date,
            balance: None,
        }
    }

    /// Non-empty narrative fields joined by a single space.
    pub fn description(&self) -> String {
        [&self.narrative1, &self.narrative2, &self.narrative3]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccountInfo {
    pub account_number: String,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    pub branch: String,
    /// Pre-formatted date range, e.g. "2024-01-01 - 2024-03-31".
    pub period: String,
}

/// Figures that feed the summary table but do not come from the ledger rows.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SummaryAdjustments {
    #[serde(deserialize_with = "lenient_amount")]
    pub facilities: Decimal,
    #[serde(deserialize_with = "lenient_amount")]
    pub non_settlement_items: Decimal,
    #[serde(deserialize_with = "lenient_amount")]
    pub held_balance: Decimal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Statement {
    pub account: AccountInfo,
    #[serde(default)]
    pub lines: Vec<TransactionLine>,
    #[serde(default)]
    pub adjustments: SummaryAdjustments,
}

impl Statement {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SummaryValues {
    pub book_value: Decimal,
    pub facilities: Decimal,
    pub non_settlement_items: Decimal,
    pub held_balance: Decimal,
    pub available_balance: Decimal,
    pub issue_date: String,
    pub issue_time: String,
}

impl SummaryValues {
    /// `balances` are the resolved per-row balances; the last one is the book value.
    pub fn compute(
        balances: &[Decimal],
        adjustments: &SummaryAdjustments,
        issued_at: NaiveDateTime,
    ) -> Self {
        let book_value = balances.last().copied().unwrap_or(Decimal::ZERO);
        let available_balance = book_value
            .checked_add(adjustments.facilities)
            .and_then(|v| v.checked_sub(adjustments.non_settlement_items))
            .and_then(|v| v.checked_sub(adjustments.held_balance))
            .unwrap_or_else(|| {
                log::warn!("Available balance overflows; clamped");
                book_value
                    .saturating_add(adjustments.facilities)
                    .saturating_sub(adjustments.non_settlement_items)
                    .saturating_sub(adjustments.held_balance)
            });
        Self {
            book_value,
            facilities: adjustments.facilities,
            non_settlement_items: adjustments.non_settlement_items,
            held_balance: adjustments.held_balance,
            available_balance,
            issue_date: issued_at.format("%Y-%m-%d").to_string(),
            issue_time: issued_at.format("%H:%M").to_string(),
        }
    }
}

/// Balance after each row. Supplied balances win and re-seed the running total;
/// rows without one get the running total of `amount` starting from zero.
/// A total that leaves the `Decimal` range is clamped to its bounds.
pub fn resolve_balances(lines: &[TransactionLine]) -> Vec<Decimal> {
    lines
        .iter()
        .scan(Decimal::ZERO, |running, line| {
            *running = match line.balance {
                Some(balance) => balance,
                None => running.checked_add(line.amount).unwrap_or_else(|| {
                    log::warn!("Running balance overflows at {}; clamped", line.posting_date);
                    running.saturating_add(line.amount)
                }),
            };
            Some(*running)
        })
        .collect()
}

/// The six semantic columns of the transaction table, in left-to-right order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKey {
    Balance,
    Credit,
    Debit,
    Description,
    Reference,
    Date,
}

impl ColumnKey {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKey::Balance | ColumnKey::Credit | ColumnKey::Debit)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BilingualLabel {
    pub primary: String,
    pub secondary: String,
}

impl BilingualLabel {
    pub fn new(primary: &str, secondary: &str) -> Self {
        Self {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        }
    }
}

/// A resolved table column: fixed width plus its two-language header.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub key: ColumnKey,
    pub width: f32,
    pub header: BilingualLabel,
}

/// Parse an amount as it arrives from upstream services: plain, with `,`
/// thousands grouping, or in scientific notation.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

fn amount_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_amount(&n.to_string()),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(Decimal::ZERO);
    }
    Ok(amount_from_value(&value).unwrap_or_else(|| {
        log::warn!("Malformed amount {value} treated as zero");
        Decimal::ZERO
    }))
}

fn lenient_balance<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(amount_from_value(&value).unwrap_or_else(|| {
        log::warn!("Malformed balance {value} treated as zero");
        Decimal::ZERO
    })))
}

/// Two decimals with `,` thousands grouping, e.g. `-1,234,567.50`.
pub fn format_amount(value: Decimal) -> String {
    let fixed = format!("{:.2}", value.abs().round_dp(2));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !value.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}
