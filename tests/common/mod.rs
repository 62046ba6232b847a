#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use certified_statement::assets::{AssetDims, ImageDims};
use certified_statement::layout::{DrawOp, LayoutContext, Page, Typefaces};
use certified_statement::model::{AccountInfo, SummaryAdjustments, TransactionLine};
use certified_statement::text_fit::TextMeasure;
use certified_statement::{LayoutConfig, Statement};

/// Every character advances by `em` times the font size.
pub struct FixedAdvance {
    pub em: f32,
}

impl TextMeasure for FixedAdvance {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * self.em
    }
}

pub static HALF_EM: FixedAdvance = FixedAdvance { em: 0.5 };

pub fn typefaces() -> Typefaces<'static> {
    Typefaces {
        regular: &HALF_EM,
        bold: &HALF_EM,
    }
}

pub fn asset_dims() -> AssetDims {
    AssetDims {
        background: ImageDims::new(600, 848),
        banner: Some(ImageDims::new(600, 80)),
        note: ImageDims::new(600, 60),
        footer: ImageDims::new(600, 30),
        stamp: ImageDims::new(200, 200),
    }
}

pub fn context<'a>(config: &'a LayoutConfig, images: &'a AssetDims) -> LayoutContext<'a> {
    LayoutContext {
        config,
        fonts: typefaces(),
        images,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn issued_at() -> NaiveDateTime {
    date(2024, 5, 1).and_hms_opt(9, 30, 0).unwrap()
}

pub fn account() -> AccountInfo {
    AccountInfo {
        account_number: "0123-456789-01".to_string(),
        name: "Layla Haddad".to_string(),
        account_type: "Current".to_string(),
        currency: "SAR".to_string(),
        branch: "Riyadh Main".to_string(),
        period: "2024-01-01 - 2024-03-31".to_string(),
    }
}

/// `count` rows whose first narrative is `row000`, `row001`, ...
pub fn statement_with_rows(count: usize) -> Statement {
    let lines = (0..count)
        .map(|i| {
            let amount = Decimal::new(1000 + i as i64, 2);
            let mut line = TransactionLine::new(amount, date(2024, 1, 1));
            line.narrative1 = format!("row{i:03}");
            line
        })
        .collect();
    Statement {
        account: account(),
        lines,
        adjustments: SummaryAdjustments::default(),
    }
}

pub fn texts(page: &Page) -> Vec<&str> {
    page.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
