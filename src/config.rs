use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::model::{BilingualLabel, Column, ColumnKey};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ColumnSpec {
    pub key: ColumnKey,
    pub width: f32,
}

impl ColumnSpec {
    fn new(key: ColumnKey, width: f32) -> Self {
        Self { key, width }
    }
}

/// Bilingual label catalogue. Primary is Arabic, secondary English.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub balance: BilingualLabel,
    pub credit: BilingualLabel,
    pub debit: BilingualLabel,
    pub description: BilingualLabel,
    pub reference: BilingualLabel,
    pub date: BilingualLabel,
    pub account_number: BilingualLabel,
    pub currency: BilingualLabel,
    pub branch: BilingualLabel,
    pub customer_name: BilingualLabel,
    pub account_type: BilingualLabel,
    pub period: BilingualLabel,
    pub book_value: BilingualLabel,
    pub facilities: BilingualLabel,
    pub non_settlement_items: BilingualLabel,
    pub held_balance: BilingualLabel,
    pub available_balance: BilingualLabel,
    pub issued_at: BilingualLabel,
    /// Shown instead of an empty account value.
    pub placeholder: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            balance: BilingualLabel::new("الرصيد", "Balance"),
            credit: BilingualLabel::new("دائن", "Credit"),
            debit: BilingualLabel::new("مدين", "Debit"),
            description: BilingualLabel::new("البيان", "Description"),
            reference: BilingualLabel::new("المرجع", "Reference"),
            date: BilingualLabel::new("التاريخ", "Date"),
            account_number: BilingualLabel::new("رقم الحساب", "Account No."),
            currency: BilingualLabel::new("العملة", "Currency"),
            branch: BilingualLabel::new("الفرع", "Branch"),
            customer_name: BilingualLabel::new("اسم العميل", "Customer Name"),
            account_type: BilingualLabel::new("نوع الحساب", "Account Type"),
            period: BilingualLabel::new("الفترة", "Period"),
            book_value: BilingualLabel::new("الرصيد الدفتري", "Book Balance"),
            facilities: BilingualLabel::new("التسهيلات", "Facilities"),
            non_settlement_items: BilingualLabel::new("مبالغ غير مسواة", "Unsettled Items"),
            held_balance: BilingualLabel::new("الرصيد المحجوز", "Held Balance"),
            available_balance: BilingualLabel::new("الرصيد المتاح", "Available Balance"),
            issued_at: BilingualLabel::new("تاريخ ووقت الإصدار", "Issue Date & Time"),
            placeholder: "-".to_string(),
        }
    }
}

impl Labels {
    pub fn column(&self, key: ColumnKey) -> &BilingualLabel {
        match key {
            ColumnKey::Balance => &self.balance,
            ColumnKey::Credit => &self.credit,
            ColumnKey::Debit => &self.debit,
            ColumnKey::Description => &self.description,
            ColumnKey::Reference => &self.reference,
            ColumnKey::Date => &self.date,
        }
    }
}

/// Every dimension of the statement template, in PDF points.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,

    // chrome
    pub side_margin: f32,
    pub banner_top_margin: f32,
    /// Top of the content area on pages without a banner.
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub footer_gap: f32,

    pub content_margin: f32,
    pub section_gap: f32,

    // account tables
    pub account_row_height: f32,
    pub compact_account_row_height: f32,
    pub compact_account_tables: bool,
    pub account_table_gap: f32,
    /// Share of each account table taken by the label column.
    pub account_label_ratio: f32,
    pub label_primary_size: f32,
    pub label_secondary_size: f32,
    pub value_font_size: f32,
    pub value_min_font_size: f32,

    // transaction table
    pub table_header_height: f32,
    pub header_primary_size: f32,
    pub header_secondary_size: f32,
    pub body_font_size: f32,
    pub body_min_font_size: f32,
    pub cell_padding: f32,
    pub line_height_factor: f32,
    /// Space kept between the last body row and the footer stack.
    pub table_bottom_gap: f32,
    pub first_page_row_cap: usize,
    pub continuation_row_cap: usize,
    pub first_page_columns: Vec<ColumnSpec>,
    pub continuation_columns: Vec<ColumnSpec>,

    // summary page
    pub stamp_width: f32,
    pub summary_gap: f32,
    pub summary_row_height: f32,
    pub summary_label_ratio: f32,
    pub summary_value_size: f32,
    pub summary_value_min_size: f32,
    pub date_strip_height: f32,
    pub date_strip_gap: f32,
    pub summary_min_top: f32,
    pub summary_footer_gap: f32,

    // strokes and fills
    pub border_width: f32,
    pub highlight_border_width: f32,
    pub border_color: [u8; 3],
    pub header_fill: [u8; 3],
    pub highlight_fill: [u8; 3],

    pub labels: Labels,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        use ColumnKey::*;
        Self {
            page_width: 595.0,
            page_height: 842.0,
            side_margin: 18.0,
            banner_top_margin: 12.0,
            top_margin: 30.0,
            bottom_margin: 10.0,
            footer_gap: 4.0,
            content_margin: 25.0,
            section_gap: 8.0,
            account_row_height: 17.0,
            compact_account_row_height: 13.0,
            compact_account_tables: false,
            account_table_gap: 12.0,
            account_label_ratio: 0.42,
            label_primary_size: 7.0,
            label_secondary_size: 5.5,
            value_font_size: 9.0,
            value_min_font_size: 5.0,
            table_header_height: 26.0,
            header_primary_size: 8.0,
            header_secondary_size: 6.5,
            body_font_size: 7.5,
            body_min_font_size: 4.5,
            cell_padding: 2.0,
            line_height_factor: 1.2,
            table_bottom_gap: 6.0,
            first_page_row_cap: 33,
            continuation_row_cap: 43,
            first_page_columns: vec![
                ColumnSpec::new(Balance, 85.0),
                ColumnSpec::new(Credit, 75.0),
                ColumnSpec::new(Debit, 75.0),
                ColumnSpec::new(Description, 170.0),
                ColumnSpec::new(Reference, 70.0),
                ColumnSpec::new(Date, 70.0),
            ],
            continuation_columns: vec![
                ColumnSpec::new(Balance, 80.0),
                ColumnSpec::new(Credit, 72.0),
                ColumnSpec::new(Debit, 72.0),
                ColumnSpec::new(Description, 166.0),
                ColumnSpec::new(Reference, 67.0),
                ColumnSpec::new(Date, 68.0),
            ],
            stamp_width: 110.0,
            summary_gap: 12.0,
            summary_row_height: 22.0,
            summary_label_ratio: 0.55,
            summary_value_size: 10.0,
            summary_value_min_size: 6.0,
            date_strip_height: 20.0,
            date_strip_gap: 8.0,
            summary_min_top: 60.0,
            summary_footer_gap: 16.0,
            border_width: 0.5,
            highlight_border_width: 1.5,
            border_color: [60, 60, 60],
            header_fill: [228, 232, 238],
            highlight_fill: [214, 234, 248],
            labels: Labels::default(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn content_left(&self) -> f32 {
        self.content_margin
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.content_margin
    }

    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_height_factor
    }

    pub fn account_row(&self) -> f32 {
        if self.compact_account_tables {
            self.compact_account_row_height
        } else {
            self.account_row_height
        }
    }

    pub fn resolve_columns(&self, specs: &[ColumnSpec]) -> Vec<Column> {
        specs
            .iter()
            .map(|spec| Column {
                key: spec.key,
                width: spec.width,
                header: self.labels.column(spec.key).clone(),
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));

        if !(self.page_width > 0.0 && self.page_height > 0.0) {
            return invalid(format!(
                "page size must be positive, got {}x{}",
                self.page_width, self.page_height
            ));
        }
        if self.first_page_row_cap == 0 || self.continuation_row_cap == 0 {
            return invalid("row caps must be at least 1".to_string());
        }
        if self.body_min_font_size <= 0.0 || self.body_min_font_size > self.body_font_size {
            return invalid(format!(
                "body font floor {} must be in (0, {}]",
                self.body_min_font_size, self.body_font_size
            ));
        }
        if self.content_width() <= self.stamp_width + self.summary_gap {
            return invalid("content area too narrow for the summary stamp".to_string());
        }
        for (name, columns) in [
            ("first_page_columns", &self.first_page_columns),
            ("continuation_columns", &self.continuation_columns),
        ] {
            if columns.is_empty() {
                return invalid(format!("{name} is empty"));
            }
            if columns.iter().any(|c| c.width <= 0.0) {
                return invalid(format!("{name} has a non-positive width"));
            }
            let total: f32 = columns.iter().map(|c| c.width).sum();
            if total > self.page_width {
                return invalid(format!(
                    "{name} total width {total} exceeds page width {}",
                    self.page_width
                ));
            }
        }
        Ok(())
    }
}
