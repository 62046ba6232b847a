pub mod assets;
pub mod config;
mod error;
pub mod fonts;
pub mod layout;
pub mod model;
mod pdf;
pub mod text_fit;

pub use assets::{AssetPaths, StatementAssets, load_assets};
pub use config::LayoutConfig;
pub use error::Error;
pub use fonts::{FontSource, Fonts};
pub use model::Statement;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use layout::LayoutContext;

/// Lay out and serialize a statement whose assets and fonts are already loaded.
pub fn generate_statement(
    statement: &Statement,
    assets: &StatementAssets,
    fonts: &Fonts,
    config: &LayoutConfig,
    issued_at: NaiveDateTime,
) -> Result<Vec<u8>, Error> {
    config.validate()?;
    let images = assets.dims();
    let ctx = LayoutContext {
        config,
        fonts: fonts.into(),
        images: &images,
    };
    let pages = layout::layout_statement(statement, &ctx, issued_at);
    pdf::render(&pages, assets, fonts, config)
}

/// `certified_statement_<account>_<YYYY-MM-DD>.pdf`, with anything but
/// ASCII alphanumerics, `-` and `_` in the account number replaced by `_`.
pub fn statement_filename(account_number: &str, date: NaiveDate) -> String {
    let account: String = account_number
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("certified_statement_{account}_{}.pdf", date.format("%Y-%m-%d"))
}

/// Load assets and fonts concurrently, render, and write the PDF into
/// `output_dir`. Returns the path written.
pub fn render_statement_file(
    statement: &Statement,
    paths: &AssetPaths,
    font_source: &FontSource,
    config: &LayoutConfig,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let (assets, fonts) = rayon::join(|| load_assets(paths), || Fonts::load(font_source));
    let (assets, fonts) = (assets?, fonts?);

    let now = chrono::Local::now().naive_local();
    let bytes = generate_statement(statement, &assets, &fonts, config, now)?;

    let output = output_dir.join(statement_filename(
        &statement.account.account_number,
        now.date(),
    ));
    std::fs::write(&output, bytes)?;
    Ok(output)
}
