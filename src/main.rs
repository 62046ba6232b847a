use std::path::PathBuf;

use certified_statement::{AssetPaths, FontSource, LayoutConfig, Statement};
use clap::Parser;

#[derive(Parser)]
#[command(name = "certified-statement", about = "Render a certified bank statement to PDF")]
struct Args {
    /// Statement JSON (account info and transaction lines)
    input: PathBuf,
    /// Directory holding background, banner, note, footer and stamp images
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// Layout configuration JSON overriding the built-in template
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Regular font file (TTF/OTF)
    #[arg(long)]
    font: Option<PathBuf>,
    /// Bold font file (TTF/OTF)
    #[arg(long)]
    bold_font: Option<PathBuf>,
    /// Installed font family to use when no font file is given
    #[arg(long)]
    font_family: Option<String>,
    /// Directory the PDF is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn run(args: Args) -> Result<PathBuf, certified_statement::Error> {
    let statement = Statement::from_json(&std::fs::read_to_string(&args.input)?)?;
    let config = match &args.layout {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    let paths = AssetPaths::from_dir(&args.assets)?;
    let fonts = FontSource {
        regular: args.font,
        bold: args.bold_font,
        family: args.font_family,
    };
    let output_dir = args.output_dir;
    certified_statement::render_statement_file(&statement, &paths, &fonts, &config, &output_dir)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.input.exists() {
        eprintln!("Error: file not found: {}", args.input.display());
        std::process::exit(1);
    }
    if !args.input.is_file() {
        eprintln!("Error: not a file: {}", args.input.display());
        std::process::exit(1);
    }

    match run(args) {
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
