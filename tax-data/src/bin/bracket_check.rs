use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tax_core::calculations::inspect_brackets;
use tax_data::TaxBracketLoader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Check a bracket table CSV file for gaps, overlaps and other issues.
///
/// The CSV file should have the following columns:
/// - tax_year: The tax year (e.g., 2025)
/// - min_income: The floor of the bracket
/// - max_income: The ceiling (empty for unbounded)
/// - rate_percent: The marginal rate in percent (e.g., 12)
#[derive(Parser, Debug)]
#[command(name = "tax-bracket-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing tax bracket data
    #[arg(short, long)]
    file: PathBuf,

    /// Only check this tax year
    #[arg(short, long)]
    year: Option<i32>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = TaxBracketLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    let tables: Vec<_> = TaxBracketLoader::group_by_year(&records)
        .into_iter()
        .filter(|t| args.year.is_none_or(|year| t.tax_year == year))
        .collect();

    if tables.is_empty() {
        bail!("no bracket tables found in {}", args.file.display());
    }

    let mut total_issues = 0;
    for table in &tables {
        let issues = inspect_brackets(&table.brackets);
        if issues.is_empty() {
            info!(
                tax_year = table.tax_year,
                brackets = table.brackets.len(),
                "bracket table is contiguous"
            );
        }
        for issue in &issues {
            warn!(tax_year = table.tax_year, %issue, "bracket table issue");
        }
        total_issues += issues.len();
    }

    if total_issues > 0 {
        bail!("{total_issues} issue(s) found in {}", args.file.display());
    }

    Ok(())
}
