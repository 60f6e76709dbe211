use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use tax_core::{BracketTable, FilingDraft, LedgerSummary, TaxComputationInput, TaxProfile};
use tax_data::{TaxBracketLoader, TransactionLoader};
use tracing::{debug, info};

use crate::config::FileConfig;
use crate::render::{render_json, render_text};
use crate::utils::parse_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Estimate progressive income tax for a freelancer.
///
/// Income comes from `--gross-income`, a transaction ledger (`--ledger`) or a
/// full JSON computation input (`--input`). Brackets come from a CSV table.
#[derive(Debug, Parser)]
#[command(name = "tax-estimate", version, about, long_about = None)]
pub struct Cli {
    /// TOML file with default settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// CSV bracket table (`tax_year,min_income,max_income,rate_percent`).
    #[arg(long)]
    pub brackets: Option<PathBuf>,

    /// Tax year to compute. Defaults to the current calendar year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Gross income for the year.
    #[arg(long, value_parser = parse_decimal, conflicts_with_all = ["ledger", "input"])]
    pub gross_income: Option<Decimal>,

    /// CSV transaction ledger to derive income and expenses from.
    #[arg(long, conflicts_with = "input")]
    pub ledger: Option<PathBuf>,

    /// JSON document holding a complete computation input.
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long, value_parser = parse_decimal)]
    pub standard_deduction: Option<Decimal>,

    /// Deductions on top of the standard deduction and ledger expenses.
    #[arg(long, value_parser = parse_decimal)]
    pub additional_deductions: Option<Decimal>,

    /// Statutory pension contribution in percent of gross income.
    #[arg(long, value_parser = parse_decimal)]
    pub pension_rate: Option<Decimal>,

    /// Annual cap on the pension contribution.
    #[arg(long, value_parser = parse_decimal)]
    pub pension_cap: Option<Decimal>,

    /// Reject bracket tables with gaps, overlaps or other issues.
    #[arg(long)]
    pub strict: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level or filter directive (overridden by RUST_LOG).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Command-line flags merged over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub brackets: Option<PathBuf>,
    pub tax_year: i32,
    pub strict: bool,
    pub profile: TaxProfile,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(
        cli: &Cli,
        file: FileConfig,
    ) -> Self {
        let file_profile = TaxProfile::from(file.profile);
        let profile = TaxProfile {
            standard_deduction: cli.standard_deduction.or(file_profile.standard_deduction),
            pension_rate_percent: cli.pension_rate.or(file_profile.pension_rate_percent),
            pension_annual_cap: cli.pension_cap.or(file_profile.pension_annual_cap),
        };

        Self {
            brackets: cli.brackets.clone().or(file.brackets),
            tax_year: cli
                .year
                .or(file.tax_year)
                .unwrap_or_else(|| Local::now().year()),
            strict: cli.strict || file.strict.unwrap_or(false),
            profile,
            log_level: cli.log_level.clone().or(file.log_level),
            log_file: cli.log_file.clone().or(file.log_file),
        }
    }

    /// Reads `--config` when given, then merges.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(cli, file))
    }
}

/// Computation input plus the ledger it was derived from, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInput {
    pub input: TaxComputationInput,
    pub ledger: Option<LedgerSummary>,
}

fn load_bracket_table(
    path: &Path,
    tax_year: i32,
    strict: bool,
) -> Result<BracketTable> {
    let file =
        File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let records = TaxBracketLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
    let table = TaxBracketLoader::table_for_year(&records, tax_year, strict)
        .with_context(|| format!("Failed to load brackets from: {}", path.display()))?;
    debug!(tax_year, brackets = table.brackets.len(), "loaded bracket table");
    Ok(table)
}

fn require_brackets(
    settings: &Settings,
) -> Result<BracketTable> {
    match &settings.brackets {
        Some(path) => load_bracket_table(path, settings.tax_year, settings.strict),
        None => bail!(
            "no bracket table given; pass --brackets or set `brackets` in the config file"
        ),
    }
}

fn add_deductions(
    base: Option<Decimal>,
    extra: Option<Decimal>,
) -> Option<Decimal> {
    match (base, extra) {
        (Some(base), Some(extra)) => Some(base.saturating_add(extra)),
        (base, extra) => base.or(extra),
    }
}

/// Builds the computation input from whichever income source was given.
pub fn prepare_input(
    cli: &Cli,
    settings: &Settings,
) -> Result<PreparedInput> {
    if let Some(path) = &cli.input {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        let mut input: TaxComputationInput = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON input: {}", path.display()))?;

        if input.brackets.is_empty() {
            input.brackets = require_brackets(settings)?.brackets;
        }

        // flags win over the document, the config profile fills what is left
        let profile = &settings.profile;
        input.standard_deduction = cli
            .standard_deduction
            .or(input.standard_deduction)
            .or(profile.standard_deduction);
        input.pension_rate_percent = cli
            .pension_rate
            .or(input.pension_rate_percent)
            .or(profile.pension_rate_percent);
        input.pension_annual_cap = cli
            .pension_cap
            .or(input.pension_annual_cap)
            .or(profile.pension_annual_cap);
        input.additional_deductions = cli.additional_deductions.or(input.additional_deductions);

        return Ok(PreparedInput {
            input,
            ledger: None,
        });
    }

    let table = require_brackets(settings)?;

    if let Some(path) = &cli.ledger {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let transactions = TransactionLoader::parse(file)
            .with_context(|| format!("Failed to parse ledger: {}", path.display()))?;
        let ledger = LedgerSummary::from_transactions(&transactions, settings.tax_year);
        info!(
            tax_year = settings.tax_year,
            transactions = ledger.transaction_count,
            income = %ledger.total_income,
            "summarized ledger"
        );

        let mut input = ledger.to_input(table.brackets, &settings.profile);
        input.additional_deductions =
            add_deductions(input.additional_deductions, cli.additional_deductions);

        return Ok(PreparedInput {
            input,
            ledger: Some(ledger),
        });
    }

    let Some(gross_income) = cli.gross_income else {
        bail!("no income given; pass --gross-income, --ledger or --input");
    };

    Ok(PreparedInput {
        input: TaxComputationInput {
            gross_income: Some(gross_income),
            additional_deductions: cli.additional_deductions,
            standard_deduction: settings.profile.standard_deduction,
            brackets: table.brackets,
            pension_rate_percent: settings.profile.pension_rate_percent,
            pension_annual_cap: settings.profile.pension_annual_cap,
        },
        ledger: None,
    })
}

/// Runs one estimate and returns the rendered output.
pub fn run(
    cli: &Cli,
    settings: &Settings,
) -> Result<String> {
    let prepared = prepare_input(cli, settings)?;
    let draft = FilingDraft::new(settings.tax_year, prepared.input);
    info!(
        tax_year = draft.tax_year,
        tax_owed = %draft.result.tax_owed,
        "estimate computed"
    );

    match cli.format {
        OutputFormat::Text => Ok(render_text(&draft, prepared.ledger.as_ref())),
        OutputFormat::Json => {
            let json = render_json(&draft, prepared.ledger.as_ref())
                .context("Failed to serialize estimate")?;
            Ok(json + "\n")
        }
    }
}
