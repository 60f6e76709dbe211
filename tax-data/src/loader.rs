use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{BracketIssue, BracketTable, TaxBracket};
use tax_core::calculations::inspect_brackets;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("No brackets found for tax year {0}")]
    TaxYearNotFound(i32),

    #[error("Bracket table for {tax_year} is malformed: {issue}")]
    MalformedTable {
        tax_year: i32,
        #[source]
        issue: BracketIssue,
    },
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the tax brackets CSV file.
///
/// - `tax_year`: The tax year (e.g., 2025)
/// - `min_income`: The floor of this bracket
/// - `max_income`: The ceiling of this bracket (empty for unbounded)
/// - `rate_percent`: The marginal rate in percent (e.g., 12 for 12%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate_percent: Decimal,
}

impl From<&TaxBracketRecord> for TaxBracket {
    fn from(record: &TaxBracketRecord) -> Self {
        TaxBracket::new(record.min_income, record.max_income, record.rate_percent)
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket tables stored as CSV.
///
/// One file may hold several tax years; rows are grouped by `tax_year`.
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed bracket records");
        Ok(records)
    }

    /// Groups records into one table per year, ordered by year. Brackets
    /// within a table are sorted by floor.
    pub fn group_by_year(records: &[TaxBracketRecord]) -> Vec<BracketTable> {
        let mut groups: BTreeMap<i32, Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            groups
                .entry(record.tax_year)
                .or_default()
                .push(TaxBracket::from(record));
        }

        groups
            .into_iter()
            .map(|(tax_year, mut brackets)| {
                brackets.sort_by(|a, b| a.min.cmp(&b.min));
                BracketTable { tax_year, brackets }
            })
            .collect()
    }

    /// Picks the table for `tax_year`.
    ///
    /// With `strict` set, the first [`BracketIssue`] found rejects the
    /// table. Otherwise issues are only logged.
    pub fn table_for_year(
        records: &[TaxBracketRecord],
        tax_year: i32,
        strict: bool,
    ) -> Result<BracketTable, TaxBracketLoaderError> {
        let table = Self::group_by_year(records)
            .into_iter()
            .find(|t| t.tax_year == tax_year)
            .ok_or(TaxBracketLoaderError::TaxYearNotFound(tax_year))?;

        let issues = inspect_brackets(&table.brackets);
        if strict {
            if let Some(issue) = issues.into_iter().next() {
                return Err(TaxBracketLoaderError::MalformedTable { tax_year, issue });
            }
        } else {
            for issue in issues {
                warn!(tax_year, %issue, "bracket table has issues");
            }
        }

        Ok(table)
    }
}
