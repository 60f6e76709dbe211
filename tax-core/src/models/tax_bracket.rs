use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::amount::{finite_amount, lenient_or_zero, parse_amount};

/// Upper limit of a bracket.
///
/// Serialized as a plain amount, or `null` for the open-ended top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Decimal>", into = "Option<Decimal>")]
pub enum BracketCeiling {
    Bounded(Decimal),
    #[default]
    Unbounded,
}

impl BracketCeiling {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Bounded(max) => Some(*max),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<Option<Decimal>> for BracketCeiling {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl From<BracketCeiling> for Option<Decimal> {
    fn from(value: BracketCeiling) -> Self {
        value.amount()
    }
}

impl fmt::Display for BracketCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Reads a ceiling. `null`, an empty string or a missing field is
/// `Some(Unbounded)`; anything that is not a finite number is `None`.
struct CeilingVisitor;

impl<'de> Visitor<'de> for CeilingVisitor {
    type Value = Option<BracketCeiling>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string, or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Some(BracketCeiling::Unbounded))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Some(BracketCeiling::Unbounded))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(BracketCeiling::Bounded(Decimal::from(v))))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(BracketCeiling::Bounded(Decimal::from(v))))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
        Ok(Decimal::from_i128(v).map(BracketCeiling::Bounded))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(finite_amount(v).map(BracketCeiling::Bounded))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.trim().is_empty() {
            return Ok(Some(BracketCeiling::Unbounded));
        }
        Ok(parse_amount(v).map(BracketCeiling::Bounded))
    }
}

fn lenient_ceiling<'de, D>(deserializer: D) -> Result<Option<BracketCeiling>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(CeilingVisitor)
}

fn unbounded() -> Option<BracketCeiling> {
    Some(BracketCeiling::Unbounded)
}

/// Wire shape of a bracket before an unreadable ceiling is resolved.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTaxBracket {
    #[serde(default, deserialize_with = "lenient_or_zero")]
    min: Decimal,
    #[serde(default = "unbounded", deserialize_with = "lenient_ceiling")]
    max: Option<BracketCeiling>,
    #[serde(default, deserialize_with = "lenient_or_zero")]
    rate_percent: Decimal,
}

impl From<RawTaxBracket> for TaxBracket {
    /// An unreadable ceiling collapses the bracket to zero width at `min`,
    /// so it taxes nothing and diagnostics report it as an inverted range.
    fn from(raw: RawTaxBracket) -> Self {
        let max = raw.max.unwrap_or_else(|| {
            warn!(min = %raw.min, "unreadable bracket ceiling, bracket will tax nothing");
            BracketCeiling::Bounded(raw.min)
        });
        Self {
            min: raw.min,
            max,
            rate_percent: raw.rate_percent,
        }
    }
}

/// A single income range taxed at one rate.
///
/// `rate_percent` is expressed in percent (`20` means 20%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTaxBracket")]
pub struct TaxBracket {
    pub min: Decimal,
    pub max: BracketCeiling,
    pub rate_percent: Decimal,
}

impl TaxBracket {
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate_percent: Decimal,
    ) -> Self {
        Self {
            min,
            max: max.into(),
            rate_percent,
        }
    }
}

/// Every bracket that applies to one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTable {
    pub tax_year: i32,
    pub brackets: Vec<TaxBracket>,
}
