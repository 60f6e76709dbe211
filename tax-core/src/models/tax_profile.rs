use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::lenient;

/// Per-user deduction settings that stay the same across computations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxProfile {
    #[serde(default, deserialize_with = "lenient")]
    pub standard_deduction: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub pension_rate_percent: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub pension_annual_cap: Option<Decimal>,
}
