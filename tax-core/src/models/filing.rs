use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tax_computation::{TaxComputationInput, TaxComputationResult};
use crate::calculations::compute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingState {
    Draft,
    Submitted,
}

/// Snapshot of one computation, kept so the user can revisit it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingDraft {
    pub tax_year: i32,
    pub state: FilingState,
    pub input: TaxComputationInput,
    pub result: TaxComputationResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilingDraft {
    /// Computes `input` and wraps it in a new draft.
    pub fn new(
        tax_year: i32,
        input: TaxComputationInput,
    ) -> Self {
        let result = compute(&input);
        let now = Utc::now();
        Self {
            tax_year,
            state: FilingState::Draft,
            input,
            result,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the input and recomputes. Submitted filings are left untouched
    /// and `false` is returned.
    pub fn revise(
        &mut self,
        input: TaxComputationInput,
    ) -> bool {
        if self.state == FilingState::Submitted {
            return false;
        }
        self.result = compute(&input);
        self.input = input;
        self.updated_at = Utc::now();
        true
    }

    pub fn submit(&mut self) {
        self.state = FilingState::Submitted;
        self.updated_at = Utc::now();
    }
}
