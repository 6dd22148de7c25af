use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{OpportunityCandidate, PerVenue, RankedOpportunity, SizedOpportunity};

/// Everything one pipeline run produces.
///
/// A report is always complete and well-typed; a failed venue shows up as
/// empty sequences and zero counts, never as a missing report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: u64,
    pub generated_at: DateTime<FixedOffset>,

    /// Normalized contracts listed per venue.
    pub contract_counts: PerVenue<usize>,

    /// Raw entries discarded by normalization, per venue.
    pub dropped_quotes: PerVenue<usize>,

    /// Balances used for sizing (0 where the lookup failed).
    pub balances: PerVenue<f64>,

    pub high_rate_opportunities: Vec<RankedOpportunity>,
    pub spread_opportunities: Vec<RankedOpportunity>,
    pub sized_opportunities: Vec<SizedOpportunity>,

    /// Union of both venues' symbols, sorted by symbol.
    pub contracts: Vec<OpportunityCandidate>,
}

impl PipelineReport {
    /// A report with no data, e.g. when both venues were unreachable.
    pub fn empty(run_id: u64, generated_at: DateTime<FixedOffset>) -> Self {
        Self {
            run_id,
            generated_at,
            contract_counts: PerVenue::default(),
            dropped_quotes: PerVenue::default(),
            balances: PerVenue::default(),
            high_rate_opportunities: Vec::new(),
            spread_opportunities: Vec::new(),
            sized_opportunities: Vec::new(),
            contracts: Vec::new(),
        }
    }

    pub fn has_opportunities(&self) -> bool {
        !self.high_rate_opportunities.is_empty() || !self.spread_opportunities.is_empty()
    }
}
