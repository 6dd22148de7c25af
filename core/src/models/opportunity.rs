use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Venue;

/// Two venues' quotes for one symbol, paired.
///
/// Fields for a venue that does not list the symbol are `None` ("unknown"),
/// never zero. `difference` is only known when both rates are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityCandidate {
    pub symbol: String,
    pub rate_a: Option<f64>,
    pub rate_b: Option<f64>,
    pub difference: Option<f64>,
    pub next_funding_a: Option<DateTime<FixedOffset>>,
    pub next_funding_b: Option<DateTime<FixedOffset>>,
}

impl OpportunityCandidate {
    pub fn is_paired(&self) -> bool {
        self.rate_a.is_some() && self.rate_b.is_some()
    }
}

/// Direction of a market-neutral funding trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    LongAShortB,
    LongBShortA,
    /// Sign pattern has no clear direction; never sized.
    #[default]
    None,
}

impl Strategy {
    /// Strategy that goes long `venue` and short the other one.
    pub fn long(venue: Venue) -> Self {
        match venue {
            Venue::A => Strategy::LongAShortB,
            Venue::B => Strategy::LongBShortA,
        }
    }

    /// Strategy that goes short `venue` and long the other one.
    pub fn short(venue: Venue) -> Self {
        Self::long(venue.other())
    }

    pub fn is_actionable(self) -> bool {
        !matches!(self, Strategy::None)
    }

    /// Concrete leg assignment, each leg carrying its own venue's rate.
    pub fn legs(self, rate_a: f64, rate_b: f64) -> Option<StrategyLegs> {
        let (long_venue, short_venue) = match self {
            Strategy::LongAShortB => (Venue::A, Venue::B),
            Strategy::LongBShortA => (Venue::B, Venue::A),
            Strategy::None => return None,
        };
        let rate_of = |v: Venue| match v {
            Venue::A => rate_a,
            Venue::B => rate_b,
        };

        Some(StrategyLegs {
            long_venue,
            long_rate: rate_of(long_venue),
            short_venue,
            short_rate: rate_of(short_venue),
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::LongAShortB => write!(f, "long venue_a / short venue_b"),
            Strategy::LongBShortA => write!(f, "long venue_b / short venue_a"),
            Strategy::None => write!(f, "no strategy"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyLegs {
    pub long_venue: Venue,
    pub long_rate: f64,
    pub short_venue: Venue,
    pub short_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOpportunity {
    #[serde(flatten)]
    pub candidate: OpportunityCandidate,
    pub strategy: Strategy,
    /// Concrete long/short assignment; `None` when `strategy` is not actionable.
    pub legs: Option<StrategyLegs>,
    pub settlement_count: u32,
    /// `|venue B rate| × settlement_count`, in percent.
    pub estimated_settlement_yield: f64,
    pub is_profitable: bool,
}

impl RankedOpportunity {
    pub fn symbol(&self) -> &str {
        &self.candidate.symbol
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedOpportunity {
    #[serde(flatten)]
    pub ranked: RankedOpportunity,
    pub max_leverage: u32,
    pub suggested_notional: f64,
    /// Net of fees; negative when fees exceed the captured spread.
    pub expected_profit: f64,
    /// A balance or leverage lookup failed and the conservative basis was used.
    pub degraded: bool,
}

impl SizedOpportunity {
    pub fn symbol(&self) -> &str {
        self.ranked.symbol()
    }
}
