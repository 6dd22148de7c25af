use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use corelib::{PerVenue, RankedOpportunity, SizedOpportunity, Venue};
use common::child_span;
use futures::stream::{self, StreamExt};
use tracing::{Instrument, Span, debug, field, instrument, warn};

use crate::config::EngineConfig;
use crate::error::Lookup;
use crate::venue::{VenueClient, bounded};

/// Leverage used when either venue's lookup failed.
pub const FALLBACK_LEVERAGE: u32 = 1;

/// Per-run memo of `(venue, symbol) -> max leverage`.
///
/// `None` records a failed lookup so it is not retried within the run.
#[derive(Debug, Default)]
pub struct LeverageCache {
    entries: HashMap<(Venue, String), Option<u32>>,
}

impl LeverageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, venue: Venue, symbol: &str) -> Option<Option<u32>> {
        self.entries.get(&(venue, symbol.to_string())).copied()
    }

    pub fn insert(&mut self, venue: Venue, symbol: &str, leverage: Option<u32>) {
        self.entries.insert((venue, symbol.to_string()), leverage);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Both venues' leverage for `symbol`; `None` where unknown or failed.
    pub fn pair(&self, symbol: &str) -> PerVenue<Option<u32>> {
        PerVenue::new(
            self.get(Venue::A, symbol).flatten(),
            self.get(Venue::B, symbol).flatten(),
        )
    }

    /// Look up every uncached `(venue, symbol)` through a pool of `width`
    /// concurrent calls, each bounded by `timeout`.
    #[instrument(skip_all, fields(requested = field::Empty, failed = field::Empty), level = "debug")]
    pub async fn resolve<'a>(
        &mut self,
        clients: &PerVenue<Arc<dyn VenueClient>>,
        symbols: impl IntoIterator<Item = &'a str>,
        timeout: Duration,
        width: usize,
    ) {
        let mut pending: Vec<(Venue, String)> = Vec::new();
        for symbol in symbols {
            for venue in Venue::ALL {
                let key = (venue, symbol.to_string());
                if !self.entries.contains_key(&key) && !pending.contains(&key) {
                    pending.push(key);
                }
            }
        }
        Span::current().record("requested", pending.len());

        let results: Vec<(Venue, String, Option<u32>)> = stream::iter(pending)
            .map(|(venue, symbol)| {
                let client = Arc::clone(clients.get(venue));
                let span = child_span("leverage_lookup");
                span.record("symbol", symbol.as_str());
                async move {
                    let what = Lookup::Leverage {
                        symbol: symbol.clone(),
                    };
                    let leverage = match bounded(venue, what, timeout, client.max_leverage(&symbol)).await {
                        Ok(0) => {
                            warn!(%venue, %symbol, "venue reported zero max leverage");
                            None
                        }
                        Ok(l) => Some(l),
                        Err(e) => {
                            warn!(error = %e, "leverage lookup failed");
                            None
                        }
                    };
                    (venue, symbol, leverage)
                }
                .instrument(span)
            })
            .buffer_unordered(width.max(1))
            .collect()
            .await;

        let failed = results.iter().filter(|(_, _, l)| l.is_none()).count();
        Span::current().record("failed", failed);

        for (venue, symbol, leverage) in results {
            self.entries.insert((venue, symbol), leverage);
        }
    }
}

/// Notional and expected profit for actionable spread opportunities.
#[derive(Debug, Clone, Copy)]
pub struct PositionSizer {
    position_ratio: f64,
    total_fee_rate: f64,
}

impl From<&EngineConfig> for PositionSizer {
    fn from(cfg: &EngineConfig) -> Self {
        Self::new(cfg.position_ratio, cfg.total_fee_rate)
    }
}

impl PositionSizer {
    pub fn new(position_ratio: f64, total_fee_rate: f64) -> Self {
        Self {
            position_ratio,
            total_fee_rate,
        }
    }

    /// Size one opportunity.
    ///
    /// Any failed lookup marks the result `degraded`: leverage collapses to
    /// [`FALLBACK_LEVERAGE`] and unknown balances count as 0.
    #[instrument(
        target = "sizer",
        skip_all,
        fields(symbol = %opportunity.symbol(), notional = field::Empty, degraded = field::Empty)
    )]
    pub fn size(
        &self,
        opportunity: &RankedOpportunity,
        balances: PerVenue<Option<f64>>,
        leverage: PerVenue<Option<u32>>,
    ) -> SizedOpportunity {
        let degraded = balances.venue_a.is_none()
            || balances.venue_b.is_none()
            || leverage.venue_a.is_none()
            || leverage.venue_b.is_none();
        let max_leverage = match (degraded, leverage.venue_a, leverage.venue_b) {
            (false, Some(a), Some(b)) => a.min(b),
            _ => FALLBACK_LEVERAGE,
        };

        let balances = balances.map(|b| b.unwrap_or(0.0));
        let scale = f64::from(max_leverage) * self.position_ratio;
        let suggested_notional = (balances.venue_a * scale).min(balances.venue_b * scale);

        let difference = opportunity.candidate.difference.unwrap_or(0.0);
        let expected_profit = suggested_notional * (difference / 100.0 - self.total_fee_rate);

        Span::current().record("notional", suggested_notional);
        Span::current().record("degraded", degraded);
        debug!(max_leverage, expected_profit, "opportunity sized");

        SizedOpportunity {
            ranked: opportunity.clone(),
            max_leverage,
            suggested_notional,
            expected_profit,
            degraded,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use corelib::{OpportunityCandidate, Strategy};
    use proptest::prelude::*;

    fn ranked(difference: f64) -> RankedOpportunity {
        RankedOpportunity {
            candidate: OpportunityCandidate {
                symbol: "X".into(),
                rate_a: Some(difference),
                rate_b: Some(0.0),
                difference: Some(difference),
                next_funding_a: None,
                next_funding_b: None,
            },
            strategy: Strategy::LongAShortB,
            legs: Strategy::LongAShortB.legs(difference, 0.0),
            settlement_count: 0,
            estimated_settlement_yield: 0.0,
            is_profitable: false,
        }
    }

    proptest! {
        #[test]
        fn notional_is_bounded_by_the_smaller_balance(
            bal_a in 0.0..1e7f64,
            bal_b in 0.0..1e7f64,
            lev_a in 1u32..125,
            lev_b in 1u32..125,
            ratio in 0.01..=1.0f64,
            difference in 0.0..5.0f64,
        ) {
            let sizer = PositionSizer::new(ratio, 0.002);
            let sized = sizer.size(
                &ranked(difference),
                PerVenue::new(Some(bal_a), Some(bal_b)),
                PerVenue::new(Some(lev_a), Some(lev_b)),
            );

            let bound = bal_a.min(bal_b) * f64::from(sized.max_leverage);
            prop_assert!(sized.suggested_notional <= bound * (1.0 + 1e-12));
            prop_assert!(sized.suggested_notional >= 0.0);
        }

        #[test]
        fn profit_sign_follows_spread_minus_fees(
            balance in 1.0..1e6f64,
            difference in 0.0..2.0f64,
            fee in 0.0..0.01f64,
        ) {
            let sizer = PositionSizer::new(0.5, fee);
            let sized = sizer.size(
                &ranked(difference),
                PerVenue::new(Some(balance), Some(balance)),
                PerVenue::new(Some(3), Some(3)),
            );

            let edge = difference / 100.0 - fee;
            if edge > 0.0 {
                prop_assert!(sized.expected_profit > 0.0);
            } else if edge < 0.0 {
                prop_assert!(sized.expected_profit < 0.0);
            }
        }
    }
}
