use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use corelib::{OpportunityCandidate, RankedOpportunity};
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::settlement::SettlementEstimator;
use crate::strategy::classify;

/// Ranking knobs taken from [`EngineConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RankingThresholds {
    pub high_rate: f64,
    pub high_rate_limit: usize,
    pub spread: f64,
    pub profitability: f64,
}

impl From<&EngineConfig> for RankingThresholds {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            high_rate: cfg.high_rate_threshold,
            high_rate_limit: cfg.high_rate_limit,
            spread: cfg.spread_threshold,
            profitability: cfg.profitability_threshold,
        }
    }
}

/// Builds the high-rate and spread views from paired candidates.
#[derive(Debug, Clone)]
pub struct OpportunityRanker {
    thresholds: RankingThresholds,
    settlement: SettlementEstimator,
}

impl OpportunityRanker {
    pub fn new(thresholds: RankingThresholds, settlement: SettlementEstimator) -> Self {
        Self {
            thresholds,
            settlement,
        }
    }

    /// Settlement count, yield and strategy for one candidate.
    pub fn enrich(
        &self,
        candidate: &OpportunityCandidate,
        now: DateTime<FixedOffset>,
    ) -> RankedOpportunity {
        let settlement_count = self.settlement.estimate(candidate.next_funding_a, now);
        let estimated_settlement_yield = candidate
            .rate_b
            .map(|r| r.abs() * f64::from(settlement_count))
            .unwrap_or(0.0);

        let strategy = classify(candidate);
        let legs = candidate
            .rate_a
            .zip(candidate.rate_b)
            .and_then(|(a, b)| strategy.legs(a, b));

        RankedOpportunity {
            candidate: candidate.clone(),
            strategy,
            legs,
            settlement_count,
            estimated_settlement_yield,
            is_profitable: estimated_settlement_yield >= self.thresholds.profitability,
        }
    }

    /// Venue B rates with `|rate| >= high_rate`, largest first, capped at `high_rate_limit`.
    #[instrument(skip_all, fields(candidates = candidates.len()), level = "debug")]
    pub fn high_rate_view(
        &self,
        candidates: &[OpportunityCandidate],
        now: DateTime<FixedOffset>,
    ) -> Vec<RankedOpportunity> {
        let mut view: Vec<RankedOpportunity> = candidates
            .iter()
            .filter(|c| c.rate_b.is_some_and(|r| r.abs() >= self.thresholds.high_rate))
            .map(|c| self.enrich(c, now))
            .collect();

        view.sort_by(|x, y| {
            let rx = x.candidate.rate_b.map_or(0.0, f64::abs);
            let ry = y.candidate.rate_b.map_or(0.0, f64::abs);
            ry.partial_cmp(&rx)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    // Known settlement time first.
                    y.candidate
                        .next_funding_a
                        .is_some()
                        .cmp(&x.candidate.next_funding_a.is_some())
                })
                .then_with(|| x.symbol().cmp(y.symbol()))
        });
        view.truncate(self.thresholds.high_rate_limit);

        debug!(kept = view.len(), "high-rate view built");
        view
    }

    /// Paired candidates whose difference reaches `spread`, widest first.
    #[instrument(skip_all, fields(candidates = candidates.len()), level = "debug")]
    pub fn spread_view(
        &self,
        candidates: &[OpportunityCandidate],
        now: DateTime<FixedOffset>,
    ) -> Vec<RankedOpportunity> {
        let mut view: Vec<RankedOpportunity> = candidates
            .iter()
            .filter(|c| c.difference.is_some_and(|d| d >= self.thresholds.spread))
            .map(|c| self.enrich(c, now))
            .collect();

        view.sort_by(|x, y| {
            let dx = x.candidate.difference.unwrap_or(0.0);
            let dy = y.candidate.difference.unwrap_or(0.0);
            dy.partial_cmp(&dx)
                .unwrap_or(Ordering::Equal)
                .then_with(|| x.symbol().cmp(y.symbol()))
        });

        debug!(kept = view.len(), "spread view built");
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spread::rate_difference;
    use chrono::{Duration, TimeZone};
    use corelib::{Strategy, Venue};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 10, 20, 0, 0)
            .unwrap()
    }

    fn ranker() -> OpportunityRanker {
        let cfg = EngineConfig::default();
        OpportunityRanker::new((&cfg).into(), SettlementEstimator::new(cfg.clock_offset()))
    }

    fn candidate(symbol: &str, rate_a: Option<f64>, rate_b: Option<f64>) -> OpportunityCandidate {
        OpportunityCandidate {
            symbol: symbol.into(),
            rate_a,
            rate_b,
            difference: rate_difference(rate_a, rate_b),
            next_funding_a: None,
            next_funding_b: None,
        }
    }

    #[test]
    fn high_rate_view_filters_sorts_and_caps() {
        let mut candidates: Vec<_> = (0..30)
            .map(|i| candidate(&format!("S{i:02}"), None, Some(0.01 + f64::from(i) * 0.01)))
            .collect();
        candidates.push(candidate("TINY", None, Some(0.005)));
        candidates.push(candidate("NOB", Some(0.9), None));

        let view = ranker().high_rate_view(&candidates, now());

        assert_eq!(view.len(), 20);
        assert_eq!(view[0].symbol(), "S29");
        assert!(view.windows(2).all(|w| {
            w[0].candidate.rate_b.unwrap().abs() >= w[1].candidate.rate_b.unwrap().abs()
        }));
        assert!(view.iter().all(|o| o.symbol() != "TINY" && o.symbol() != "NOB"));
    }

    #[test]
    fn high_rate_ties_prefer_known_settlement_then_symbol() {
        let mut known = candidate("ZZZ", Some(0.01), Some(-0.5));
        known.next_funding_a = Some(now() + Duration::hours(8));
        let unknown = candidate("AAA", Some(0.01), Some(0.5));
        let other_unknown = candidate("BBB", None, Some(0.5));

        let view = ranker().high_rate_view(&[unknown, other_unknown, known], now());
        let symbols: Vec<&str> = view.iter().map(|o| o.symbol()).collect();
        assert_eq!(symbols, ["ZZZ", "AAA", "BBB"]);

        // 20:00 -> 04:00 tomorrow: seven hourly settlements.
        assert_eq!(view[0].settlement_count, 7);
        assert!((view[0].estimated_settlement_yield - 3.5).abs() < 1e-12);
        assert!(view[0].is_profitable);
        assert_eq!(view[1].settlement_count, 0);
        assert!(!view[1].is_profitable);
    }

    #[test]
    fn spread_view_uses_threshold_inclusively_and_ignores_unpaired() {
        let candidates = [
            candidate("EDGE", Some(0.30), Some(0.05)),
            candidate("WIDE", Some(-0.10), Some(0.60)),
            candidate("NARROW", Some(0.03), Some(-0.02)),
            candidate("SOLO", None, Some(5.0)),
        ];

        let view = ranker().spread_view(&candidates, now());
        let symbols: Vec<&str> = view.iter().map(|o| o.symbol()).collect();
        assert_eq!(symbols, ["WIDE", "EDGE"]);
        // No settlement times, no direction.
        assert!(view.iter().all(|o| o.strategy == Strategy::None && o.legs.is_none()));
    }

    #[test]
    fn spread_view_carries_strategy_when_times_are_known() {
        let mut c = candidate("ETH", Some(0.01), Some(0.40));
        c.next_funding_a = Some(now() + Duration::hours(8));
        c.next_funding_b = Some(now() + Duration::hours(1));

        let view = ranker().spread_view(&[c], now());
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].strategy, Strategy::LongAShortB);

        let legs = view[0].legs.unwrap();
        assert_eq!((legs.long_venue, legs.long_rate), (Venue::A, 0.01));
        assert_eq!((legs.short_venue, legs.short_rate), (Venue::B, 0.40));
    }
}
