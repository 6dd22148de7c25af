use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use common::{TraceId, root_span, warn_if_slow};
use corelib::{PerVenue, PipelineReport, RawQuote, Venue};
use tracing::{Instrument, info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{ConfigError, Lookup};
use crate::normalizer::QuoteNormalizer;
use crate::ranker::OpportunityRanker;
use crate::settlement::SettlementEstimator;
use crate::sizer::{LeverageCache, PositionSizer};
use crate::spread::pair_quotes;
use crate::venue::{VenueClient, bounded};

/// One end-to-end evaluation: fetch, normalize, pair, rank, size.
///
/// Holds no state between runs. Every upstream failure is contained and the
/// run still yields a complete [`PipelineReport`].
pub struct Pipeline {
    config: EngineConfig,
    clients: PerVenue<Arc<dyn VenueClient>>,
    normalizer: QuoteNormalizer,
    ranker: OpportunityRanker,
    sizer: PositionSizer,
}

impl Pipeline {
    pub fn new(
        config: EngineConfig,
        venue_a: Arc<dyn VenueClient>,
        venue_b: Arc<dyn VenueClient>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for (expected, client) in [(Venue::A, &venue_a), (Venue::B, &venue_b)] {
            if client.venue() != expected {
                return Err(ConfigError::VenueMismatch {
                    expected,
                    actual: client.venue(),
                });
            }
        }

        let offset = config.clock_offset();
        Ok(Self {
            normalizer: QuoteNormalizer::new(offset, config.funding_interval_hours),
            ranker: OpportunityRanker::new((&config).into(), SettlementEstimator::new(offset)),
            sizer: PositionSizer::from(&config),
            clients: PerVenue::new(venue_a, venue_b),
            config,
        })
    }

    /// Run against the wall clock, read in the configured offset.
    pub async fn run_now(&self, run_id: u64) -> PipelineReport {
        let now = Utc::now().with_timezone(&self.config.clock_offset());
        self.run(run_id, now).await
    }

    pub async fn run(&self, run_id: u64, now: DateTime<FixedOffset>) -> PipelineReport {
        let trace_id = TraceId::new();
        let span = root_span("pipeline_run", &trace_id);
        span.record("run_id", run_id);

        let budget = self.config.lookup_timeout * 2;
        warn_if_slow("pipeline_run", budget, self.evaluate(run_id, now))
            .instrument(span)
            .await
    }

    async fn evaluate(&self, run_id: u64, now: DateTime<FixedOffset>) -> PipelineReport {
        let now = now.with_timezone(&self.config.clock_offset());

        let (snapshot_a, snapshot_b, balance_a, balance_b) = tokio::join!(
            self.snapshot(Venue::A),
            self.snapshot(Venue::B),
            self.balance(Venue::A),
            self.balance(Venue::B),
        );

        let normalized_a = self.normalizer.normalize(Venue::A, &snapshot_a);
        let normalized_b = self.normalizer.normalize(Venue::B, &snapshot_b);

        let contracts = pair_quotes(&normalized_a.quotes, &normalized_b.quotes);
        let high_rate = self.ranker.high_rate_view(&contracts, now);
        let spread = self.ranker.spread_view(&contracts, now);

        let actionable: Vec<_> = spread.iter().filter(|o| o.strategy.is_actionable()).collect();

        let mut leverage = LeverageCache::new();
        leverage
            .resolve(
                &self.clients,
                actionable.iter().map(|o| o.symbol()),
                self.config.lookup_timeout,
                self.config.max_concurrent_lookups,
            )
            .await;

        let balances = PerVenue::new(balance_a, balance_b);
        let sized: Vec<_> = actionable
            .iter()
            .map(|o| self.sizer.size(o, balances, leverage.pair(o.symbol())))
            .collect();

        info!(
            contracts_a = normalized_a.quotes.len(),
            contracts_b = normalized_b.quotes.len(),
            high_rate = high_rate.len(),
            spread = spread.len(),
            sized = sized.len(),
            "pipeline run complete"
        );

        PipelineReport {
            run_id,
            generated_at: now,
            contract_counts: PerVenue::new(normalized_a.quotes.len(), normalized_b.quotes.len()),
            dropped_quotes: PerVenue::new(normalized_a.dropped, normalized_b.dropped),
            balances: balances.map(|b| b.unwrap_or(0.0)),
            high_rate_opportunities: high_rate,
            spread_opportunities: spread,
            sized_opportunities: sized,
            contracts,
        }
    }

    /// Failed or timed-out snapshots become an empty map.
    #[instrument(skip(self), level = "debug")]
    async fn snapshot(&self, venue: Venue) -> BTreeMap<String, RawQuote> {
        let client = self.clients.get(venue);
        match bounded(
            venue,
            Lookup::Snapshot,
            self.config.lookup_timeout,
            client.funding_snapshot(),
        )
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "continuing without snapshot");
                BTreeMap::new()
            }
        }
    }

    /// `None` on failure, timeout, or a balance that is negative or not finite.
    #[instrument(skip(self), level = "debug")]
    async fn balance(&self, venue: Venue) -> Option<f64> {
        let client = self.clients.get(venue);
        match bounded(venue, Lookup::Balance, self.config.lookup_timeout, client.balance()).await {
            Ok(b) if b.is_finite() && b >= 0.0 => Some(b),
            Ok(b) => {
                warn!(balance = b, "ignoring unusable balance");
                None
            }
            Err(e) => {
                warn!(error = %e, "continuing without balance");
                None
            }
        }
    }
}
