use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use corelib::{RawQuote, Venue};
use engine::VenueClient;

/// Venue that lists one symbol and optionally stalls every snapshot.
pub struct MockVenue {
    pub venue: Venue,
    pub snapshot_delay: Duration,
}

impl MockVenue {
    pub fn new(venue: Venue) -> Self {
        Self {
            venue,
            snapshot_delay: Duration::ZERO,
        }
    }

    pub fn stalling(venue: Venue, delay: Duration) -> Self {
        Self {
            venue,
            snapshot_delay: delay,
        }
    }
}

#[async_trait]
impl VenueClient for MockVenue {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn funding_snapshot(&self) -> anyhow::Result<BTreeMap<String, RawQuote>> {
        if !self.snapshot_delay.is_zero() {
            tokio::time::sleep(self.snapshot_delay).await;
        }
        Ok(BTreeMap::from([("BTC".to_string(), RawQuote::new(0.001))]))
    }

    async fn balance(&self) -> anyhow::Result<f64> {
        Ok(500.0)
    }

    async fn max_leverage(&self, _symbol: &str) -> anyhow::Result<u32> {
        Ok(5)
    }
}
