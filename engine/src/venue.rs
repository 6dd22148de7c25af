use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use corelib::{RawQuote, Venue};

use crate::error::{EngineError, Lookup};

/// Exchange adapter as seen by the engine.
///
/// Implementations own wire formats, authentication and symbol conventions.
/// Every call may fail; the pipeline treats failures as "data unavailable".
#[async_trait]
pub trait VenueClient: Send + Sync {
    fn venue(&self) -> Venue;

    /// Raw funding payload for every listed symbol, keyed by the venue's own symbol.
    async fn funding_snapshot(&self) -> anyhow::Result<BTreeMap<String, RawQuote>>;

    /// Available account balance in the quote currency.
    async fn balance(&self) -> anyhow::Result<f64>;

    /// Maximum leverage for a canonical symbol (e.g. `BTC`).
    async fn max_leverage(&self, symbol: &str) -> anyhow::Result<u32>;
}

/// Run one collaborator call under `timeout`, mapping both failure modes
/// into the engine's taxonomy.
pub(crate) async fn bounded<T, F>(
    venue: Venue,
    what: Lookup,
    timeout: Duration,
    fut: F,
) -> Result<T, EngineError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(EngineError::DataUnavailable {
            venue,
            what,
            reason: format!("{e:#}"),
        }),
        Err(_) => Err(EngineError::Timeout {
            venue,
            what,
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
