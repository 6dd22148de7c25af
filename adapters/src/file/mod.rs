pub mod errors;
pub mod types;

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use corelib::{RawQuote, Venue};
use engine::VenueClient;
use engine::normalizer::canonical_symbol;
use tracing::{debug, instrument};

pub use errors::SnapshotError;
pub use types::SnapshotDocument;

/// Venue backed by a JSON snapshot file.
///
/// The file is re-read on every call, so a poller sees edits between runs.
#[derive(Debug, Clone)]
pub struct FileVenue {
    venue: Venue,
    path: PathBuf,
}

impl FileVenue {
    pub fn new(venue: Venue, path: impl Into<PathBuf>) -> Self {
        Self {
            venue,
            path: path.into(),
        }
    }

    #[instrument(skip(self), fields(venue = %self.venue, path = %self.path.display()), level = "debug")]
    pub async fn load(&self) -> Result<SnapshotDocument, SnapshotError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: self.path.clone(),
                source,
            })?;

        let doc: SnapshotDocument =
            serde_json::from_str(&raw).map_err(|source| SnapshotError::Json {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            quotes = doc.quotes.len(),
            leverage_entries = doc.max_leverage.len(),
            "snapshot document loaded"
        );
        Ok(doc)
    }
}

/// Exact key first, then any key with the same canonical symbol.
fn leverage_for(doc: &SnapshotDocument, symbol: &str) -> Option<u32> {
    doc.leverage_entry(symbol).or_else(|| {
        let wanted = canonical_symbol(symbol)?;
        doc.max_leverage
            .keys()
            .find(|k| canonical_symbol(k).as_deref() == Some(wanted.as_str()))
            .and_then(|k| doc.leverage_entry(k))
    })
}

#[async_trait]
impl VenueClient for FileVenue {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn funding_snapshot(&self) -> anyhow::Result<BTreeMap<String, RawQuote>> {
        Ok(self.load().await?.raw_quotes())
    }

    async fn balance(&self) -> anyhow::Result<f64> {
        Ok(self.load().await?.balance().ok_or(SnapshotError::MissingBalance)?)
    }

    async fn max_leverage(&self, symbol: &str) -> anyhow::Result<u32> {
        let doc = self.load().await?;
        Ok(leverage_for(&doc, symbol)
            .ok_or_else(|| SnapshotError::MissingLeverage(symbol.to_string()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leverage_falls_back_to_canonical_match() {
        let doc: SnapshotDocument =
            serde_json::from_str(r#"{"max_leverage": {"BTCUSDT": 50, "ETH": 25}}"#).unwrap();
        assert_eq!(leverage_for(&doc, "ETH"), Some(25));
        assert_eq!(leverage_for(&doc, "BTC"), Some(50));
        assert_eq!(leverage_for(&doc, "SOL"), None);
    }

    #[test]
    fn document_fields_are_optional() {
        let doc: SnapshotDocument = serde_json::from_str(r#"{"quotes": {}}"#).unwrap();
        assert_eq!(doc, SnapshotDocument::default());
    }
}
