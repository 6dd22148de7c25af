use std::collections::BTreeMap;

use corelib::{RawNumber, RawQuote};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// On-disk snapshot of one venue.
///
/// ```json
/// {
///   "balance": 1000.0,
///   "quotes": { "BTCUSDT": { "rate": "0.0100", "next_funding_at": 1715342400000 } },
///   "max_leverage": { "BTC": 50 }
/// }
/// ```
///
/// Entries are kept as loose JSON and decoded one at a time, so a single bad
/// entry never rejects the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotDocument {
    pub balance: Option<RawNumber>,
    pub quotes: BTreeMap<String, Value>,
    pub max_leverage: BTreeMap<String, Value>,
}

impl SnapshotDocument {
    /// Every quote entry; one that is not an object becomes an empty quote,
    /// which normalization then drops and counts.
    pub fn raw_quotes(&self) -> BTreeMap<String, RawQuote> {
        self.quotes
            .iter()
            .map(|(symbol, v)| {
                let quote = serde_json::from_value(v.clone()).unwrap_or_else(|e| {
                    debug!(%symbol, error = %e, "undecodable quote entry");
                    RawQuote::default()
                });
                (symbol.clone(), quote)
            })
            .collect()
    }

    pub fn balance(&self) -> Option<f64> {
        self.balance.as_ref().and_then(RawNumber::coerce)
    }

    /// Leverage entry as a positive integer, from a number or numeric text.
    pub fn leverage_entry(&self, key: &str) -> Option<u32> {
        match self.max_leverage.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        }
    }
}
