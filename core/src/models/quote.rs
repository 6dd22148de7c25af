use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Numeric field as venues actually send it: sometimes a JSON number,
/// sometimes a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    /// Any other JSON shape (bool, object, array). Never coerces.
    Other(serde_json::Value),
}

impl RawNumber {
    /// Coerce to `f64`. Non-numeric text yields `None`; NaN passes through
    /// and is rejected by the caller.
    pub fn coerce(&self) -> Option<f64> {
        match self {
            RawNumber::Number(v) => Some(*v),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
            RawNumber::Other(_) => None,
        }
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

/// Next-funding timestamp as delivered: epoch milliseconds (integer or
/// float) or a text form (RFC 3339, or `YYYY-MM-DD HH:MM:SS` in the engine's
/// clock offset). Anything else lands in `Other` and parses to nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
    Other(serde_json::Value),
}

/// One venue's raw per-symbol funding payload. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    #[serde(default)]
    pub rate: Option<RawNumber>,

    #[serde(default)]
    pub next_funding_at: Option<RawTimestamp>,
}

impl RawQuote {
    pub fn new(rate: impl Into<RawNumber>) -> Self {
        Self {
            rate: Some(rate.into()),
            next_funding_at: None,
        }
    }

    pub fn with_next_funding(mut self, ts: RawTimestamp) -> Self {
        self.next_funding_at = Some(ts);
        self
    }
}

/// One venue's normalized view of one symbol.
///
/// `rate` is always a signed percentage (never zero, never NaN).
/// Cross-venue comparisons are only meaningful on this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractQuote {
    /// Canonical base asset, e.g. `BTC`.
    pub symbol: String,
    pub rate: f64,
    pub next_funding_at: Option<DateTime<FixedOffset>>,
    pub funding_interval_hours: u32,
}
