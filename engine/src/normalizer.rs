//! Raw venue payloads -> `ContractQuote`.
//!
//! After this stage every rate is a signed percentage. Venue A already reports
//! percentages; venue B reports fractions and is scaled ×100 here, exactly
//! once. Nothing downstream rescales.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use corelib::{ContractQuote, PerVenue, RawNumber, RawQuote, RawTimestamp, Venue};
use tracing::{debug, instrument};

use crate::error::{DropReason, EngineError};

/// Quote-currency suffixes stripped to get the base asset.
const QUOTE_SUFFIXES: [&str; 3] = ["USDT", "USDC", "-PERP"];

const NAIVE_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Multiplier taking a venue's raw rate to percentage units.
pub fn rate_scale(venue: Venue) -> f64 {
    match venue {
        Venue::A => 1.0,
        Venue::B => 100.0,
    }
}

/// `btcusdt` -> `BTC`, `ETH-PERP` -> `ETH`, `SOL` -> `SOL`.
pub fn canonical_symbol(raw: &str) -> Option<String> {
    let upper = raw.trim().to_ascii_uppercase();
    let base = QUOTE_SUFFIXES
        .iter()
        .find_map(|sfx| upper.strip_suffix(sfx))
        .unwrap_or(&upper);

    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// Output of normalizing one venue's snapshot.
#[derive(Debug, Clone, Default)]
pub struct NormalizedQuotes {
    /// Keyed by canonical symbol.
    pub quotes: BTreeMap<String, ContractQuote>,
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct QuoteNormalizer {
    offset: FixedOffset,
    funding_interval_hours: PerVenue<u32>,
}

impl QuoteNormalizer {
    pub fn new(offset: FixedOffset, funding_interval_hours: PerVenue<u32>) -> Self {
        Self {
            offset,
            funding_interval_hours,
        }
    }

    /// Normalize a whole snapshot. Bad entries are dropped one by one; the
    /// rest of the batch is unaffected.
    #[instrument(skip(self, raw), fields(venue = %venue, raw_count = raw.len()), level = "debug")]
    pub fn normalize(&self, venue: Venue, raw: &BTreeMap<String, RawQuote>) -> NormalizedQuotes {
        let mut out = NormalizedQuotes::default();

        // BTreeMap iteration is lexicographic, so the first raw symbol wins a collision.
        for (raw_symbol, payload) in raw {
            let result = self
                .normalize_one(venue, raw_symbol, payload)
                .and_then(|q| {
                    if out.quotes.contains_key(&q.symbol) {
                        Err(DropReason::DuplicateSymbol)
                    } else {
                        Ok(q)
                    }
                });

            match result {
                Ok(q) => {
                    out.quotes.insert(q.symbol.clone(), q);
                }
                Err(reason) => {
                    out.dropped += 1;
                    if reason.is_malformed() {
                        let err = EngineError::MalformedQuote {
                            symbol: raw_symbol.clone(),
                            reason,
                        };
                        debug!(error = %err, "dropping quote");
                    } else {
                        debug!(symbol = %raw_symbol, %reason, "skipping quote without signal");
                    }
                }
            }
        }

        debug!(kept = out.quotes.len(), dropped = out.dropped, "snapshot normalized");
        out
    }

    pub fn normalize_one(
        &self,
        venue: Venue,
        raw_symbol: &str,
        payload: &RawQuote,
    ) -> Result<ContractQuote, DropReason> {
        let symbol = canonical_symbol(raw_symbol).ok_or(DropReason::EmptySymbol)?;
        let rate = coerce_rate(payload.rate.as_ref())? * rate_scale(venue);

        Ok(ContractQuote {
            symbol,
            rate,
            next_funding_at: payload
                .next_funding_at
                .as_ref()
                .and_then(|ts| parse_timestamp(ts, self.offset)),
            funding_interval_hours: *self.funding_interval_hours.get(venue),
        })
    }
}

fn coerce_rate(raw: Option<&RawNumber>) -> Result<f64, DropReason> {
    let raw = raw.ok_or(DropReason::MissingRate)?;
    let v = raw.coerce().ok_or(DropReason::NonNumericRate)?;

    if !v.is_finite() {
        return Err(DropReason::NonFiniteRate);
    }
    if v == 0.0 {
        return Err(DropReason::ZeroRate);
    }
    Ok(v)
}

/// Parse a raw timestamp into the engine clock's offset. Unparseable -> `None`.
pub fn parse_timestamp(raw: &RawTimestamp, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    match raw {
        RawTimestamp::Millis(ms) => from_millis(*ms, offset),
        RawTimestamp::FractionalMillis(ms) if ms.is_finite() => from_millis(ms.round() as i64, offset),
        RawTimestamp::FractionalMillis(_) | RawTimestamp::Other(_) => None,
        RawTimestamp::Text(s) => {
            let s = s.trim();
            if let Ok(ms) = s.parse::<i64>() {
                return from_millis(ms, offset);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&offset));
            }
            NaiveDateTime::parse_from_str(s, NAIVE_TS_FORMAT)
                .ok()
                .and_then(|naive| offset.from_local_datetime(&naive).single())
        }
    }
}

fn from_millis(ms: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp_millis(ms).map(|utc| utc.with_timezone(&offset))
}
