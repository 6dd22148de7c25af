use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use corelib::PerVenue;

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    // =========================
    // Ranking
    // =========================
    /// Minimum `|venue B rate|` (percent) for the high-rate view.
    ///
    /// Compared against the normalized percentage value, i.e. after venue B's
    /// fraction has been scaled ×100. `0.01` therefore means 0.01%.
    pub high_rate_threshold: f64,

    /// Maximum number of entries in the high-rate view.
    pub high_rate_limit: usize,

    /// Minimum `|rate_a - rate_b|` (percentage points) for the spread view.
    pub spread_threshold: f64,

    /// Minimum estimated settlement yield (percent) for `is_profitable`.
    pub profitability_threshold: f64,

    // =========================
    // Sizing
    // =========================
    /// Fraction of each venue's balance deployed into one opportunity, in (0, 1].
    pub position_ratio: f64,

    /// Round-trip fee cost across both legs, as a fraction of notional.
    pub total_fee_rate: f64,

    // =========================
    // Clock & venues
    // =========================
    /// UTC offset (hours) of the clock used for settlement-hour bucketing.
    /// Calendar-day comparisons all happen in this zone. Defaults to +8.
    pub clock_utc_offset_hours: i32,

    /// Nominal funding interval per venue, carried on every normalized quote.
    pub funding_interval_hours: PerVenue<u32>,

    // =========================
    // Upstream calls
    // =========================
    /// Upper bound on every collaborator call; a timeout counts as data unavailable.
    pub lookup_timeout: Duration,

    /// Worker-pool width for per-symbol leverage lookups.
    pub max_concurrent_lookups: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            high_rate_threshold: 0.01,
            high_rate_limit: 20,
            spread_threshold: 0.25,
            profitability_threshold: 0.25,

            position_ratio: 0.5,
            total_fee_rate: 0.002,

            clock_utc_offset_hours: 8,
            funding_interval_hours: PerVenue::new(8, 1),

            lookup_timeout: Duration::from_millis(5_000),
            max_concurrent_lookups: 8,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `FUNDARB_*` environment variables, then validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();

        let cfg = Self {
            high_rate_threshold: env_or("FUNDARB_HIGH_RATE_THRESHOLD", d.high_rate_threshold)?,
            high_rate_limit: env_or("FUNDARB_HIGH_RATE_LIMIT", d.high_rate_limit)?,
            spread_threshold: env_or("FUNDARB_SPREAD_THRESHOLD", d.spread_threshold)?,
            profitability_threshold: env_or(
                "FUNDARB_PROFITABILITY_THRESHOLD",
                d.profitability_threshold,
            )?,

            position_ratio: env_or("FUNDARB_POSITION_RATIO", d.position_ratio)?,
            total_fee_rate: env_or("FUNDARB_TOTAL_FEE_RATE", d.total_fee_rate)?,

            clock_utc_offset_hours: env_or("FUNDARB_CLOCK_UTC_OFFSET_HOURS", d.clock_utc_offset_hours)?,
            funding_interval_hours: PerVenue::new(
                env_or("FUNDARB_FUNDING_INTERVAL_HOURS_A", d.funding_interval_hours.venue_a)?,
                env_or("FUNDARB_FUNDING_INTERVAL_HOURS_B", d.funding_interval_hours.venue_b)?,
            ),

            lookup_timeout: Duration::from_millis(env_or(
                "FUNDARB_LOOKUP_TIMEOUT_MS",
                d.lookup_timeout.as_millis() as u64,
            )?),
            max_concurrent_lookups: env_or("FUNDARB_MAX_CONCURRENT_LOOKUPS", d.max_concurrent_lookups)?,
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.position_ratio > 0.0 && self.position_ratio <= 1.0) {
            return Err(out_of_range("position_ratio", "(0, 1]", self.position_ratio));
        }
        for (field, v) in [
            ("high_rate_threshold", self.high_rate_threshold),
            ("spread_threshold", self.spread_threshold),
            ("profitability_threshold", self.profitability_threshold),
            ("total_fee_rate", self.total_fee_rate),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(out_of_range(field, "[0, inf)", v));
            }
        }
        if self.high_rate_limit == 0 {
            return Err(out_of_range("high_rate_limit", "[1, inf)", self.high_rate_limit));
        }
        if !(-12..=14).contains(&self.clock_utc_offset_hours) {
            return Err(out_of_range(
                "clock_utc_offset_hours",
                "[-12, 14]",
                self.clock_utc_offset_hours,
            ));
        }
        if self.funding_interval_hours.venue_a == 0 || self.funding_interval_hours.venue_b == 0 {
            return Err(out_of_range(
                "funding_interval_hours",
                "[1, inf)",
                format!("{:?}", self.funding_interval_hours),
            ));
        }
        if self.lookup_timeout.is_zero() {
            return Err(out_of_range("lookup_timeout", "> 0ms", "0ms"));
        }
        if self.max_concurrent_lookups == 0 {
            return Err(out_of_range(
                "max_concurrent_lookups",
                "[1, inf)",
                self.max_concurrent_lookups,
            ));
        }
        Ok(())
    }

    /// The fixed offset all settlement arithmetic runs in.
    pub fn clock_offset(&self) -> FixedOffset {
        // Range checked by validate(); fall back to UTC for unvalidated configs.
        FixedOffset::east_opt(self.clock_utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

fn out_of_range(field: &'static str, expected: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        expected,
        value: value.to_string(),
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
        Err(_) => Ok(default),
    }
}
