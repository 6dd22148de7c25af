use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use engine::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full report as pretty JSON.
    Json,
    /// Human-readable opportunity tables.
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "fundarb", version, about = "Cross-venue funding-rate arbitrage scanner")]
pub struct Cli {
    /// Snapshot document for venue A (percent-reporting, 8h funding)
    #[arg(long, env = "FUNDARB_VENUE_A")]
    pub venue_a: PathBuf,

    /// Snapshot document for venue B (fraction-reporting, hourly funding)
    #[arg(long, env = "FUNDARB_VENUE_B")]
    pub venue_b: PathBuf,

    /// Poll every N seconds instead of running once
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Colour rate cells by sign in table output
    #[arg(long)]
    pub color: bool,

    #[arg(long)]
    pub position_ratio: Option<f64>,

    #[arg(long)]
    pub high_rate_threshold: Option<f64>,

    #[arg(long)]
    pub spread_threshold: Option<f64>,

    #[arg(long)]
    pub profitability_threshold: Option<f64>,

    #[arg(long)]
    pub total_fee_rate: Option<f64>,

    #[arg(long)]
    pub lookup_timeout_ms: Option<u64>,

    #[arg(long)]
    pub max_concurrent_lookups: Option<usize>,
}

impl Cli {
    /// Overlay flags that were given on top of `cfg`.
    pub fn apply_overrides(&self, cfg: &mut EngineConfig) {
        if let Some(v) = self.position_ratio {
            cfg.position_ratio = v;
        }
        if let Some(v) = self.high_rate_threshold {
            cfg.high_rate_threshold = v;
        }
        if let Some(v) = self.spread_threshold {
            cfg.spread_threshold = v;
        }
        if let Some(v) = self.profitability_threshold {
            cfg.profitability_threshold = v;
        }
        if let Some(v) = self.total_fee_rate {
            cfg.total_fee_rate = v;
        }
        if let Some(ms) = self.lookup_timeout_ms {
            cfg.lookup_timeout = Duration::from_millis(ms);
        }
        if let Some(v) = self.max_concurrent_lookups {
            cfg.max_concurrent_lookups = v;
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_only_what_was_given() {
        let cli = Cli::try_parse_from([
            "fundarb",
            "--venue-a",
            "a.json",
            "--venue-b",
            "b.json",
            "--spread-threshold",
            "0.4",
            "--lookup-timeout-ms",
            "1500",
        ])
        .unwrap();

        let mut cfg = EngineConfig::default();
        cli.apply_overrides(&mut cfg);

        assert_eq!(cfg.spread_threshold, 0.4);
        assert_eq!(cfg.lookup_timeout, Duration::from_millis(1500));
        assert_eq!(cfg.position_ratio, 0.5);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.interval(), None);
    }

    #[test]
    fn polling_and_table_output_parse() {
        let cli = Cli::try_parse_from([
            "fundarb",
            "--venue-a",
            "a.json",
            "--venue-b",
            "b.json",
            "--interval-secs",
            "30",
            "--format",
            "table",
            "--json-logs",
            "--color",
        ])
        .unwrap();

        assert_eq!(cli.interval(), Some(Duration::from_secs(30)));
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.json_logs);
        assert!(cli.color);
    }

    #[test]
    fn zero_interval_is_rejected_by_the_parser() {
        let err = Cli::try_parse_from([
            "fundarb",
            "--venue-a",
            "a.json",
            "--venue-b",
            "b.json",
            "--interval-secs",
            "0",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
