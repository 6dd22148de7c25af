use std::fmt;

use corelib::Venue;
use thiserror::Error;

/// Which collaborator call a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Snapshot,
    Balance,
    Leverage { symbol: String },
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Snapshot => write!(f, "funding snapshot"),
            Lookup::Balance => write!(f, "balance"),
            Lookup::Leverage { symbol } => write!(f, "max leverage for {symbol}"),
        }
    }
}

/// Why a raw quote did not become a `ContractQuote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingRate,
    NonNumericRate,
    NonFiniteRate,
    /// Zero means "no signal", not a malformed value.
    ZeroRate,
    EmptySymbol,
    DuplicateSymbol,
}

impl DropReason {
    pub fn is_malformed(self) -> bool {
        !matches!(self, DropReason::ZeroRate | DropReason::MissingRate)
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropReason::MissingRate => "rate missing",
            DropReason::NonNumericRate => "rate is not numeric",
            DropReason::NonFiniteRate => "rate is not finite",
            DropReason::ZeroRate => "rate is zero",
            DropReason::EmptySymbol => "symbol is empty after canonicalization",
            DropReason::DuplicateSymbol => "canonical symbol already taken",
        };
        f.write_str(s)
    }
}

/// Failures inside one pipeline run.
///
/// None of these escape `Pipeline::run`: each is logged where it is detected
/// and replaced by a safe default.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{venue} {what} unavailable: {reason}")]
    DataUnavailable {
        venue: Venue,
        what: Lookup,
        reason: String,
    },

    #[error("{venue} {what} timed out after {timeout_ms}ms")]
    Timeout {
        venue: Venue,
        what: Lookup,
        timeout_ms: u64,
    },

    #[error("malformed quote for {symbol}: {reason}")]
    MalformedQuote { symbol: String, reason: DropReason },
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be in {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("environment variable {key}={value:?} could not be parsed")]
    InvalidEnv { key: &'static str, value: String },

    #[error("client registered as {expected} reports itself as {actual}")]
    VenueMismatch { expected: Venue, actual: Venue },
}
