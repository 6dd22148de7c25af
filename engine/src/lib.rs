pub mod config;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod ranker;
pub mod settlement;
pub mod sizer;
pub mod spread;
pub mod strategy;
pub mod venue;

pub use config::EngineConfig;
pub use error::{ConfigError, DropReason, EngineError, Lookup};
pub use normalizer::{NormalizedQuotes, QuoteNormalizer};
pub use pipeline::Pipeline;
pub use ranker::{OpportunityRanker, RankingThresholds};
pub use settlement::SettlementEstimator;
pub use sizer::{LeverageCache, PositionSizer};
pub use venue::VenueClient;
