//! Settlement-count heuristic.
//!
//! Counts whole clock hours (venue B settles every hour) between now and
//! venue A's next funding time, bucketed by calendar day. This is an hour-bucket
//! approximation, not an interval count: every branch subtracts one for the
//! settlement hour itself and the "later" branch assumes at most one extra day.

use chrono::{DateTime, FixedOffset, Timelike};

/// Count for a `(next_funding_at, now)` pair, both read in `now`'s offset.
pub fn settlements_remaining(
    next_funding_at: Option<DateTime<FixedOffset>>,
    now: DateTime<FixedOffset>,
) -> u32 {
    let Some(next) = next_funding_at else {
        return 0;
    };
    if next <= now {
        return 0;
    }

    let next = next.with_timezone(&now.timezone());
    let current_hour = now.hour() as i64;
    let funding_hour = next.hour() as i64;

    let today = now.date_naive();
    let day = next.date_naive();

    let count = if day == today {
        funding_hour - current_hour - 1
    } else if Some(day) == today.succ_opt() {
        (24 - current_hour) + funding_hour - 1
    } else {
        (24 - current_hour) + funding_hour + 23
    };

    count.max(0) as u32
}

/// Settlement estimator bound to the engine's clock offset.
#[derive(Debug, Clone, Copy)]
pub struct SettlementEstimator {
    offset: FixedOffset,
}

impl SettlementEstimator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn estimate(
        &self,
        next_funding_at: Option<DateTime<FixedOffset>>,
        now: DateTime<FixedOffset>,
    ) -> u32 {
        settlements_remaining(next_funding_at, now.with_timezone(&self.offset))
    }
}
