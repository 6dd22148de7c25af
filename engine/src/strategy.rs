use chrono::{DateTime, FixedOffset};
use corelib::{OpportunityCandidate, Strategy, Venue};

/// The venue whose rate drives the trade, if one exists.
///
/// Venue B dominates when its rate is strictly larger in magnitude and it
/// settles strictly earlier. Otherwise venue A dominates when its rate is not
/// smaller and it does not settle later. Mixed signals have no dominant leg.
pub fn dominant_venue(
    rate_a: f64,
    rate_b: f64,
    next_funding_a: DateTime<FixedOffset>,
    next_funding_b: DateTime<FixedOffset>,
) -> Option<Venue> {
    let b_bigger = rate_b.abs() > rate_a.abs();
    let b_first = next_funding_b < next_funding_a;

    match (b_bigger, b_first) {
        (true, true) => Some(Venue::B),
        (false, false) => Some(Venue::A),
        _ => None,
    }
}

/// Direction for one candidate.
///
/// Shorts the dominant venue when its rate is positive (shorts collect),
/// longs it when negative. Any unknown rate or funding time gives
/// [`Strategy::None`].
pub fn classify(candidate: &OpportunityCandidate) -> Strategy {
    let (Some(rate_a), Some(rate_b), Some(next_a), Some(next_b)) = (
        candidate.rate_a,
        candidate.rate_b,
        candidate.next_funding_a,
        candidate.next_funding_b,
    ) else {
        return Strategy::None;
    };

    let Some(dominant) = dominant_venue(rate_a, rate_b, next_a, next_b) else {
        return Strategy::None;
    };

    let rate = match dominant {
        Venue::A => rate_a,
        Venue::B => rate_b,
    };
    if rate > 0.0 {
        Strategy::short(dominant)
    } else if rate < 0.0 {
        Strategy::long(dominant)
    } else {
        Strategy::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 10, 16, 0, 0)
            .unwrap()
    }

    fn candidate(rate_a: f64, rate_b: f64, b_settles_in_hours: i64) -> OpportunityCandidate {
        OpportunityCandidate {
            symbol: "BTC".into(),
            rate_a: Some(rate_a),
            rate_b: Some(rate_b),
            difference: Some((rate_a - rate_b).abs()),
            next_funding_a: Some(t0()),
            next_funding_b: Some(t0() + Duration::hours(b_settles_in_hours)),
        }
    }

    #[test]
    fn bigger_earlier_positive_b_is_shorted() {
        let c = candidate(0.01, 0.40, -3);
        assert_eq!(classify(&c), Strategy::LongAShortB);
    }

    #[test]
    fn bigger_earlier_negative_b_is_longed() {
        let c = candidate(0.01, -0.40, -3);
        assert_eq!(classify(&c), Strategy::LongBShortA);
    }

    #[test]
    fn dominant_a_follows_its_own_sign() {
        // A not smaller and not later.
        assert_eq!(classify(&candidate(0.30, -0.05, 2)), Strategy::LongBShortA);
        assert_eq!(classify(&candidate(-0.30, 0.05, 2)), Strategy::LongAShortB);
        // Equal magnitude and simultaneous settlement still favour A.
        assert_eq!(classify(&candidate(-0.30, 0.30, 0)), Strategy::LongAShortB);
    }

    #[test]
    fn mixed_signals_have_no_strategy() {
        // B bigger but A settles first.
        assert_eq!(classify(&candidate(0.01, 0.40, 2)), Strategy::None);
        // A bigger but B settles first.
        assert_eq!(classify(&candidate(0.40, 0.01, -2)), Strategy::None);
    }

    #[test]
    fn unknown_inputs_have_no_strategy() {
        let mut c = candidate(0.01, 0.40, -3);
        c.next_funding_a = None;
        assert_eq!(classify(&c), Strategy::None);

        let mut c = candidate(0.01, 0.40, -3);
        c.rate_a = None;
        assert_eq!(classify(&c), Strategy::None);
    }
}
