//! Rendering helpers for consumers that show reports to humans.
//!
//! Unknown values (a venue that does not list the symbol) always render as
//! [`PLACEHOLDER`] and never get a sign class.

use chrono::{DateTime, FixedOffset};

pub const PLACEHOLDER: &str = "-";

/// Sign class used for colouring a rate cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateClass {
    Positive,
    Negative,
}

/// `0.0125` -> `"0.0125%"`, `None` -> `"-"`.
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) if r.is_finite() => format!("{r:.4}%"),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Zero counts as positive, matching how the rate tables colour cells.
pub fn rate_class(rate: Option<f64>) -> Option<RateClass> {
    match rate {
        Some(r) if r.is_finite() && r >= 0.0 => Some(RateClass::Positive),
        Some(r) if r.is_finite() => Some(RateClass::Negative),
        _ => None,
    }
}

pub fn format_timestamp(ts: Option<DateTime<FixedOffset>>) -> String {
    match ts {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Countdown to the next settlement as `HH:MM:SS`; `settled` once it has passed.
pub fn format_time_left(next: Option<DateTime<FixedOffset>>, now: DateTime<FixedOffset>) -> String {
    let Some(next) = next else {
        return PLACEHOLDER.to_string();
    };

    let secs = (next - now).num_seconds();
    if secs < 0 {
        return "settled".to_string();
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, m, s)
            .unwrap()
    }

    #[test]
    fn unknown_values_render_as_placeholder_without_class() {
        assert_eq!(format_rate(None), "-");
        assert_eq!(format_rate(Some(f64::NAN)), "-");
        assert_eq!(rate_class(None), None);
        assert_eq!(format_timestamp(None), "-");
    }

    #[test]
    fn known_rates_are_formatted_and_classified() {
        assert_eq!(format_rate(Some(0.0125)), "0.0125%");
        assert_eq!(format_rate(Some(-0.3)), "-0.3000%");
        assert_eq!(rate_class(Some(0.0)), Some(RateClass::Positive));
        assert_eq!(rate_class(Some(-0.01)), Some(RateClass::Negative));
    }

    #[test]
    fn time_left_counts_down_and_reports_settled() {
        assert_eq!(format_time_left(Some(at(16, 0, 0)), at(13, 29, 15)), "02:30:45");
        assert_eq!(format_time_left(Some(at(8, 0, 0)), at(9, 0, 0)), "settled");
        assert_eq!(format_time_left(None, at(9, 0, 0)), "-");
        assert_eq!(format_timestamp(Some(at(8, 0, 0))), "2024-03-01 08:00:00");
    }
}
