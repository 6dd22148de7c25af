use std::fmt::Write;

use chrono::{DateTime, FixedOffset};
use corelib::display::{RateClass, format_rate, format_time_left, format_timestamp, rate_class};
use corelib::{PipelineReport, RankedOpportunity, StrategyLegs};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Plain-text rendering of a report for terminals. `color` adds ANSI sign
/// colours to rate cells.
pub fn render_table(report: &PipelineReport, color: bool) -> String {
    let mut out = String::new();
    let now = report.generated_at;

    let _ = writeln!(
        out,
        "run {} at {}  contracts: venue_a={} venue_b={}  balances: venue_a={:.2} venue_b={:.2}",
        report.run_id,
        format_timestamp(Some(now)),
        report.contract_counts.venue_a,
        report.contract_counts.venue_b,
        report.balances.venue_a,
        report.balances.venue_b,
    );

    let _ = writeln!(out, "\nhigh venue_b rates");
    write_ranked(&mut out, &report.high_rate_opportunities, now, color);

    let _ = writeln!(out, "\nspreads");
    write_ranked(&mut out, &report.spread_opportunities, now, color);

    let _ = writeln!(out, "\nsizing");
    if report.sized_opportunities.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for s in &report.sized_opportunities {
        let _ = writeln!(
            out,
            "  {:<10} {}  lev {:>3}  notional {:>12.2}  profit {:>10.4}{}",
            s.symbol(),
            legs_cell(s.ranked.legs.as_ref(), color),
            s.max_leverage,
            s.suggested_notional,
            s.expected_profit,
            if s.degraded { "  (degraded)" } else { "" },
        );
    }

    out
}

fn rate_cell(rate: Option<f64>, width: usize, color: bool) -> String {
    let text = format!("{:>width$}", format_rate(rate));
    match (color, rate_class(rate)) {
        (true, Some(RateClass::Positive)) => format!("{GREEN}{text}{RESET}"),
        (true, Some(RateClass::Negative)) => format!("{RED}{text}{RESET}"),
        _ => text,
    }
}

fn legs_cell(legs: Option<&StrategyLegs>, color: bool) -> String {
    match legs {
        Some(l) => format!(
            "long {} {} / short {} {}",
            l.long_venue,
            rate_cell(Some(l.long_rate), 9, color),
            l.short_venue,
            rate_cell(Some(l.short_rate), 9, color),
        ),
        None => "no strategy".to_string(),
    }
}

fn write_ranked(out: &mut String, rows: &[RankedOpportunity], now: DateTime<FixedOffset>, color: bool) {
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for r in rows {
        let c = &r.candidate;
        let _ = writeln!(
            out,
            "  {:<10} a {}  b {}  diff {:>10}  next_a {:>9}  settlements {:>2}  {}",
            c.symbol,
            rate_cell(c.rate_a, 10, color),
            rate_cell(c.rate_b, 10, color),
            format_rate(c.difference),
            format_time_left(c.next_funding_a, now),
            r.settlement_count,
            legs_cell(r.legs.as_ref(), color),
        );
    }
}
