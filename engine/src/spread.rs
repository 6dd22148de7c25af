use std::collections::{BTreeMap, BTreeSet};

use corelib::{ContractQuote, OpportunityCandidate};

/// Decimal places kept on a computed difference; removes float noise such as
/// `0.3 - 0.05 = 0.24999999999999997` before threshold comparisons.
const DIFFERENCE_DECIMALS: i32 = 10;

/// `|rate_a - rate_b|`, only when both rates are known.
pub fn rate_difference(rate_a: Option<f64>, rate_b: Option<f64>) -> Option<f64> {
    let (a, b) = (rate_a?, rate_b?);
    let scale = 10f64.powi(DIFFERENCE_DECIMALS);
    Some(((a - b).abs() * scale).round() / scale)
}

/// Pair both venues' normalized quotes over the union of their symbols.
///
/// Output is sorted by symbol. A symbol missing on one side keeps that side
/// as `None`.
pub fn pair_quotes(
    venue_a: &BTreeMap<String, ContractQuote>,
    venue_b: &BTreeMap<String, ContractQuote>,
) -> Vec<OpportunityCandidate> {
    let symbols: BTreeSet<&String> = venue_a.keys().chain(venue_b.keys()).collect();

    symbols
        .into_iter()
        .map(|symbol| {
            let a = venue_a.get(symbol);
            let b = venue_b.get(symbol);
            let rate_a = a.map(|q| q.rate);
            let rate_b = b.map(|q| q.rate);

            OpportunityCandidate {
                symbol: symbol.clone(),
                rate_a,
                rate_b,
                difference: rate_difference(rate_a, rate_b),
                next_funding_a: a.and_then(|q| q.next_funding_at),
                next_funding_b: b.and_then(|q| q.next_funding_at),
            }
        })
        .collect()
}
