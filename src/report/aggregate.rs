use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{effective_crate_count, effective_crate_weight, Entry};

/// Aggregate of all entries sharing a tank within one scope (all-time or a
/// single date). Transient: rebuilt from scratch on every call, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TankSummary {
    pub tank: String,
    pub entry_count: usize,
    /// Entries measured with two crates.
    pub patlu_count: usize,
    /// Entries measured with one crate.
    pub singles_count: usize,
    /// Sum of effective crate counts.
    pub crate_count: i64,
    /// Sum of gross weights.
    pub total_weight: f64,
    /// Sum of per-entry net, UNCLAMPED: a tare larger than the gross pushes
    /// this down, unlike the clamped single-record `Entry::net`.
    pub absolute_weight: f64,
    /// Sizing metric of the last entry processed for this tank,
    /// last-write-wins rather than any aggregate.
    pub shrimp_count: i64,
}

/// Grand totals over a set of tank summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub total_entries: usize,
    pub total_patlu: usize,
    pub total_singles: usize,
    pub total_crates: i64,
    pub total_gross: f64,
    pub total_absolute: f64,
    /// total_absolute / total_gross as a percentage, 0 when gross is 0.
    pub net_efficiency: f64,
}

/// Fold a scoped entry list into per-tank summaries, sorted by tank name.
///
/// Pure and deterministic: the same list always yields the same summaries.
/// Effective-value resolution is centralized here — a crate count of zero
/// becomes one, a missing or zero tare becomes `default_crate_weight`.
pub fn summarize(entries: &[Entry], default_crate_weight: f64) -> Vec<TankSummary> {
    let mut tanks: BTreeMap<String, TankSummary> = BTreeMap::new();

    for entry in entries {
        let summary = tanks
            .entry(entry.tank.clone())
            .or_insert_with(|| TankSummary {
                tank: entry.tank.clone(),
                entry_count: 0,
                patlu_count: 0,
                singles_count: 0,
                crate_count: 0,
                total_weight: 0.0,
                absolute_weight: 0.0,
                shrimp_count: 0,
            });

        let crates = effective_crate_count(entry.crate_count);
        let tare = effective_crate_weight(entry.crate_weight, default_crate_weight);

        summary.entry_count += 1;
        match crates {
            2 => summary.patlu_count += 1,
            1 => summary.singles_count += 1,
            // any other crate count still contributes to the sums below
            _ => {}
        }
        summary.crate_count += crates;
        summary.total_weight += entry.weight;
        summary.absolute_weight += entry.weight - crates as f64 * tare;
        summary.shrimp_count = entry.count;
    }

    tanks.into_values().collect()
}

/// Plain sums over already-computed summaries.
pub fn totals(summaries: &[TankSummary]) -> Totals {
    let total_entries = summaries.iter().map(|s| s.entry_count).sum();
    let total_patlu = summaries.iter().map(|s| s.patlu_count).sum();
    let total_singles = summaries.iter().map(|s| s.singles_count).sum();
    let total_crates = summaries.iter().map(|s| s.crate_count).sum();
    let total_gross: f64 = summaries.iter().map(|s| s.total_weight).sum();
    let total_absolute: f64 = summaries.iter().map(|s| s.absolute_weight).sum();

    let net_efficiency = if total_gross == 0.0 {
        0.0
    } else {
        total_absolute / total_gross * 100.0
    };

    Totals {
        total_entries,
        total_patlu,
        total_singles,
        total_crates,
        total_gross,
        total_absolute,
        net_efficiency,
    }
}

/// Lenient price parse: longest leading numeric prefix, 0 on anything else.
/// Tolerates the partially-typed strings kept in `Settings::tank_prices`.
pub fn lenient_price(raw: &str) -> f64 {
    let s = raw.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return 0.0;
    }
    s[..end].parse().unwrap_or(0.0)
}

/// Revenue for one tank: net weight times its configured price.
pub fn tank_revenue(summary: &TankSummary, prices: &HashMap<String, String>) -> f64 {
    let price = prices
        .get(&summary.tank)
        .map(|p| lenient_price(p))
        .unwrap_or(0.0);
    summary.absolute_weight * price
}

/// Grand revenue over all summarized tanks.
pub fn total_revenue(summaries: &[TankSummary], prices: &HashMap<String, String>) -> f64 {
    summaries.iter().map(|s| tank_revenue(s, prices)).sum()
}
