use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Entry;

use super::aggregate::{summarize, totals, TankSummary, Totals};

/// One history bucket: every entry of a single calendar date, independently
/// summarized with the same algorithm as the all-time case.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub summaries: Vec<TankSummary>,
    pub totals: Totals,
}

/// One tank's entries shaped for the log view: newest first, each paired with
/// its chronological serial number.
#[derive(Debug, Clone, Serialize)]
pub struct LogGroup {
    pub tank: String,
    /// (serial, entry), sorted descending by timestamp.
    pub entries: Vec<(usize, Entry)>,
}

/// Group entries by the date component of their timestamp, newest date first.
pub fn group_by_date(entries: &[Entry]) -> Vec<(String, Vec<Entry>)> {
    let mut buckets: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
    for entry in entries {
        buckets
            .entry(entry.date_key())
            .or_default()
            .push(entry.clone());
    }
    buckets.into_iter().rev().collect()
}

/// Per-date summaries for history browsing, newest date first.
pub fn history(entries: &[Entry], default_crate_weight: f64) -> Vec<DaySummary> {
    group_by_date(entries)
        .into_iter()
        .map(|(date, bucket)| {
            let summaries = summarize(&bucket, default_crate_weight);
            let totals = totals(&summaries);
            DaySummary {
                date,
                summaries,
                totals,
            }
        })
        .collect()
}

/// Chronological serials 1..N for one tank's entries, in ascending order.
///
/// The serial of a record depends only on the entry set, not on whatever
/// order the caller currently displays it in. Equal timestamps break ties by
/// id so the numbering stays stable.
pub fn serials_for_tank(entries: &[Entry], tank: &str) -> Vec<(usize, Entry)> {
    let mut scoped: Vec<Entry> = entries
        .iter()
        .filter(|e| e.tank == tank)
        .cloned()
        .collect();
    scoped.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
    scoped
        .into_iter()
        .enumerate()
        .map(|(i, e)| (i + 1, e))
        .collect()
}

/// Group all entries by tank for the log view.
///
/// Each group is sorted descending by timestamp for display; the serial is
/// computed as `group_len - index`, which reproduces the ascending
/// chronological numbering without a second sort pass.
pub fn log_groups(entries: &[Entry]) -> Vec<LogGroup> {
    let mut by_tank: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
    for entry in entries {
        by_tank
            .entry(entry.tank.clone())
            .or_default()
            .push(entry.clone());
    }

    by_tank
        .into_iter()
        .map(|(tank, mut group)| {
            group.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
            let len = group.len();
            let entries = group
                .into_iter()
                .enumerate()
                .map(|(i, e)| (len - i, e))
                .collect();
            LogGroup { tank, entries }
        })
        .collect()
}

/// Ids of every entry recorded on the given date, resolved from the live
/// entry list at call time. Deleting "a date" is a batch delete of exactly
/// this list.
pub fn ids_for_date(entries: &[Entry], date: &str) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.date_key() == date)
        .map(|e| e.id.clone())
        .collect()
}
