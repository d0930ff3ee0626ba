//! Export shapes: CSV rows and the structured report document.
//!
//! Everything here is a pure consumer of the report module's output; no value
//! is computed independently of the aggregation engine and model helpers.

use serde::Serialize;

use crate::models::{Entry, Settings};
use crate::report::{
    serials_for_tank, summarize, tank_revenue, total_revenue, totals, TankSummary, Totals,
};

/// Fixed CSV column order, shared with the bridge's documented layout.
pub const CSV_HEADER: &str = "ID,Tank,Count,Weight_Gross,CrateCount,Team,Timestamp,Synced";

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render entries as delimited text, one row per entry, in input order.
pub fn to_csv(entries: &[Entry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for entry in entries {
        let row = [
            csv_field(&entry.id),
            csv_field(&entry.tank),
            entry.count.to_string(),
            entry.weight.to_string(),
            entry.crate_count.to_string(),
            csv_field(&entry.team),
            entry.timestamp.to_rfc3339(),
            entry.synced.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Headline metrics block of the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetrics {
    pub total_gross: f64,
    pub total_net: f64,
    pub total_revenue: f64,
    pub net_efficiency: f64,
    pub total_entries: usize,
}

/// Financial settlement line: what one tank's net yield is worth.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementRow {
    pub tank: String,
    pub net_weight: f64,
    pub price: String,
    pub amount: f64,
}

/// One chronological detail line.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub serial: usize,
    pub tank: String,
    pub count: i64,
    pub weight: f64,
    pub crate_count: i64,
    /// Clamped single-record net, the display form.
    pub net: f64,
    pub team: String,
    pub timestamp: String,
}

/// The full structured report handed to renderers (text, PDF, ...).
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    /// Date scope, None for all-time.
    pub date: Option<String>,
    pub metrics: ReportMetrics,
    pub tanks: Vec<TankSummary>,
    pub totals: Totals,
    pub settlement: Vec<SettlementRow>,
    pub details: Vec<DetailRow>,
}

/// Assemble the report for the given scope (all entries, or one date).
pub fn build_report(entries: &[Entry], settings: &Settings, date: Option<&str>) -> ReportData {
    let scoped: Vec<Entry> = match date {
        Some(d) => entries.iter().filter(|e| e.date_key() == d).cloned().collect(),
        None => entries.to_vec(),
    };

    let tanks = summarize(&scoped, settings.crate_weight);
    let totals = totals(&tanks);
    let revenue = total_revenue(&tanks, &settings.tank_prices);

    let settlement = tanks
        .iter()
        .map(|s| SettlementRow {
            tank: s.tank.clone(),
            net_weight: s.absolute_weight,
            price: settings
                .tank_prices
                .get(&s.tank)
                .cloned()
                .unwrap_or_default(),
            amount: tank_revenue(s, &settings.tank_prices),
        })
        .collect();

    let mut details = Vec::with_capacity(scoped.len());
    for summary in &tanks {
        for (serial, entry) in serials_for_tank(&scoped, &summary.tank) {
            details.push(DetailRow {
                serial,
                tank: entry.tank.clone(),
                count: entry.count,
                weight: entry.weight,
                crate_count: entry.crate_count,
                net: entry.net(settings.crate_weight),
                team: entry.team.clone(),
                timestamp: entry.timestamp.to_rfc3339(),
            });
        }
    }
    details.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    ReportData {
        date: date.map(|d| d.to_string()),
        metrics: ReportMetrics {
            total_gross: totals.total_gross,
            total_net: totals.total_absolute,
            total_revenue: revenue,
            net_efficiency: totals.net_efficiency,
            total_entries: totals.total_entries,
        },
        tanks,
        totals,
        settlement,
        details,
    }
}
