use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single harvest measurement attributed to a tank.
///
/// Entries are append-only once recorded; an edit is a full-record overwrite
/// by id. The `synced` flag flips to true only after the bridge confirms a
/// push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque unique id, generated client-side, never reused.
    pub id: String,
    /// Container name, conventionally "Tank N".
    pub tank: String,
    /// Sizing metric (pieces-per-kg grading) stamped at record time.
    pub count: i64,
    /// Gross measured weight in kilograms, including crate tare.
    pub weight: f64,
    /// Tare of one crate for this entry; None falls back to the configured
    /// default when aggregated.
    pub crate_weight: Option<f64>,
    /// Crates contributing tare: 1 = single, 2 = patlu.
    pub crate_count: i64,
    /// Recording team name, free-form.
    pub team: String,
    pub timestamp: DateTime<Utc>,
    pub synced: bool,
}

impl Entry {
    pub fn new(tank: impl Into<String>, weight: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tank: tank.into(),
            count: 0,
            weight,
            crate_weight: None,
            crate_count: 1,
            team: String::new(),
            timestamp: Utc::now(),
            synced: false,
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn with_crate_weight(mut self, crate_weight: f64) -> Self {
        self.crate_weight = Some(crate_weight);
        self
    }

    pub fn with_crate_count(mut self, crate_count: i64) -> Self {
        self.crate_count = crate_count;
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_synced(mut self, synced: bool) -> Self {
        self.synced = synced;
        self
    }

    /// Net weight of this single record, clamped at zero for display.
    ///
    /// The aggregation engine intentionally sums the unclamped form; see
    /// `report::aggregate`.
    pub fn net(&self, default_crate_weight: f64) -> f64 {
        let crates = effective_crate_count(self.crate_count);
        let tare = effective_crate_weight(self.crate_weight, default_crate_weight);
        (self.weight - crates as f64 * tare).max(0.0)
    }

    /// Date-only bucket key, "YYYY-MM-DD".
    pub fn date_key(&self) -> String {
        self.timestamp.date_naive().to_string()
    }
}

/// A crate count of zero is treated as one crate, never as "no crate".
pub fn effective_crate_count(crate_count: i64) -> i64 {
    if crate_count == 0 {
        1
    } else {
        crate_count
    }
}

/// A missing or zero per-entry tare falls back to the configured default.
pub fn effective_crate_weight(crate_weight: Option<f64>, default: f64) -> f64 {
    match crate_weight {
        Some(w) if w != 0.0 => w,
        _ => default,
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:.2} kg gross | {} crate(s) | count {} | {} | {}",
            self.tank,
            self.weight,
            self.crate_count,
            self.count,
            self.team,
            self.timestamp.to_rfc3339(),
        )
    }
}
