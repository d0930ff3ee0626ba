//! HTTP client for the spreadsheet bridge.
//!
//! Push sends unsynced entries as a JSON array; pull reads the remote sheet
//! back as a 2-D JSON table whose first row is a header. The client itself
//! touches no local storage; the sync command owns the mark-synced and
//! upsert steps so a transport failure cannot leave the log half-mutated.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::BridgeError;
use crate::models::Entry;

/// Positional column layout of a pulled row:
/// `[id, tank, count, weight, net (ignored), crate_count, team, timestamp]`.
const COL_ID: usize = 0;
const COL_TANK: usize = 1;
const COL_COUNT: usize = 2;
const COL_WEIGHT: usize = 3;
const COL_CRATE_COUNT: usize = 5;
const COL_TEAM: usize = 6;
const COL_TIMESTAMP: usize = 7;

#[derive(Debug, Clone)]
pub struct BridgeClient {
    endpoint_url: String,
    client: reqwest::Client,
}

impl BridgeClient {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Push entries to the bridge. Succeeds only on a 2xx response; the
    /// caller marks entries synced afterwards, never optimistically.
    pub async fn push(&self, entries: &[Entry]) -> Result<(), BridgeError> {
        debug!(count = entries.len(), "pushing entries to bridge");

        let response = self
            .client
            .post(&self.endpoint_url)
            .json(entries)
            .send()
            .await
            .map_err(|e| BridgeError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BridgeError::BadStatus(response.status().as_u16()));
        }
        Ok(())
    }

    /// Pull the full remote table and convert it to entries.
    pub async fn pull(&self) -> Result<Vec<Entry>, BridgeError> {
        let response = self
            .client
            .get(&self.endpoint_url)
            .send()
            .await
            .map_err(|e| BridgeError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BridgeError::BadStatus(response.status().as_u16()));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| BridgeError::BadResponse(e.to_string()))?;

        Ok(parse_rows(&rows))
    }
}

fn cell_string(row: &[Value], idx: usize) -> Option<String> {
    match row.get(idx)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn cell_f64(row: &[Value], idx: usize) -> f64 {
    match row.get(idx) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn cell_i64(row: &[Value], idx: usize) -> i64 {
    match row.get(idx) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Convert a pulled 2-D table into entries. The first row is a header and is
/// skipped; rows missing an id or tank are discarded; everything that parses
/// is marked synced since it already lives on the remote side.
pub fn parse_rows(rows: &[Vec<Value>]) -> Vec<Entry> {
    let mut entries = Vec::new();

    for row in rows.iter().skip(1) {
        let (id, tank) = match (cell_string(row, COL_ID), cell_string(row, COL_TANK)) {
            (Some(id), Some(tank)) => (id, tank),
            _ => {
                warn!("discarding bridge row without id or tank");
                continue;
            }
        };

        let timestamp = cell_string(row, COL_TIMESTAMP)
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let mut entry = Entry::new(tank, cell_f64(row, COL_WEIGHT))
            .with_count(cell_i64(row, COL_COUNT))
            .with_crate_count(cell_i64(row, COL_CRATE_COUNT))
            .with_team(cell_string(row, COL_TEAM).unwrap_or_default())
            .with_timestamp(timestamp)
            .with_synced(true);
        // a pulled row keeps its remote id so the upsert overwrites in place
        entry.id = id;
        entries.push(entry);
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(rows: Vec<Value>) -> Vec<Vec<Value>> {
        rows.into_iter()
            .map(|r| r.as_array().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_parse_rows_skips_header() {
        let rows = table(vec![
            json!(["ID", "Tank", "Count", "Weight_Gross", "Net", "CrateCount", "Team", "Timestamp"]),
            json!(["abc", "Tank 1", 30, 12.5, 8.9, 2, "Team A", "2025-03-01T08:00:00+00:00"]),
        ]);

        let entries = parse_rows(&rows);
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.id, "abc");
        assert_eq!(e.tank, "Tank 1");
        assert_eq!(e.count, 30);
        assert_eq!(e.weight, 12.5);
        assert_eq!(e.crate_count, 2);
        assert_eq!(e.team, "Team A");
        assert_eq!(e.date_key(), "2025-03-01");
        assert!(e.synced);
    }

    #[test]
    fn test_parse_rows_discards_missing_id_or_tank() {
        let rows = table(vec![
            json!(["ID", "Tank", "Count", "Weight_Gross", "Net", "CrateCount", "Team", "Timestamp"]),
            json!(["", "Tank 1", 30, 12.5, 0, 1, "Team A", ""]),
            json!(["xyz", "", 30, 12.5, 0, 1, "Team A", ""]),
            json!(["ok", "Tank 2", 30, 12.5, 0, 1, "Team A", ""]),
        ]);

        let entries = parse_rows(&rows);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "ok");
    }

    #[test]
    fn test_parse_rows_tolerates_string_numbers() {
        let rows = table(vec![
            json!([]),
            json!(["a", "Tank 1", "30", "12.5", "", "2", "Team A", "not a timestamp"]),
        ]);

        let entries = parse_rows(&rows);
        assert_eq!(entries[0].count, 30);
        assert_eq!(entries[0].weight, 12.5);
        assert_eq!(entries[0].crate_count, 2);
    }

    #[test]
    fn test_parse_rows_ignores_net_column() {
        // column 4 holds the sheet's own derived net; it must never flow back
        let rows = table(vec![
            json!([]),
            json!(["a", "Tank 1", 30, 10.0, 999.0, 1, "Team A", ""]),
        ]);

        let entries = parse_rows(&rows);
        assert_eq!(entries[0].weight, 10.0);
        assert!(entries[0].crate_weight.is_none());
    }

    #[test]
    fn test_parse_rows_empty_table() {
        assert!(parse_rows(&[]).is_empty());
        assert!(parse_rows(&table(vec![json!(["header only"])])).is_empty());
    }
}
