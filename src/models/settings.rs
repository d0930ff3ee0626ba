use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Singleton app settings, persisted as one durable record.
///
/// The store does no merging; callers read, modify, and save the whole
/// structure. The invariant that `tank_counts[active_tank]` mirrors
/// `shrimp_count` is maintained by the commands that edit either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tank new entries are attributed to.
    pub active_tank: String,
    /// Sizing metric stamped onto new entries for the active tank.
    pub shrimp_count: i64,
    /// Last-used sizing metric per tank, restored on tank switch.
    pub tank_counts: HashMap<String, i64>,
    /// Price-per-net-kg per tank, kept as raw strings to tolerate partial
    /// numeric input; parsed leniently wherever consumed.
    pub tank_prices: HashMap<String, String>,
    /// Default tare used when an entry carries none.
    pub crate_weight: f64,
    /// Team stamped onto new entries.
    pub team_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_tank: "Tank 1".to_string(),
            shrimp_count: 30,
            tank_counts: HashMap::new(),
            tank_prices: HashMap::new(),
            crate_weight: 1.8,
            team_name: "Team A".to_string(),
        }
    }
}

impl Settings {
    /// Switch the active tank, restoring its last-used sizing metric if one
    /// was recorded; otherwise the current metric is left unchanged.
    pub fn switch_tank(&mut self, tank: impl Into<String>) {
        let tank = tank.into();
        if let Some(count) = self.tank_counts.get(&tank) {
            self.shrimp_count = *count;
        }
        self.active_tank = tank;
    }

    /// Set the sizing metric for the active tank, keeping the per-tank map
    /// reconciled with the current scalar.
    pub fn set_shrimp_count(&mut self, count: i64) {
        self.shrimp_count = count;
        self.tank_counts.insert(self.active_tank.clone(), count);
    }
}
