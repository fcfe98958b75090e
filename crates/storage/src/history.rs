//! Completed scans persisted as a JSON file, newest first.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cellscope_core::{BatteryPackSnapshot, Verdict};

use crate::error::StorageError;

pub const HISTORY_FILE: &str = "scan-history.json";
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Summary of one completed scan plus the snapshot it was taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanHistoryItem {
    /// Same as `timestamp`; unique per scan.
    pub id: String,
    /// RFC 3339, millisecond precision.
    pub timestamp: String,
    pub vehicle: String,
    pub verdict_text: String,
    pub anomaly_count: usize,
    pub data: BatteryPackSnapshot,
}

impl ScanHistoryItem {
    pub fn new(
        vehicle: impl Into<String>,
        data: BatteryPackSnapshot,
        verdict: Verdict,
        anomaly_count: usize,
        at: DateTime<Utc>,
    ) -> Self {
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            id: timestamp.clone(),
            timestamp,
            vehicle: vehicle.into(),
            verdict_text: verdict.as_str().to_string(),
            anomaly_count,
            data,
        }
    }
}

/// Capped scan history in `<data_dir>/scan-history.json`.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
}

impl HistoryStore {
    pub fn new(data_dir: &Path, limit: usize) -> Self {
        Self {
            path: data_dir.join(HISTORY_FILE),
            limit: limit.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// All stored scans, newest first.
    ///
    /// A missing file is an empty history. So is an unreadable or corrupt
    /// one, after logging a warning.
    pub fn list(&self) -> Vec<ScanHistoryItem> {
        match self.load() {
            Ok(items) => items,
            Err(e) => {
                warn!("Failed to read scan history from {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Scan at `index` (0 = newest).
    pub fn get(&self, index: usize) -> Option<ScanHistoryItem> {
        self.list().into_iter().nth(index)
    }

    /// Prepend `item`, keep the newest `limit` entries, and persist.
    ///
    /// Returns the updated history. On a write failure nothing on disk changes.
    pub fn save(&self, item: ScanHistoryItem) -> Result<Vec<ScanHistoryItem>, StorageError> {
        let mut items = self.list();
        items.insert(0, item);
        items.truncate(self.limit);
        self.write(&items)?;
        debug!(entries = items.len(), "scan history saved");
        Ok(items)
    }

    /// Delete all history. A missing file is not an error.
    pub fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Result<Vec<ScanHistoryItem>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write(&self, items: &[ScanHistoryItem]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(items)?;
        // Write a sibling file, then rename over the old one.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use cellscope_core::Cell;

    fn snapshot(soh: f64) -> BatteryPackSnapshot {
        BatteryPackSnapshot {
            pack_voltage: 88.8,
            pack_current: 16.0,
            temperature: 46.0,
            state_of_charge: 74.0,
            cells: vec![Cell::new(1, 3.7, 0.002), Cell::new(2, 3.55, 0.002)],
            design_capacity: 4000.0,
            full_charge_capacity: 3650.0,
            state_of_health: soh,
            cycle_count: 312,
        }
    }

    fn item(minute: i64) -> ScanHistoryItem {
        let at = Utc.with_ymd_and_hms(2025, 6, 14, 10, 0, 0).unwrap() + Duration::minutes(minute);
        ScanHistoryItem::new("TVS iQube ST", snapshot(91.3), Verdict::Degraded, 1, at)
    }

    #[test]
    fn item_uses_timestamp_as_id() {
        let it = item(0);
        assert_eq!(it.id, "2025-06-14T10:00:00.000Z");
        assert_eq!(it.timestamp, it.id);
        assert_eq!(it.verdict_text, "Degraded");

        let json = serde_json::to_value(&it).unwrap();
        assert_eq!(json["verdictText"], "Degraded");
        assert_eq!(json["anomalyCount"], 1);
        assert_eq!(json["data"]["stateOfHealth"], 91.3);
    }

    #[test]
    fn missing_file_is_empty_history() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path(), DEFAULT_HISTORY_LIMIT);
        assert!(store.list().is_empty());
        assert!(store.get(0).is_none());
    }

    #[test]
    fn save_prepends_newest() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path(), DEFAULT_HISTORY_LIMIT);

        store.save(item(0)).unwrap();
        let updated = store.save(item(1)).unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].id, "2025-06-14T10:01:00.000Z");
        assert_eq!(store.list(), updated);
        assert_eq!(store.get(1).unwrap().id, "2025-06-14T10:00:00.000Z");
    }

    #[test]
    fn keeps_only_latest_twenty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path(), DEFAULT_HISTORY_LIMIT);

        for minute in 0..25 {
            store.save(item(minute)).unwrap();
        }

        let history = store.list();
        assert_eq!(history.len(), 20);
        assert_eq!(history[0].id, "2025-06-14T10:24:00.000Z");
        assert_eq!(history[19].id, "2025-06-14T10:05:00.000Z");
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path(), DEFAULT_HISTORY_LIMIT);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(store.list().is_empty());
        // Saving over a corrupt file starts a fresh history.
        assert_eq!(store.save(item(0)).unwrap().len(), 1);
    }

    #[test]
    fn clear_removes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(tmp.path(), DEFAULT_HISTORY_LIMIT);
        store.save(item(0)).unwrap();

        store.clear().unwrap();
        assert!(store.list().is_empty());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn creates_missing_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(&tmp.path().join("nested/data"), 3);
        store.save(item(0)).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.limit(), 3);
    }
}
