use serde::{Deserialize, Serialize};

/// Identifier of a cell within one pack snapshot (1-based, physical position).
pub type CellId = u32;

/// A single cell reading, optionally annotated by the anomaly classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: CellId,
    /// Volts.
    pub voltage: f64,
    /// Ohms.
    pub internal_resistance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anomaly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_reason: Option<String>,
}

impl Cell {
    /// A raw, unannotated reading.
    pub fn new(id: CellId, voltage: f64, internal_resistance: f64) -> Self {
        Self {
            id,
            voltage,
            internal_resistance,
            z_score: None,
            is_anomaly: None,
            anomaly_reason: None,
        }
    }

    /// True only when the classifier has flagged this cell.
    pub fn flagged(&self) -> bool {
        self.is_anomaly.unwrap_or(false)
    }
}

/// One telemetry snapshot of a battery pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryPackSnapshot {
    /// Volts.
    pub pack_voltage: f64,
    /// Amps.
    pub pack_current: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent.
    pub state_of_charge: f64,
    /// Ordered by physical cell position.
    pub cells: Vec<Cell>,
    /// mAh.
    pub design_capacity: f64,
    /// mAh.
    pub full_charge_capacity: f64,
    /// Percent.
    pub state_of_health: f64,
    pub cycle_count: u32,
}

impl BatteryPackSnapshot {
    pub fn voltages(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.voltage).collect()
    }
}

/// Output of 1-D k-means: one value group and one centroid per cluster index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    pub clusters: Vec<Vec<f64>>,
    pub centroids: Vec<f64>,
}

impl ClusterResult {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Member counts per cluster index.
    pub fn sizes(&self) -> Vec<usize> {
        self.clusters.iter().map(Vec::len).collect()
    }
}

/// Overall pack health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Service Required")]
    ServiceRequired,
    Degraded,
    Good,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::ServiceRequired => "Service Required",
            Verdict::Degraded => "Degraded",
            Verdict::Good => "Good",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
