//! Cell anomaly classification.
//!
//! Combines a two-way voltage clustering with a fixed internal-resistance
//! threshold to annotate every cell of a pack snapshot.
//!
//! Sub-modules:
//! - [`signals`]: individual signals and the anomaly-cluster heuristic
//! - [`population`]: pack-level mean, standard deviation and z-score

pub mod population;
pub mod signals;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use cellscope_core::{BatteryPackSnapshot, Cell, CellscopeError, ClusterResult, Result};

use crate::algorithms::kmeans::kmeans1d;

pub use population::{mean_and_std_dev, z_score};
pub use signals::{
    is_resistance_anomaly, select_anomaly_cluster, AnomalyReason, RESISTANCE_THRESHOLD_OHMS,
};

/// Voltage is split into a "normal" and an "anomalous" population.
pub const VOLTAGE_CLUSTER_COUNT: usize = 2;

/// The voltage clustering step of [`classify`].
///
/// Implemented by [`KmeansClusterer`] and [`FixedClusters`].
pub trait VoltageClusterer {
    fn cluster(&mut self, voltages: &[f64], k: usize) -> ClusterResult;
}

/// Runs [`kmeans1d`] with an owned random source.
#[derive(Debug, Clone)]
pub struct KmeansClusterer<R> {
    rng: R,
}

impl<R: Rng> KmeansClusterer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> VoltageClusterer for KmeansClusterer<R> {
    fn cluster(&mut self, voltages: &[f64], k: usize) -> ClusterResult {
        kmeans1d(voltages, k, &mut self.rng)
    }
}

/// Replays a precomputed clustering regardless of input.
#[derive(Debug, Clone)]
pub struct FixedClusters(pub ClusterResult);

impl VoltageClusterer for FixedClusters {
    fn cluster(&mut self, _voltages: &[f64], _k: usize) -> ClusterResult {
        self.0.clone()
    }
}

/// Annotated cells for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Every cell, in input order, with `z_score`, `is_anomaly` and `anomaly_reason` set.
    pub processed_cells: Vec<Cell>,
    /// The flagged subset of `processed_cells`, same order.
    pub anomalies: Vec<Cell>,
    pub voltage_clusters: ClusterResult,
}

/// Classify every cell of `pack`.
///
/// A cell is anomalous when its voltage belongs to the anomalous voltage
/// cluster (see [`select_anomaly_cluster`]) or its internal resistance
/// exceeds [`RESISTANCE_THRESHOLD_OHMS`]. Cluster membership is decided by
/// voltage value, so cells sharing a voltage share the verdict.
///
/// Fails with `InvalidInput` when the pack has no cells.
pub fn classify<C: VoltageClusterer + ?Sized>(
    pack: &BatteryPackSnapshot,
    clusterer: &mut C,
) -> Result<Classification> {
    if pack.cells.is_empty() {
        return Err(CellscopeError::InvalidInput(
            "cannot classify a pack with no cells".into(),
        ));
    }

    let voltages = pack.voltages();
    let (mean, std_dev) = mean_and_std_dev(&voltages);

    let voltage_clusters = clusterer.cluster(&voltages, VOLTAGE_CLUSTER_COUNT);
    let anomaly_cluster = select_anomaly_cluster(&voltage_clusters, mean, pack.cells.len());
    let anomalous_voltages: &[f64] = anomaly_cluster
        .map(|i| voltage_clusters.clusters[i].as_slice())
        .unwrap_or(&[]);

    trace!(
        mean,
        std_dev,
        sizes = ?voltage_clusters.sizes(),
        anomaly_cluster = ?anomaly_cluster,
        "voltage clustering"
    );

    let processed_cells: Vec<Cell> = pack
        .cells
        .iter()
        .map(|cell| {
            let voltage_flag = anomalous_voltages.contains(&cell.voltage);
            let resistance_flag = is_resistance_anomaly(cell.internal_resistance);
            let reason = AnomalyReason::from_signals(voltage_flag, resistance_flag);

            Cell {
                z_score: Some(z_score(cell.voltage, mean, std_dev)),
                is_anomaly: Some(reason.is_some()),
                anomaly_reason: Some(reason.map(|r| r.as_str().to_string()).unwrap_or_default()),
                ..cell.clone()
            }
        })
        .collect();

    let anomalies = processed_cells
        .iter()
        .filter(|c| c.flagged())
        .cloned()
        .collect();

    Ok(Classification {
        processed_cells,
        anomalies,
        voltage_clusters,
    })
}
