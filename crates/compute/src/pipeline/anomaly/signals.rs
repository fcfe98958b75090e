//! Individual anomaly signals.
//!
//! - Voltage cluster: which of the two voltage clusters holds the outliers
//! - Internal resistance: fixed ohmic threshold
//! - Reason: combined human-readable label for a flagged cell

use serde::{Deserialize, Serialize};

use cellscope_core::ClusterResult;

/// Cells above this internal resistance (ohms) are flagged. Strict comparison.
pub const RESISTANCE_THRESHOLD_OHMS: f64 = 0.010;

/// Cluster sizes closer than this fraction of the cell count are treated as
/// "similar", and the distance-to-mean rule decides instead of size.
pub const SIMILAR_SIZE_FRACTION: f64 = 0.1;

/// Resistance signal.
#[inline]
pub fn is_resistance_anomaly(internal_resistance: f64) -> bool {
    internal_resistance > RESISTANCE_THRESHOLD_OHMS
}

/// Pick the index of the anomalous voltage cluster.
///
/// Requires exactly two non-empty clusters, otherwise returns `None`.
/// The smaller cluster wins (index 1 on equal size), unless the sizes differ
/// by less than [`SIMILAR_SIZE_FRACTION`] of `cell_count`: then the cluster
/// whose centroid lies farther from `mean` wins (index 1 on equal distance).
pub fn select_anomaly_cluster(
    result: &ClusterResult,
    mean: f64,
    cell_count: usize,
) -> Option<usize> {
    if result.clusters.len() != 2
        || result.centroids.len() != 2
        || result.clusters.iter().any(Vec::is_empty)
    {
        return None;
    }

    let (size0, size1) = (result.clusters[0].len(), result.clusters[1].len());
    let mut index = if size0 < size1 { 0 } else { 1 };

    if (size0.abs_diff(size1) as f64) < cell_count as f64 * SIMILAR_SIZE_FRACTION {
        let dist0 = (result.centroids[0] - mean).abs();
        let dist1 = (result.centroids[1] - mean).abs();
        index = if dist0 > dist1 { 0 } else { 1 };
    }

    Some(index)
}

/// Why a cell was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyReason {
    VoltageClusterAndResistance,
    VoltageCluster,
    HighResistance,
}

impl AnomalyReason {
    /// Combine the two signals; `None` when neither fired.
    pub fn from_signals(voltage_cluster: bool, high_resistance: bool) -> Option<Self> {
        match (voltage_cluster, high_resistance) {
            (true, true) => Some(Self::VoltageClusterAndResistance),
            (true, false) => Some(Self::VoltageCluster),
            (false, true) => Some(Self::HighResistance),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VoltageClusterAndResistance => "Anomalous Voltage Cluster & High Resistance",
            Self::VoltageCluster => "Anomalous Voltage Cluster",
            Self::HighResistance => "High Internal Resistance",
        }
    }
}

impl std::fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clusters(a: &[f64], b: &[f64], c0: f64, c1: f64) -> ClusterResult {
        ClusterResult {
            clusters: vec![a.to_vec(), b.to_vec()],
            centroids: vec![c0, c1],
        }
    }

    #[test]
    fn resistance_threshold_is_strict() {
        assert!(!is_resistance_anomaly(0.010));
        assert!(is_resistance_anomaly(0.0100001));
        assert!(!is_resistance_anomaly(0.002));
    }

    #[test]
    fn smaller_cluster_is_anomalous() {
        let r = clusters(&[3.55], &[3.7, 3.7, 3.7], 3.55, 3.7);
        assert_eq!(select_anomaly_cluster(&r, 3.6625, 4), Some(0));

        let r = clusters(&[3.7, 3.7, 3.7], &[3.55], 3.7, 3.55);
        assert_eq!(select_anomaly_cluster(&r, 3.6625, 4), Some(1));
    }

    #[test]
    fn similar_sizes_fall_back_to_distance_from_mean() {
        // 10 cells, sizes 5 vs 5: diff 0 < 1.0, so distance decides.
        let low = [3.50; 5];
        let high = [3.70; 5];
        let r = clusters(&high, &low, 3.70, 3.50);
        // Mean skewed towards the high group: low centroid is farther.
        assert_eq!(select_anomaly_cluster(&r, 3.65, 10), Some(1));
        assert_eq!(select_anomaly_cluster(&r, 3.55, 10), Some(0));
    }

    #[test]
    fn equal_sizes_and_distances_pick_second_cluster() {
        let r = clusters(&[1.0], &[3.0], 1.0, 3.0);
        assert_eq!(select_anomaly_cluster(&r, 2.0, 2), Some(1));
    }

    #[test]
    fn degenerate_clusterings_select_nothing() {
        let empty_second = clusters(&[3.7, 3.7], &[], 3.7, 3.7);
        assert_eq!(select_anomaly_cluster(&empty_second, 3.7, 2), None);

        let single = ClusterResult {
            clusters: vec![vec![3.7]],
            centroids: vec![3.7],
        };
        assert_eq!(select_anomaly_cluster(&single, 3.7, 1), None);
        assert_eq!(select_anomaly_cluster(&ClusterResult::default(), 0.0, 0), None);
    }

    #[test]
    fn reason_priority() {
        assert_eq!(
            AnomalyReason::from_signals(true, true).map(|r| r.as_str()),
            Some("Anomalous Voltage Cluster & High Resistance")
        );
        assert_eq!(
            AnomalyReason::from_signals(true, false).map(|r| r.as_str()),
            Some("Anomalous Voltage Cluster")
        );
        assert_eq!(
            AnomalyReason::from_signals(false, true).map(|r| r.as_str()),
            Some("High Internal Resistance")
        );
        assert_eq!(AnomalyReason::from_signals(false, false), None);
    }
}
