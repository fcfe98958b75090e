use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cellscope_core::{BatteryPackSnapshot, Cell, Result, Verdict};

use crate::pipeline::anomaly::{classify, Classification, KmeansClusterer, VoltageClusterer};
use crate::verdict::verdict;

/// Full diagnostic outcome for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    #[serde(flatten)]
    pub classification: Classification,
    pub verdict: Verdict,
}

impl ScanReport {
    pub fn anomaly_count(&self) -> usize {
        self.classification.anomalies.len()
    }

    pub fn anomalies(&self) -> &[Cell] {
        &self.classification.anomalies
    }

    pub fn cell(&self, id: u32) -> Option<&Cell> {
        self.classification.processed_cells.iter().find(|c| c.id == id)
    }
}

/// Classifier plus verdict, owning the clustering random source.
pub struct DiagnosticEngine<C = KmeansClusterer<StdRng>> {
    clusterer: C,
}

impl DiagnosticEngine {
    /// Reproducible engine: the same seed and snapshots give the same reports.
    pub fn seeded(seed: u64) -> Self {
        Self::with_clusterer(KmeansClusterer::new(StdRng::seed_from_u64(seed)))
    }

    pub fn from_entropy() -> Self {
        Self::with_clusterer(KmeansClusterer::new(StdRng::from_entropy()))
    }

    /// Seeded when a seed is given, entropy-backed otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<C: VoltageClusterer> DiagnosticEngine<C> {
    pub fn with_clusterer(clusterer: C) -> Self {
        Self { clusterer }
    }

    /// Classify every cell and derive the pack verdict.
    pub fn analyze(&mut self, pack: &BatteryPackSnapshot) -> Result<ScanReport> {
        let start = Instant::now();
        let classification = classify(pack, &mut self.clusterer)?;
        let verdict = verdict(pack.state_of_health, classification.anomalies.len());

        debug!(
            cells = pack.cells.len(),
            anomalies = classification.anomalies.len(),
            verdict = %verdict,
            elapsed_us = start.elapsed().as_micros() as u64,
            "snapshot analyzed"
        );

        Ok(ScanReport {
            classification,
            verdict,
        })
    }
}
