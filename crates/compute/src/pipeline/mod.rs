//! Per-snapshot analysis stages.

pub mod anomaly;

pub use anomaly::{classify, Classification, FixedClusters, KmeansClusterer, VoltageClusterer};
