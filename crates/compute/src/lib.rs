pub mod algorithms;
pub mod engine;
pub mod pipeline;
pub mod verdict;

pub use algorithms::kmeans::{kmeans1d, try_kmeans1d};
pub use engine::{DiagnosticEngine, ScanReport};
pub use pipeline::anomaly::{classify, Classification, VoltageClusterer};
pub use verdict::verdict;
