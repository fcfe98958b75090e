//! Standalone numeric algorithms with no knowledge of battery packs.

pub mod kmeans;

pub use kmeans::{kmeans1d, try_kmeans1d};
