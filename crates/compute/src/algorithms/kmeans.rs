use rand::seq::SliceRandom;
use rand::Rng;

use cellscope_core::{CellscopeError, ClusterResult, Result};

/// Upper bound on Lloyd's iterations.
pub const MAX_ITERATIONS: usize = 30;

/// Run Lloyd's K-means over a one-dimensional sample.
///
/// Centroids are seeded from up to `k` distinct sample values picked at
/// random; when the sample has fewer than `k` distinct values the remainder
/// is drawn uniformly from `[min, max]`. Iterates until no assignment changes
/// or [`MAX_ITERATIONS`] is reached. A cluster that loses all its points is
/// reseeded to a random sample value.
///
/// All randomness comes from `rng`, so a seeded generator gives reproducible
/// output.
///
/// When `k == 0` or `k > data.len()` the whole sample is returned as a single
/// cluster whose centroid is the sample mean (no clusters at all for an empty
/// sample).
pub fn kmeans1d<R: Rng + ?Sized>(data: &[f64], k: usize, rng: &mut R) -> ClusterResult {
    if k == 0 || data.len() < k {
        return single_cluster(data);
    }

    let n = data.len();
    let mut centroids = init_centroids(data, k, rng);
    // `None` until the first assignment pass, so that pass always counts as a change.
    let mut assignments: Vec<Option<usize>> = vec![None; n];

    for _ in 0..MAX_ITERATIONS {
        // Assignment step.
        let mut changed = false;
        for (i, &point) in data.iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids);
            if assignments[i] != Some(nearest) {
                assignments[i] = Some(nearest);
                changed = true;
            }
        }

        if !changed {
            break;
        }

        // Update step.
        let mut members: Vec<Vec<f64>> = vec![Vec::new(); k];
        for (i, &point) in data.iter().enumerate() {
            if let Some(cluster) = assignments[i] {
                members[cluster].push(point);
            }
        }

        for (c, points) in members.iter().enumerate() {
            centroids[c] = if points.is_empty() {
                // Empty cluster: reseed to a random sample value.
                data[rng.gen_range(0..n)]
            } else {
                mean(points)
            };
        }
    }

    let mut clusters: Vec<Vec<f64>> = vec![Vec::new(); k];
    for (i, &point) in data.iter().enumerate() {
        clusters[assignments[i].unwrap_or(0)].push(point);
    }

    ClusterResult { clusters, centroids }
}

/// Variant of [`kmeans1d`] for callers holding an optional sample.
///
/// A missing sample is an `InvalidArgument`; a short or empty one is not.
pub fn try_kmeans1d<R: Rng + ?Sized>(
    data: Option<&[f64]>,
    k: usize,
    rng: &mut R,
) -> Result<ClusterResult> {
    let data = data.ok_or_else(|| {
        CellscopeError::InvalidArgument("kmeans1d: no sample provided".into())
    })?;
    Ok(kmeans1d(data, k, rng))
}

// ── Internal helpers ─────────────────────────────────────────

fn single_cluster(data: &[f64]) -> ClusterResult {
    if data.is_empty() {
        return ClusterResult::default();
    }
    ClusterResult {
        clusters: vec![data.to_vec()],
        centroids: vec![mean(data)],
    }
}

/// Pick up to `k` distinct sample values at random, padding from the sample range.
fn init_centroids<R: Rng + ?Sized>(data: &[f64], k: usize, rng: &mut R) -> Vec<f64> {
    let mut distinct = data.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    distinct.shuffle(rng);
    distinct.truncate(k);

    if distinct.len() < k {
        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        while distinct.len() < k {
            distinct.push(min + rng.gen::<f64>() * (max - min));
        }
    }

    distinct
}

/// Index of the nearest centroid; ties go to the lower index.
fn nearest_centroid(point: f64, centroids: &[f64]) -> usize {
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &centroid) in centroids.iter().enumerate() {
        let dist = (point - centroid).abs();
        if dist < best_dist {
            best_dist = dist;
            best_idx = i;
        }
    }
    best_idx
}

/// Arithmetic mean; exact for a constant sample.
fn mean(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    if values.iter().all(|&v| v == first) {
        return first;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
