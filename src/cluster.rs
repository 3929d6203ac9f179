//! Clustering primitives: density clustering with a noise label, and
//! hierarchical merging down to a requested group count.
//!
//! Both capabilities sit behind traits so the pipeline can be exercised with
//! deterministic fakes; the shipped implementations work on cosine similarity
//! over normalized embeddings and are fully deterministic (index-order
//! iteration, first-seen label assignment).

use std::collections::HashSet;

use crate::error::PipelineError;

/// Reserved label for points not assigned to any density cluster.
pub const NOISE: i32 = -1;

/// A cluster assignment with the noise case explicit at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    Assigned(i32),
    Noise,
}

impl ClusterLabel {
    pub fn from_raw(raw: i32) -> Self {
        if raw == NOISE {
            ClusterLabel::Noise
        } else {
            ClusterLabel::Assigned(raw)
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            ClusterLabel::Assigned(id) => id,
            ClusterLabel::Noise => NOISE,
        }
    }
}

/// Density clustering: one integer label per vector, `-1` for noise.
pub trait DensityClusterer {
    fn cluster(
        &self,
        vectors: &[Vec<f32>],
        min_cluster_size: usize,
        min_samples: usize,
    ) -> Result<Vec<i32>, PipelineError>;
}

/// Hierarchical clustering into exactly `n_groups` contiguous labels
/// `0..n_groups`, no noise label.
pub trait HierarchicalClusterer {
    fn cluster(&self, vectors: &[Vec<f32>], n_groups: usize) -> Result<Vec<i32>, PipelineError>;
}

// ==================== Similarity Math ====================

/// Cosine similarity between two embedding vectors.
/// Returns 0.0 for mismatched or empty inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Mean vector of a cluster's member embeddings, L2-normalized.
/// Returns None for an empty member set.
pub fn compute_centroid(members: &[&[f32]]) -> Option<Vec<f32>> {
    let first = members.first()?;
    let dim = first.len();
    if dim == 0 {
        return None;
    }

    let mut centroid = vec![0.0f32; dim];
    let mut counted = 0usize;
    for emb in members {
        if emb.len() != dim {
            continue; // skip mismatched dimensions
        }
        for (slot, &val) in centroid.iter_mut().zip(emb.iter()) {
            *slot += val;
        }
        counted += 1;
    }
    if counted == 0 {
        return None;
    }

    for val in &mut centroid {
        *val /= counted as f32;
    }

    let norm: f32 = centroid.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-10 {
        for val in &mut centroid {
            *val /= norm;
        }
    }

    Some(centroid)
}

// ==================== Density Clustering ====================

/// Similarity radius by collection size.
fn adaptive_similarity_threshold(item_count: usize) -> f32 {
    match item_count {
        0..=50 => 0.50,
        51..=300 => 0.55,
        301..=1000 => 0.60,
        _ => 0.65,
    }
}

/// DBSCAN-style density clusterer over cosine similarity.
///
/// A point is a core point when at least `min_samples` points (itself
/// included) lie within the similarity radius. Clusters are connected
/// components of core points plus the border points they reach; components
/// smaller than `min_cluster_size` dissolve to noise.
pub struct CosineDbscan {
    /// Override for the similarity radius (None = adaptive by corpus size).
    pub similarity_threshold: Option<f32>,
}

impl CosineDbscan {
    pub fn new() -> Self {
        Self {
            similarity_threshold: None,
        }
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            similarity_threshold: Some(threshold),
        }
    }
}

impl Default for CosineDbscan {
    fn default() -> Self {
        Self::new()
    }
}

impl DensityClusterer for CosineDbscan {
    fn cluster(
        &self,
        vectors: &[Vec<f32>],
        min_cluster_size: usize,
        min_samples: usize,
    ) -> Result<Vec<i32>, PipelineError> {
        let n = vectors.len();
        if n == 0 {
            return Ok(vec![]);
        }

        let threshold = self
            .similarity_threshold
            .unwrap_or_else(|| adaptive_similarity_threshold(n));

        // Neighborhoods within the similarity radius (self included)
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            neighbors[i].push(i);
            for j in (i + 1)..n {
                if cosine_similarity(&vectors[i], &vectors[j]) >= threshold {
                    neighbors[i].push(j);
                    neighbors[j].push(i);
                }
            }
        }

        let core: Vec<bool> = neighbors.iter().map(|nb| nb.len() >= min_samples).collect();

        // Expand clusters from core points in index order
        let mut labels = vec![NOISE; n];
        let mut next_label = 0i32;
        for seed in 0..n {
            if !core[seed] || labels[seed] != NOISE {
                continue;
            }

            let label = next_label;
            next_label += 1;
            labels[seed] = label;
            let mut frontier = vec![seed];
            while let Some(point) = frontier.pop() {
                for &nb in &neighbors[point] {
                    if labels[nb] != NOISE {
                        continue;
                    }
                    labels[nb] = label;
                    // Only core points extend the component further
                    if core[nb] {
                        frontier.push(nb);
                    }
                }
            }
        }

        // Dissolve undersized components to noise, then relabel contiguously
        let mut sizes: Vec<usize> = vec![0; next_label as usize];
        for &label in &labels {
            if label != NOISE {
                sizes[label as usize] += 1;
            }
        }
        let mut remap: Vec<i32> = vec![NOISE; next_label as usize];
        let mut compact = 0i32;
        for (old, &size) in sizes.iter().enumerate() {
            if size >= min_cluster_size {
                remap[old] = compact;
                compact += 1;
            }
        }
        for label in labels.iter_mut() {
            if *label != NOISE {
                *label = remap[*label as usize];
            }
        }

        Ok(labels)
    }
}

// ==================== Hierarchical Merging ====================

/// Agglomerative clustering with average linkage, merging the closest pair
/// of clusters until `n_groups` remain. Output labels are contiguous
/// `0..n_groups`, numbered by each group's first member index.
pub struct AverageLinkage;

impl HierarchicalClusterer for AverageLinkage {
    fn cluster(&self, vectors: &[Vec<f32>], n_groups: usize) -> Result<Vec<i32>, PipelineError> {
        let n = vectors.len();
        if n == 0 {
            return Ok(vec![]);
        }
        if n_groups == 0 {
            return Err(PipelineError::Clustering(
                "hierarchical clustering requires at least 1 group".to_string(),
            ));
        }

        // Start with each vector in its own cluster
        let mut labels: Vec<i32> = (0..n as i32).collect();

        // Precompute pairwise similarities
        let mut similarities: Vec<Vec<f32>> = vec![vec![0.0; n]; n];
        for i in 0..n {
            similarities[i][i] = 1.0;
            for j in (i + 1)..n {
                let sim = cosine_similarity(&vectors[i], &vectors[j]);
                similarities[i][j] = sim;
                similarities[j][i] = sim;
            }
        }

        let mut distinct: usize = n;
        while distinct > n_groups {
            // Find the pair of clusters with the highest average linkage
            let mut best_merge: Option<(i32, i32, f32)> = None;
            for i in 0..n {
                for j in (i + 1)..n {
                    if labels[i] == labels[j] {
                        continue;
                    }
                    let members_i: Vec<usize> =
                        (0..n).filter(|&k| labels[k] == labels[i]).collect();
                    let members_j: Vec<usize> =
                        (0..n).filter(|&k| labels[k] == labels[j]).collect();

                    let mut total = 0.0f32;
                    for &ci in &members_i {
                        for &cj in &members_j {
                            total += similarities[ci][cj];
                        }
                    }
                    let avg = total / (members_i.len() * members_j.len()) as f32;

                    match &best_merge {
                        None => best_merge = Some((labels[i], labels[j], avg)),
                        Some((_, _, best)) if avg > *best => {
                            best_merge = Some((labels[i], labels[j], avg));
                        }
                        _ => {}
                    }
                }
            }

            match best_merge {
                Some((keep, absorb, _)) => {
                    for label in labels.iter_mut() {
                        if *label == absorb {
                            *label = keep;
                        }
                    }
                    distinct -= 1;
                }
                None => break,
            }
        }

        // Relabel contiguously by first member index
        let mut remap: Vec<(i32, i32)> = Vec::new();
        let mut out = vec![0i32; n];
        for (idx, &label) in labels.iter().enumerate() {
            let new = match remap.iter().find(|(old, _)| *old == label) {
                Some((_, new)) => *new,
                None => {
                    let new = remap.len() as i32;
                    remap.push((label, new));
                    new
                }
            };
            out[idx] = new;
        }

        Ok(out)
    }
}

/// Count distinct non-noise labels in a label vector.
pub fn count_clusters(labels: &[i32]) -> usize {
    let distinct: HashSet<i32> = labels.iter().copied().filter(|&l| l != NOISE).collect();
    distinct.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(i: usize, dim: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[i] = 1.0;
        v
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        assert!(cosine_similarity(&axis(0, 3), &axis(1, 3)).abs() < 0.0001);
    }

    #[test]
    fn test_compute_centroid_normalized() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        let centroid = compute_centroid(&[&a, &b]).unwrap();
        let norm: f32 = centroid.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
        assert!((centroid[0] - centroid[1]).abs() < 0.0001);
    }

    #[test]
    fn test_compute_centroid_empty() {
        assert!(compute_centroid(&[]).is_none());
    }

    #[test]
    fn test_dbscan_two_groups() {
        // Two tight groups and one isolated outlier
        let vectors = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.99, 0.1, 0.0],
            vec![0.98, 0.05, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.1, 0.99, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        let labels = CosineDbscan::with_threshold(0.8)
            .cluster(&vectors, 2, 2)
            .unwrap();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(labels[5], NOISE);
        assert_eq!(count_clusters(&labels), 2);
    }

    #[test]
    fn test_dbscan_min_cluster_size_dissolves() {
        // A pair below min_cluster_size becomes noise
        let vectors = vec![vec![1.0, 0.0], vec![0.99, 0.1]];
        let labels = CosineDbscan::with_threshold(0.8)
            .cluster(&vectors, 3, 2)
            .unwrap();
        assert!(labels.iter().all(|&l| l == NOISE));
    }

    #[test]
    fn test_dbscan_empty_input() {
        let labels = CosineDbscan::new().cluster(&[], 2, 2).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_dbscan_labels_contiguous() {
        let vectors = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.99, 0.1, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.1, 0.99, 0.0],
        ];
        let labels = CosineDbscan::with_threshold(0.8)
            .cluster(&vectors, 2, 2)
            .unwrap();
        let mut distinct: Vec<i32> = labels.iter().copied().filter(|&l| l != NOISE).collect();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct, vec![0, 1]);
    }

    #[test]
    fn test_average_linkage_exact_group_count() {
        let vectors = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.95, 0.1, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.95, 0.1],
            vec![0.0, 0.0, 1.0],
        ];
        let labels = AverageLinkage.cluster(&vectors, 3).unwrap();
        let distinct: HashSet<i32> = labels.iter().copied().collect();
        assert_eq!(distinct.len(), 3);
        // Contiguous labels starting at 0
        assert!(distinct.contains(&0) && distinct.contains(&1) && distinct.contains(&2));
        // Near-identical vectors merged together
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
    }

    #[test]
    fn test_average_linkage_more_groups_than_vectors() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let labels = AverageLinkage.cluster(&vectors, 5).unwrap();
        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn test_average_linkage_single_group() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]];
        let labels = AverageLinkage.cluster(&vectors, 1).unwrap();
        assert!(labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_average_linkage_zero_groups_is_error() {
        let vectors = vec![vec![1.0, 0.0]];
        assert!(AverageLinkage.cluster(&vectors, 0).is_err());
    }

    #[test]
    fn test_cluster_label_round_trip() {
        assert_eq!(ClusterLabel::from_raw(-1), ClusterLabel::Noise);
        assert_eq!(ClusterLabel::from_raw(3), ClusterLabel::Assigned(3));
        assert_eq!(ClusterLabel::Assigned(3).to_raw(), 3);
        assert_eq!(ClusterLabel::Noise.to_raw(), NOISE);
    }
}
