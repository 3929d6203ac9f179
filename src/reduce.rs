//! Cluster-count reduction: when density clustering produces more clusters
//! than the configured ceiling, merge them by hierarchical clustering over
//! per-cluster centroid vectors.

use std::collections::HashMap;

use crate::cluster::{compute_centroid, HierarchicalClusterer, NOISE};
use crate::error::PipelineError;

/// Remap `labels` so that at most `max_clusters` distinct non-noise labels
/// remain. Noise stays noise. Below the ceiling the input passes through
/// unchanged; with fewer than 2 usable centroids the reduction is skipped.
pub fn reduce_cluster_count(
    labels: &[i32],
    embeddings: &[Vec<f32>],
    max_clusters: usize,
    hierarchical: &dyn HierarchicalClusterer,
) -> Result<Vec<i32>, PipelineError> {
    let mut unique: Vec<i32> = labels.iter().copied().filter(|&l| l != NOISE).collect();
    unique.sort_unstable();
    unique.dedup();

    if unique.len() <= max_clusters {
        return Ok(labels.to_vec());
    }

    println!(
        "[Clustering] {} initial clusters exceed max ({}). Merging by centroid...",
        unique.len(),
        max_clusters
    );

    // One centroid per cluster, in ascending label order; empty clusters
    // cannot occur here but mismatched embeddings are excluded defensively.
    let mut centroids: Vec<Vec<f32>> = Vec::new();
    let mut centroid_labels: Vec<i32> = Vec::new();
    for &cluster_id in &unique {
        let members: Vec<&[f32]> = labels
            .iter()
            .zip(embeddings.iter())
            .filter(|(&l, _)| l == cluster_id)
            .map(|(_, emb)| emb.as_slice())
            .collect();
        if let Some(centroid) = compute_centroid(&members) {
            centroids.push(centroid);
            centroid_labels.push(cluster_id);
        }
    }

    if centroids.len() < 2 {
        // Recovered degenerate case: keep the original labels
        println!("[Clustering] Not enough centroids to merge; keeping original labels");
        return Ok(labels.to_vec());
    }

    let n_groups = max_clusters.min(centroids.len());
    let merged = hierarchical.cluster(&centroids, n_groups)?;
    if merged.len() != centroids.len() {
        return Err(PipelineError::Clustering(format!(
            "hierarchical clusterer returned {} labels for {} centroids",
            merged.len(),
            centroids.len()
        )));
    }

    let mapping: HashMap<i32, i32> = centroid_labels
        .iter()
        .copied()
        .zip(merged.iter().copied())
        .collect();

    // Labels missing from the mapping fall to noise
    let remapped: Vec<i32> = labels
        .iter()
        .map(|&l| {
            if l == NOISE {
                NOISE
            } else {
                mapping.get(&l).copied().unwrap_or(NOISE)
            }
        })
        .collect();

    println!(
        "[Clustering] Merge complete. Final clusters: {}",
        crate::cluster::count_clusters(&remapped)
    );

    Ok(remapped)
}
