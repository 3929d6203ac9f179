//! Second-pass merging of categories by name semantics.
//!
//! Small clusters frequently describe the same underlying issue with
//! different wording. Re-embedding the candidate names with a short-text
//! model and clustering those vectors merges such near-duplicate categories
//! without re-clustering the remarks themselves; each merged group is then
//! re-named from the union of its members' cleaned remark texts.

use std::collections::HashMap;

use crate::cluster::HierarchicalClusterer;
use crate::embedding::Embedder;
use crate::error::PipelineError;
use crate::naming::{merged_placeholder, name_cluster};

/// One merged category, pre-uniqueness.
#[derive(Debug, Clone)]
pub struct MergedCategory {
    /// Group id from name clustering (contiguous, ascending)
    pub group: i32,
    /// Original cluster labels folded into this category; never empty
    pub source_labels: Vec<i32>,
    /// Name derived from the union of member texts (placeholder on failure)
    pub name: String,
}

/// Merge per-cluster candidate names into at most `max_name_clusters`
/// categories. `candidate_names[i]` summarizes `cluster_labels[i]`;
/// `cluster_texts` maps each label to its members' cleaned texts.
pub fn merge_categories(
    candidate_names: &[String],
    cluster_labels: &[i32],
    cluster_texts: &HashMap<i32, Vec<String>>,
    name_embedder: &dyn Embedder,
    hierarchical: &dyn HierarchicalClusterer,
    max_name_clusters: usize,
    target_words: usize,
) -> Result<Vec<MergedCategory>, PipelineError> {
    if candidate_names.is_empty() {
        return Ok(vec![]);
    }
    if candidate_names.len() != cluster_labels.len() {
        return Err(PipelineError::Clustering(format!(
            "{} candidate names for {} cluster labels",
            candidate_names.len(),
            cluster_labels.len()
        )));
    }

    // Second embedding pass: short-text vectors over the names themselves
    let name_refs: Vec<&str> = candidate_names.iter().map(String::as_str).collect();
    let name_vectors = name_embedder.embed(&name_refs)?;
    if name_vectors.len() != candidate_names.len() {
        return Err(PipelineError::Embedding(format!(
            "name embedder returned {} vectors for {} names",
            name_vectors.len(),
            candidate_names.len()
        )));
    }

    // At least 2 groups whenever more than one name exists
    let mut n_groups = max_name_clusters.min(candidate_names.len());
    if candidate_names.len() > 1 && n_groups < 2 {
        n_groups = 2;
    }
    if n_groups == 0 {
        n_groups = 1;
    }

    let group_labels = hierarchical.cluster(&name_vectors, n_groups)?;
    if group_labels.len() != candidate_names.len() {
        return Err(PipelineError::Clustering(format!(
            "name clusterer returned {} labels for {} names",
            group_labels.len(),
            candidate_names.len()
        )));
    }

    let mut groups: Vec<i32> = group_labels.clone();
    groups.sort_unstable();
    groups.dedup();

    println!(
        "[Merge] Clustered {} candidate names into {} groups",
        candidate_names.len(),
        groups.len()
    );

    let mut merged: Vec<MergedCategory> = Vec::with_capacity(groups.len());
    for &group in &groups {
        let source_labels: Vec<i32> = group_labels
            .iter()
            .zip(cluster_labels.iter())
            .filter(|(&g, _)| g == group)
            .map(|(_, &label)| label)
            .collect();

        // Union of the member clusters' cleaned texts, in label order
        let mut union_texts: Vec<String> = Vec::new();
        for label in &source_labels {
            if let Some(texts) = cluster_texts.get(label) {
                union_texts.extend(texts.iter().cloned());
            }
        }

        let name = name_cluster(&union_texts, target_words)
            .unwrap_or_else(|| merged_placeholder(group));
        println!("[Merge] Group {} ({} clusters): '{}'", group, source_labels.len(), name);

        merged.push(MergedCategory {
            group,
            source_labels,
            name,
        });
    }

    Ok(merged)
}
