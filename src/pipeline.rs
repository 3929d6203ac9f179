//! Pipeline orchestration: segregate, preprocess, embed, cluster, reduce,
//! name, merge, uniquify, assemble.
//!
//! All heavy capabilities (embedders, clusterers, the language detector)
//! are injected as trait objects, so the orchestration itself runs under
//! test with deterministic fakes. The set of used category names is
//! threaded through explicitly rather than held in shared state.

use std::collections::{HashMap, HashSet};

use crate::cluster::{
    count_clusters, ClusterLabel, DensityClusterer, HierarchicalClusterer, NOISE,
};
use crate::config::PipelineConfig;
use crate::embedding::Embedder;
use crate::error::PipelineError;
use crate::language::{segregate_by_language, DetectLanguage};
use crate::merge::{merge_categories, MergedCategory};
use crate::naming::{cluster_placeholder, name_cluster};
use crate::output::{assemble_table, OutputTable};
use crate::preprocess::preprocess_remarks;
use crate::reduce::reduce_cluster_count;
use crate::unique::unique_name;

/// The assembled pipeline with its injected capabilities.
pub struct Pipeline {
    pub remark_embedder: Box<dyn Embedder>,
    pub name_embedder: Box<dyn Embedder>,
    pub density: Box<dyn DensityClusterer>,
    pub hierarchical: Box<dyn HierarchicalClusterer>,
    pub detector: Box<dyn DetectLanguage>,
    pub config: PipelineConfig,
}

impl Pipeline {
    /// Run the whole batch: every input remark lands in exactly one output
    /// column (a named category, the uncategorized bucket, or the
    /// other-language bucket).
    pub fn run(&self, raw_remarks: &[String]) -> Result<OutputTable, PipelineError> {
        let config = &self.config;

        // Step 1: language segregation
        let (primary, other) = segregate_by_language(
            raw_remarks,
            self.detector.as_ref(),
            &config.primary_language,
            config.min_detect_chars,
        );

        let mut used_names: HashSet<String> = HashSet::new();
        let mut categories: Vec<MergedCategory> = Vec::new();
        let mut remark_labels: Vec<(usize, ClusterLabel)> = Vec::new();

        if primary.is_empty() {
            println!("[Pipeline] No primary-language remarks found. Skipping clustering.");
        } else {
            let texts: Vec<String> = primary.iter().map(|(_, text)| text.clone()).collect();

            // Step 2: boilerplate-aware preprocessing
            let processed = preprocess_remarks(&texts, config.min_doc_frequency);

            // Step 3: embed the cleaned remarks
            let refs: Vec<&str> = processed.iter().map(String::as_str).collect();
            let embeddings = self.remark_embedder.embed(&refs)?;
            if embeddings.len() != processed.len() {
                return Err(PipelineError::Embedding(format!(
                    "embedder returned {} vectors for {} remarks",
                    embeddings.len(),
                    processed.len()
                )));
            }

            // Step 4: density clustering
            let initial = self.density.cluster(
                &embeddings,
                config.min_cluster_size,
                config.min_samples,
            )?;
            if initial.len() != processed.len() {
                return Err(PipelineError::Clustering(format!(
                    "density clusterer returned {} labels for {} remarks",
                    initial.len(),
                    processed.len()
                )));
            }
            println!(
                "[Pipeline] Initial clustering found {} clusters",
                count_clusters(&initial)
            );

            // Step 5: reduce the cluster count to the configured ceiling
            let labels = reduce_cluster_count(
                &initial,
                &embeddings,
                config.max_remark_clusters,
                self.hierarchical.as_ref(),
            )?;

            remark_labels = primary
                .iter()
                .zip(labels.iter())
                .map(|((index, _), &label)| (*index, ClusterLabel::from_raw(label)))
                .collect();

            // Step 6: name every cluster from its members' cleaned texts
            let mut unique_labels: Vec<i32> =
                labels.iter().copied().filter(|&l| l != NOISE).collect();
            unique_labels.sort_unstable();
            unique_labels.dedup();

            let mut cluster_texts: HashMap<i32, Vec<String>> = HashMap::new();
            for (text, &label) in processed.iter().zip(labels.iter()) {
                if label != NOISE {
                    cluster_texts.entry(label).or_default().push(text.clone());
                }
            }

            let mut candidate_names: Vec<String> = Vec::with_capacity(unique_labels.len());
            for &label in &unique_labels {
                let name = name_cluster(&cluster_texts[&label], config.target_name_words)
                    .unwrap_or_else(|| cluster_placeholder(label));
                candidate_names.push(name);
            }
            println!(
                "[Pipeline] Generated {} candidate cluster names",
                candidate_names.len()
            );

            // Step 7: merge categories whose names are semantically close
            let merged = merge_categories(
                &candidate_names,
                &unique_labels,
                &cluster_texts,
                self.name_embedder.as_ref(),
                self.hierarchical.as_ref(),
                config.max_name_clusters,
                config.target_name_words,
            )?;

            // Step 8: make the final names globally unique
            for mut category in merged {
                let name = unique_name(&category.name, &used_names);
                used_names.insert(name.to_lowercase());
                println!("[Pipeline] Final category: '{}'", name);
                category.name = name;
                categories.push(category);
            }
        }

        // Step 9: assemble the padded output table
        Ok(assemble_table(
            raw_remarks,
            &remark_labels,
            &categories,
            &other,
            &mut used_names,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{AverageLinkage, CosineDbscan};

    /// Keyword-axis embedder: deterministic unit-ish vectors where texts
    /// sharing topic words are close and others orthogonal.
    struct KeywordEmbedder {
        axes: Vec<&'static str>,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            Self {
                axes: vec!["power", "supply", "street", "light", "water", "meter"],
            }
        }
    }

    impl Embedder for KeywordEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, PipelineError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lowered = text.to_lowercase();
                    let mut v: Vec<f32> = self
                        .axes
                        .iter()
                        .map(|axis| if lowered.contains(axis) { 1.0 } else { 0.0 })
                        .collect();
                    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
                    if norm > 0.0 {
                        for x in &mut v {
                            *x /= norm;
                        }
                    } else {
                        // Texts with no known axis get a dedicated last slot
                        v = vec![0.0; self.axes.len()];
                        *v.last_mut().unwrap() = 1.0;
                    }
                    v
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            self.axes.len()
        }
    }

    /// Always-primary-language detector.
    struct AlwaysPrimary;

    impl DetectLanguage for AlwaysPrimary {
        fn detect(&self, _text: &str) -> Result<String, PipelineError> {
            Ok("en".to_string())
        }
    }

    fn pipeline(max_remark_clusters: usize) -> Pipeline {
        let config = PipelineConfig {
            max_remark_clusters,
            ..PipelineConfig::default()
        };
        Pipeline {
            remark_embedder: Box::new(KeywordEmbedder::new()),
            name_embedder: Box::new(KeywordEmbedder::new()),
            density: Box::new(CosineDbscan::with_threshold(0.7)),
            hierarchical: Box::new(AverageLinkage),
            detector: Box::new(AlwaysPrimary),
            config,
        }
    }

    fn remarks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn all_cells(table: &OutputTable) -> Vec<String> {
        table
            .columns
            .iter()
            .flat_map(|c| c.cells.iter().flatten().cloned())
            .collect()
    }

    #[test]
    fn test_end_to_end_two_topic_scenario() {
        let input = remarks(&[
            "no power supply since three days",
            "power supply not restored since days",
            "still no power supply in colony",
            "power supply gone again since yesterday",
            "street light not working",
            "street light not working properly",
        ]);

        let table = pipeline(10).run(&input).unwrap();

        // Every remark appears exactly once
        let mut seen = all_cells(&table);
        seen.sort();
        let mut expected: Vec<String> = input.clone();
        expected.sort();
        assert_eq!(seen, expected);

        // At most two categories, none uncategorized
        assert!(table.columns.len() <= 2, "too many columns: {:?}",
            table.columns.iter().map(|c| &c.name).collect::<Vec<_>>());
        assert!(table
            .columns
            .iter()
            .all(|c| !c.name.starts_with("Uncategorized")));

        // Names carry recognizable topic tokens
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert!(
            names
                .iter()
                .any(|n| n.contains("Power") || n.contains("Supply")),
            "no power category in {:?}",
            names
        );
        assert!(
            names
                .iter()
                .any(|n| n.contains("Street") || n.contains("Light")),
            "no street light category in {:?}",
            names
        );
    }

    #[test]
    fn test_short_remark_never_reaches_clustering() {
        let input = remarks(&[
            "ok",
            "no power supply since three days",
            "power supply not restored since days",
            "still no power supply in colony",
        ]);

        let table = pipeline(10).run(&input).unwrap();

        let other = table
            .columns
            .iter()
            .find(|c| c.name.starts_with("Other Language"))
            .expect("other-language bucket missing");
        assert_eq!(other.cells[0], Some("ok".to_string()));

        // All four remarks still accounted for
        assert_eq!(all_cells(&table).len(), 4);
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let table = pipeline(10).run(&[]).unwrap();
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_final_names_unique_case_insensitively() {
        let input = remarks(&[
            "no power supply since three days",
            "power supply not restored since days",
            "street light not working",
            "street light not working properly",
            "water logging near the park area",
            "water logging reported near school",
        ]);

        let table = pipeline(10).run(&input).unwrap();
        let mut lowered: Vec<String> = table
            .columns
            .iter()
            .map(|c| c.name.to_lowercase())
            .collect();
        lowered.sort();
        let before = lowered.len();
        lowered.dedup();
        assert_eq!(lowered.len(), before, "duplicate category names");
    }

    #[test]
    fn test_zero_primary_remarks() {
        // Everything short-circuits to the other-language bucket
        let input = remarks(&["ok", "??", "12"]);

        let table = pipeline(10).run(&input).unwrap();
        assert_eq!(table.columns.len(), 1);
        assert!(table.columns[0].name.starts_with("Other Language"));
        assert_eq!(all_cells(&table).len(), 3);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let input = remarks(&[
            "no power supply since three days",
            "power supply not restored since days",
            "street light not working",
            "street light not working properly",
        ]);

        let first = pipeline(10).run(&input).unwrap();
        let second = pipeline(10).run(&input).unwrap();
        let names = |t: &OutputTable| {
            t.columns.iter().map(|c| c.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(all_cells(&first), all_cells(&second));
    }

    #[test]
    fn test_noise_routes_to_uncategorized() {
        let input = remarks(&[
            "no power supply since three days",
            "power supply not restored since days",
            "completely unrelated gibberish about nothing",
        ]);

        let table = pipeline(10).run(&input).unwrap();
        let bucket = table
            .columns
            .iter()
            .find(|c| c.name.starts_with("Uncategorized"))
            .expect("expected an uncategorized bucket");
        assert_eq!(
            bucket.cells[0],
            Some("completely unrelated gibberish about nothing".to_string())
        );
    }

    #[test]
    fn test_cluster_ceiling_respected() {
        // Six topics, ceiling of 2: reducer must fold them down
        let input = remarks(&[
            "power failure in the area",
            "power failure again reported",
            "supply interruption in sector",
            "supply interruption reported twice",
            "street repair work pending",
            "street repair still pending",
            "light flickering all night",
            "light flickering continues",
            "water shortage in block",
            "water shortage persists daily",
            "meter reading incorrect again",
            "meter reading disputed by consumer",
        ]);

        let config = PipelineConfig {
            max_remark_clusters: 2,
            max_name_clusters: 2,
            ..PipelineConfig::default()
        };
        let p = Pipeline {
            remark_embedder: Box::new(KeywordEmbedder::new()),
            name_embedder: Box::new(KeywordEmbedder::new()),
            density: Box::new(CosineDbscan::with_threshold(0.7)),
            hierarchical: Box::new(AverageLinkage),
            detector: Box::new(AlwaysPrimary),
            config,
        };

        let table = p.run(&input).unwrap();
        let category_count = table
            .columns
            .iter()
            .filter(|c| {
                !c.name.starts_with("Uncategorized") && !c.name.starts_with("Other Language")
            })
            .count();
        assert!(category_count <= 2, "got {} categories", category_count);
        // Conservation still holds after reduction
        assert_eq!(all_cells(&table).len(), input.len());
    }
}
