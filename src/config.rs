//! Pipeline configuration.
//!
//! All knobs carry defaults tuned for operational complaint remarks; a JSON
//! config file can override any subset of them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Column holding the raw remarks in the input table
    #[serde(default = "default_text_column")]
    pub text_column: String,
    /// ISO 639-1 tag of the primary language
    #[serde(default = "default_primary_language")]
    pub primary_language: String,
    /// Remarks shorter than this skip language detection
    #[serde(default = "default_min_detect_chars")]
    pub min_detect_chars: usize,
    /// Document-frequency fraction above which a phrase is boilerplate
    #[serde(default = "default_min_doc_frequency")]
    pub min_doc_frequency: f64,
    /// Density clustering: minimum members per cluster
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
    /// Density clustering: neighborhood size for a core point
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Ceiling on remark clusters before centroid merging kicks in
    #[serde(default = "default_max_remark_clusters")]
    pub max_remark_clusters: usize,
    /// Ceiling on final categories after name merging
    #[serde(default = "default_max_name_clusters")]
    pub max_name_clusters: usize,
    /// Target word count for generated category names
    #[serde(default = "default_target_name_words")]
    pub target_name_words: usize,
}

fn default_text_column() -> String {
    "REMARKS".to_string()
}

fn default_primary_language() -> String {
    "en".to_string()
}

fn default_min_detect_chars() -> usize {
    10
}

fn default_min_doc_frequency() -> f64 {
    0.8
}

fn default_min_cluster_size() -> usize {
    2
}

fn default_min_samples() -> usize {
    2
}

fn default_max_remark_clusters() -> usize {
    10
}

fn default_max_name_clusters() -> usize {
    5
}

fn default_target_name_words() -> usize {
    7
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_column: default_text_column(),
            primary_language: default_primary_language(),
            min_detect_chars: default_min_detect_chars(),
            min_doc_frequency: default_min_doc_frequency(),
            min_cluster_size: default_min_cluster_size(),
            min_samples: default_min_samples(),
            max_remark_clusters: default_max_remark_clusters(),
            max_name_clusters: default_max_name_clusters(),
            target_name_words: default_target_name_words(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| PipelineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.text_column, "REMARKS");
        assert_eq!(config.primary_language, "en");
        assert_eq!(config.min_detect_chars, 10);
        assert!((config.min_doc_frequency - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.max_remark_clusters, 10);
        assert_eq!(config.max_name_clusters, 5);
        assert_eq!(config.target_name_words, 7);
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"max_remark_clusters": 4, "text_column": "NOTES"}"#)
            .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.max_remark_clusters, 4);
        assert_eq!(config.text_column, "NOTES");
        // Untouched fields keep their defaults
        assert_eq!(config.max_name_clusters, 5);
    }

    #[test]
    fn test_missing_file_errors() {
        let err = PipelineConfig::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound { .. }));
    }
}
