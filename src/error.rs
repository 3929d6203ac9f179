//! Error taxonomy for the categorization pipeline.
//!
//! Fatal errors (missing input, schema mismatch) abort before any clustering.
//! Degenerate-data errors (vectorization, detection, too few centroids) are
//! recovered locally by the stage that hits them and never escape a run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file does not exist. Fatal.
    #[error("input file not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    /// The configured text column is missing from the input table. Fatal.
    #[error("column '{column}' not found; available columns: {}", .available.join(", "))]
    SchemaMismatch {
        column: String,
        available: Vec<String>,
    },

    /// Degenerate vocabulary during term extraction. Recovered by falling
    /// back to the next-weaker strategy (passthrough, RAKE, placeholder).
    #[error("vectorization failed: {0}")]
    Vectorization(String),

    /// Language detection failed on one remark. Recovered by routing the
    /// remark to the other-language bucket.
    #[error("language detection failed: {0}")]
    Detection(String),

    /// Fewer than 2 centroids available for hierarchical merging.
    /// Recovered by skipping the reduction step.
    #[error("degenerate clustering input: {0}")]
    DegenerateClustering(String),

    /// Embedding model failure. Fatal.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Clustering capability failure (bad shapes, internal error). Fatal.
    #[error("clustering failed: {0}")]
    Clustering(String),

    /// Unreadable or malformed configuration file. Fatal.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_lists_columns() {
        let err = PipelineError::SchemaMismatch {
            column: "REMARKS".to_string(),
            available: vec!["ID".to_string(), "NOTES".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("REMARKS"));
        assert!(msg.contains("ID, NOTES"));
    }
}
