//! Output assembly: one column of raw remark texts per final category,
//! plus the reserved uncategorized and other-language buckets, padded to a
//! common height.

use std::collections::{HashMap, HashSet};

use crate::cluster::ClusterLabel;
use crate::merge::MergedCategory;
use crate::unique::unique_name;

/// Base name for the bucket holding density-clustering noise.
pub const UNCATEGORIZED_BASE: &str = "Uncategorized Remarks";

/// Base name for the bucket holding non-primary-language remarks.
pub const OTHER_LANGUAGE_BASE: &str = "Other Language Remarks";

/// One output column: a final category name and its member remark texts.
/// `None` cells are padding.
#[derive(Debug, Clone)]
pub struct OutputColumn {
    pub name: String,
    pub cells: Vec<Option<String>>,
}

/// The final wide table, columns in deterministic order.
#[derive(Debug, Clone, Default)]
pub struct OutputTable {
    pub columns: Vec<OutputColumn>,
}

impl OutputTable {
    /// Height of the tallest column (all columns share it after padding).
    pub fn height(&self) -> usize {
        self.columns.iter().map(|c| c.cells.len()).max().unwrap_or(0)
    }

    /// Find a column by exact name.
    pub fn column(&self, name: &str) -> Option<&OutputColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Build the final table. `remark_labels` pairs each primary-language
/// remark's original index with its reduced cluster label; `categories`
/// carry final (already unique) names and their source-label provenance;
/// `other_remarks` are the non-primary-language remarks from segregation.
/// Bucket names are uniquified against `used_names` here.
pub fn assemble_table(
    raw_remarks: &[String],
    remark_labels: &[(usize, ClusterLabel)],
    categories: &[MergedCategory],
    other_remarks: &[(usize, String)],
    used_names: &mut HashSet<String>,
) -> OutputTable {
    // Reverse map: source cluster label -> category position
    let mut label_to_category: HashMap<i32, usize> = HashMap::new();
    for (pos, category) in categories.iter().enumerate() {
        for &label in &category.source_labels {
            label_to_category.insert(label, pos);
        }
    }

    let mut category_cells: Vec<Vec<Option<String>>> = vec![Vec::new(); categories.len()];
    let mut uncategorized: Vec<Option<String>> = Vec::new();

    // remark_labels is in ascending original-index order, which keeps every
    // column ordered by original position
    for &(index, label) in remark_labels {
        let text = raw_remarks[index].clone();
        match label {
            ClusterLabel::Noise => uncategorized.push(Some(text)),
            ClusterLabel::Assigned(id) => match label_to_category.get(&id) {
                Some(&pos) => category_cells[pos].push(Some(text)),
                // A label with no category falls back to the noise bucket
                None => uncategorized.push(Some(text)),
            },
        }
    }

    let mut table = OutputTable::default();
    for (category, cells) in categories.iter().zip(category_cells) {
        table.columns.push(OutputColumn {
            name: category.name.clone(),
            cells,
        });
    }

    if !uncategorized.is_empty() {
        let name = unique_name(UNCATEGORIZED_BASE, used_names);
        used_names.insert(name.to_lowercase());
        println!(
            "[Output] Added column '{}' for {} remarks",
            name,
            uncategorized.len()
        );
        table.columns.push(OutputColumn {
            name,
            cells: uncategorized,
        });
    }

    if !other_remarks.is_empty() {
        let name = unique_name(OTHER_LANGUAGE_BASE, used_names);
        used_names.insert(name.to_lowercase());
        println!(
            "[Output] Added column '{}' for {} remarks",
            name,
            other_remarks.len()
        );
        table.columns.push(OutputColumn {
            name,
            cells: other_remarks
                .iter()
                .map(|(_, text)| Some(text.clone()))
                .collect(),
        });
    }

    // Pad every column to the tallest
    let height = table.height();
    for column in &mut table.columns {
        column.cells.resize(height, None);
    }

    table
}
