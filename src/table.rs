//! CSV-backed tabular source and sink.

use std::path::Path;

use crate::error::PipelineError;
use crate::output::OutputTable;

/// Read one named column of strings from a CSV file.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<String>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let Some(col_idx) = headers.iter().position(|h| h == column) else {
        return Err(PipelineError::SchemaMismatch {
            column: column.to_string(),
            available: headers.iter().map(|h| h.to_string()).collect(),
        });
    };

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        values.push(record.get(col_idx).unwrap_or("").to_string());
    }

    println!(
        "[Table] Extracted {} raw remarks from column '{}'",
        values.len(),
        column
    );
    Ok(values)
}

/// Write the assembled table as a wide CSV, overwriting any existing file.
/// Missing-marker cells become empty fields.
pub fn write_table(path: &Path, table: &OutputTable) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;

    if !table.columns.is_empty() {
        writer.write_record(table.columns.iter().map(|c| c.name.as_str()))?;
        for row in 0..table.height() {
            let record: Vec<&str> = table
                .columns
                .iter()
                .map(|c| c.cells[row].as_deref().unwrap_or(""))
                .collect();
            writer.write_record(&record)?;
        }
    }

    writer.flush()?;
    println!(
        "[Table] Wrote {} columns to {}",
        table.columns.len(),
        path.display()
    );
    Ok(())
}
