//! In-memory table passed between ingestion and the later stages, and its
//! delimited-text form on disk.

use crate::error::{PipelineError, PipelineResult};
use crate::fsio::ensure_parent_dir;
use netsec_store::Record;
use std::path::Path;

/// A cell; `None` is the canonical missing value.
pub type Cell = Option<String>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> PipelineResult<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(PipelineError::DataFormat(format!(
                    "row {idx} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table from raw documents.
    ///
    /// Columns appear in first-seen order across all records; a field absent
    /// from a record is missing in that row.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| columns.iter().map(|c| record.get(c).and_then(json_to_cell)).collect())
            .collect();

        Self { columns, rows }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Removes a column; returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Replaces every cell equal to `token` with a missing value; returns the count.
    pub fn replace_with_missing(&mut self, token: &str) -> usize {
        let mut replaced = 0;
        for cell in self.rows.iter_mut().flatten() {
            if cell.as_deref() == Some(token) {
                *cell = None;
                replaced += 1;
            }
        }
        replaced
    }

    /// New table holding the given rows, in the given order.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().filter_map(|&i| self.rows.get(i).cloned()).collect(),
        }
    }

    /// Parses a column as numbers. Missing cells come back as `None`.
    pub fn numeric_column(&self, name: &str) -> PipelineResult<Vec<Option<f64>>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| PipelineError::DataFormat(format!("column not found: {name}")))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| match row[idx].as_deref() {
                None => Ok(None),
                Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
                    PipelineError::DataFormat(format!(
                        "column {name} row {row_idx}: {raw:?} is not numeric"
                    ))
                }),
            })
            .collect()
    }

    /// Writes the table with a header row and no index column.
    pub fn write_csv(&self, path: &Path) -> PipelineResult<()> {
        ensure_parent_dir(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| PipelineError::csv_write(path, e))?;

        writer.write_record(&self.columns).map_err(|e| PipelineError::csv_write(path, e))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
                .map_err(|e| PipelineError::csv_write(path, e))?;
        }
        writer.flush().map_err(|e| PipelineError::persistence(path, e))?;
        Ok(())
    }

    /// Reads a table written by `write_csv`; empty fields load as missing.
    pub fn read_csv(path: &Path) -> PipelineResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| PipelineError::csv_read(path, &e))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| PipelineError::csv_read(path, &e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PipelineError::csv_read(path, &e))?;
            rows.push(
                record
                    .iter()
                    .map(|field| if field.is_empty() { None } else { Some(field.to_string()) })
                    .collect(),
            );
        }

        Self::new(columns, rows)
    }
}

fn json_to_cell(value: &serde_json::Value) -> Cell {
    use serde_json::Value;
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
