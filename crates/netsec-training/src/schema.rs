//! Reference schema for the ingested table, read from YAML:
//!
//! ```yaml
//! columns:
//!   - having_IP_Address: int64
//!   - Result: int64
//! numerical_columns:
//!   - having_IP_Address
//!   - Result
//! ```

use crate::error::{PipelineError, PipelineResult};
use crate::frame::Frame;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub dtype: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSchema {
    pub columns: Vec<ColumnSpec>,
    pub numerical_columns: Vec<String>,
}

#[derive(Deserialize)]
struct RawSchema {
    columns: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    numerical_columns: Vec<String>,
}

impl DataSchema {
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Schema(format!("failed to read {}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
            .map_err(|e| PipelineError::Schema(format!("{}: {e}", path.display())))
    }

    pub fn from_yaml_str(text: &str) -> PipelineResult<Self> {
        let raw: RawSchema =
            serde_yaml::from_str(text).map_err(|e| PipelineError::Schema(e.to_string()))?;

        let mut columns = Vec::with_capacity(raw.columns.len());
        for (idx, entry) in raw.columns.into_iter().enumerate() {
            let mut entry = entry.into_iter();
            let (Some((name, dtype)), None) = (entry.next(), entry.next()) else {
                return Err(PipelineError::Schema(format!(
                    "columns[{idx}] must be a single `name: dtype` entry"
                )));
            };
            columns.push(ColumnSpec { name, dtype });
        }

        if columns.is_empty() {
            return Err(PipelineError::Schema("schema declares no columns".to_string()));
        }
        for name in &raw.numerical_columns {
            if !columns.iter().any(|c| &c.name == name) {
                return Err(PipelineError::Schema(format!(
                    "numerical column {name} is not a declared column"
                )));
            }
        }

        Ok(Self { columns, numerical_columns: raw.numerical_columns })
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Differences between `frame` and this schema; empty when they agree.
    #[must_use]
    pub fn check(&self, frame: &Frame) -> Vec<String> {
        let mut issues = Vec::new();

        if frame.width() != self.column_count() {
            issues.push(format!(
                "expected {} columns, found {}",
                self.column_count(),
                frame.width()
            ));
        }
        for spec in &self.columns {
            if frame.column_index(&spec.name).is_none() {
                issues.push(format!("missing column {}", spec.name));
            }
        }
        for name in frame.columns() {
            if !self.has_column(name) {
                issues.push(format!("unexpected column {name}"));
            }
        }
        for name in &self.numerical_columns {
            if frame.column_index(name).is_some() {
                if let Err(e) = frame.numeric_column(name) {
                    issues.push(e.to_string());
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "columns:\n  - a: int64\n  - b: float64\nnumerical_columns:\n  - a\n  - b\n";

    fn frame(columns: &[&str], rows: &[&[Option<&str>]]) -> Frame {
        Frame::new(
            columns.iter().map(|c| (*c).to_string()).collect(),
            rows.iter().map(|r| r.iter().map(|c| c.map(str::to_string)).collect()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_parses_ordered_columns() {
        let schema = DataSchema::from_yaml_str(SCHEMA).unwrap();
        assert_eq!(schema.column_count(), 2);
        assert_eq!(schema.columns[1], ColumnSpec { name: "b".into(), dtype: "float64".into() });
    }

    #[test]
    fn test_rejects_multi_entry_column() {
        let err = DataSchema::from_yaml_str("columns:\n  - {a: int64, b: int64}\n").unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn test_rejects_unknown_numerical_column() {
        assert!(DataSchema::from_yaml_str("columns:\n  - a: int64\nnumerical_columns:\n  - z\n").is_err());
    }

    #[test]
    fn test_check_matching_frame_has_no_issues() {
        let schema = DataSchema::from_yaml_str(SCHEMA).unwrap();
        let f = frame(&["a", "b"], &[&[Some("1"), None]]);
        assert!(schema.check(&f).is_empty());
    }

    #[test]
    fn test_check_reports_count_name_and_type_problems() {
        let schema = DataSchema::from_yaml_str(SCHEMA).unwrap();
        let f = frame(&["a", "c", "d"], &[&[Some("x"), Some("1"), Some("1")]]);
        let issues = schema.check(&f);
        assert!(issues.iter().any(|i| i.contains("expected 2 columns, found 3")));
        assert!(issues.iter().any(|i| i.contains("missing column b")));
        assert!(issues.iter().any(|i| i.contains("unexpected column c")));
        assert!(issues.iter().any(|i| i.contains("not numeric")));
    }
}
