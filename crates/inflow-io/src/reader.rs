//! CSV inflow reader with full input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use inflow_shape::Sequence;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{Dataset, ProjectId};

/// Header of the column holding project identifiers.
const PROJECT_COLUMN: &str = "project";

/// Value written in place of a zero count.
pub const DEFAULT_ZERO_SUBSTITUTE: f64 = 0.1;

/// Reads weekly newcomer counts from a CSV file.
///
/// Expected CSV format:
/// - Header row required: one column named `project`, every other column is a week
/// - `project,w0,w1,...,wn` (the `project` column may sit anywhere)
/// - One row per project, all rows must have the same number of columns
///
/// Counts of exactly zero are replaced by the zero substitute (default
/// [`DEFAULT_ZERO_SUBSTITUTE`]) so that no sequence is identically zero.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | Header has no `project` column |
/// | [`IoError::NoWeekColumns`] | Header has only the project column |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
/// | [`IoError::NegativeValue`] | Cell is below zero |
/// | [`IoError::DuplicateProjectId`] | Same project appears twice |
/// | [`IoError::InvalidZeroSubstitute`] | Substitute is not positive and finite |
pub struct InflowReader {
    path: PathBuf,
    zero_substitute: f64,
}

impl InflowReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            zero_substitute: DEFAULT_ZERO_SUBSTITUTE,
        }
    }

    /// Set the value that replaces zero counts.
    #[must_use]
    pub fn with_zero_substitute(mut self, value: f64) -> Self {
        self.zero_substitute = value;
        self
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display(), zero_substitute = self.zero_substitute))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        if !(self.zero_substitute.is_finite() && self.zero_substitute > 0.0) {
            return Err(IoError::InvalidZeroSubstitute {
                value: self.zero_substitute,
            });
        }

        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // Ragged rows are reported as InconsistentRowLength rather than CsvParse.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?;
        let expected_cols = header.len();
        let project_col = header
            .iter()
            .position(|h| h == PROJECT_COLUMN)
            .ok_or_else(|| IoError::MissingColumn {
                path: self.path.clone(),
                column: PROJECT_COLUMN.to_string(),
            })?;
        if expected_cols < 2 {
            return Err(IoError::NoWeekColumns {
                path: self.path.clone(),
            });
        }
        debug!(expected_cols, project_col, "read CSV header");

        let mut project_ids = Vec::new();
        let mut sequences = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut n_substituted = 0usize;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            let project = record.get(project_col).unwrap_or("").to_string();

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    project_id: project,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            if let Some(&first_row) = seen.get(&project) {
                return Err(IoError::DuplicateProjectId {
                    path: self.path.clone(),
                    project_id: project,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(project.clone(), row_index);

            let mut values = Vec::with_capacity(expected_cols - 1);
            let weeks = record
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != project_col)
                .map(|(_, raw)| raw);
            for (col_index, raw) in weeks.enumerate() {
                let value = self.parse_count(raw, row_index, col_index)?;
                if value == 0.0 {
                    n_substituted += 1;
                    values.push(self.zero_substitute);
                } else {
                    values.push(value);
                }
            }

            let sequence = Sequence::new(values).map_err(|source| IoError::InvalidSequence {
                path: self.path.clone(),
                row_index,
                source,
            })?;

            project_ids.push(ProjectId::new(project));
            sequences.push(sequence);
        }

        if project_ids.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_projects = project_ids.len(),
            n_weeks = expected_cols - 1,
            n_substituted,
            "dataset loaded"
        );

        Ok(Dataset {
            project_ids,
            sequences,
        })
    }

    fn parse_count(&self, raw: &str, row_index: usize, col_index: usize) -> Result<f64, IoError> {
        let value: f64 = raw
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| IoError::NonFiniteValue {
                path: self.path.clone(),
                row_index,
                col_index,
                raw: raw.to_string(),
            })?;
        if value < 0.0 {
            return Err(IoError::NegativeValue {
                path: self.path.clone(),
                row_index,
                col_index,
                value,
            });
        }
        Ok(value)
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_projects() {
        let csv = "project,w0,w1,w2,w3\nrails,3,5,2,1\ndjango,1,1,4,6\nflask,2,0,0,9\n";
        let f = write_csv(csv);
        let ds = InflowReader::new(f.path()).read().unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.n_weeks(), 4);
        assert_eq!(ds.project_ids[0].as_str(), "rails");
        assert_eq!(ds.project_ids[2].as_str(), "flask");
        assert_eq!(ds.sequences[0].as_ref(), &[3.0, 5.0, 2.0, 1.0]);
    }

    #[test]
    fn zeros_replaced_by_default_substitute() {
        let csv = "project,w0,w1,w2\nflask,2,0,9\n";
        let f = write_csv(csv);
        let ds = InflowReader::new(f.path()).read().unwrap();
        assert_eq!(ds.sequences[0].as_ref(), &[2.0, 0.1, 9.0]);
    }

    #[test]
    fn zeros_replaced_by_custom_substitute() {
        let csv = "project,w0,w1,w2\nflask,0,0,1\n";
        let f = write_csv(csv);
        let ds = InflowReader::new(f.path())
            .with_zero_substitute(0.5)
            .read()
            .unwrap();
        assert_eq!(ds.sequences[0].as_ref(), &[0.5, 0.5, 1.0]);
    }

    #[test]
    fn whitespace_around_cells_is_trimmed() {
        let csv = "project, w0, w1\n rails , 1 , 2\n";
        let f = write_csv(csv);
        let ds = InflowReader::new(f.path()).read().unwrap();
        assert_eq!(ds.project_ids[0].as_str(), "rails");
        assert_eq!(ds.sequences[0].as_ref(), &[1.0, 2.0]);
    }

    #[test]
    fn insertion_order_preserved() {
        let csv = "project,w0\nzzz,1\naaa,2\nmmm,3\n";
        let f = write_csv(csv);
        let ds = InflowReader::new(f.path()).read().unwrap();
        let ids: Vec<&str> = ds.project_ids.iter().map(ProjectId::as_str).collect();
        assert_eq!(ids, ["zzz", "aaa", "mmm"]);
    }

    #[test]
    fn error_file_not_found() {
        let result = InflowReader::new(Path::new("/nonexistent/inflow.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("project,w0,w1,w2\n");
        let result = InflowReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn project_column_found_by_name() {
        let csv = "w0,project,w1,w2\n1,rails,0,3\n4,django,5,6\n";
        let f = write_csv(csv);
        let ds = InflowReader::new(f.path()).read().unwrap();
        assert_eq!(ds.project_ids[0].as_str(), "rails");
        assert_eq!(ds.project_ids[1].as_str(), "django");
        assert_eq!(ds.sequences[0].as_ref(), &[1.0, 0.1, 3.0]);
        assert_eq!(ds.sequences[1].as_ref(), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn error_missing_project_column() {
        let f = write_csv("repo,w0,w1\nrails,1,2\n");
        let result = InflowReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::MissingColumn { ref column, .. }) if column == "project"
        ));
    }

    #[test]
    fn error_no_week_columns() {
        let f = write_csv("project\nrails\n");
        let result = InflowReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NoWeekColumns { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let f = write_csv("project,w0,w1,w2\na,1,2,3\nb,1,2\n");
        let result = InflowReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, expected: 4, got: 3, .. })
        ));
    }

    #[test]
    fn error_non_finite_and_unparseable() {
        for bad in ["NaN", "inf", "abc", ""] {
            let f = write_csv(&format!("project,w0,w1\na,1,{bad}\n"));
            let result = InflowReader::new(f.path()).read();
            assert!(
                matches!(result, Err(IoError::NonFiniteValue { col_index: 1, .. })),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn error_negative_count() {
        let f = write_csv("project,w0,w1\na,1,-2\n");
        let result = InflowReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NegativeValue { row_index: 0, col_index: 1, .. })
        ));
    }

    #[test]
    fn error_duplicate_project() {
        let f = write_csv("project,w0,w1\na,1,2\nb,3,4\na,5,6\n");
        let result = InflowReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateProjectId {
                first_row: 0,
                second_row: 2,
                ..
            })
        ));
    }

    #[test]
    fn error_invalid_zero_substitute() {
        let f = write_csv("project,w0\na,1\n");
        for bad in [0.0, -0.1, f64::NAN] {
            let result = InflowReader::new(f.path()).with_zero_substitute(bad).read();
            assert!(matches!(result, Err(IoError::InvalidZeroSubstitute { .. })));
        }
    }
}
