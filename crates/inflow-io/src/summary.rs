//! Export of cluster labels into a project summary CSV.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use inflow_cluster::ClusterLabel;
use tracing::{info, instrument, warn};

use crate::IoError;
use crate::domain::ProjectId;

/// Name of the key column matched against project IDs.
const NAME_COLUMN: &str = "name";
/// Name of the column that receives the cluster label.
const CLUSTER_COLUMN: &str = "cluster";

/// Rewrites a summary CSV with a `cluster` column.
///
/// Rows are matched on the `name` column. Rows whose name has no cluster
/// assignment are dropped; matched rows keep every other column and gain
/// (or overwrite) `cluster`. The row order of the summary is preserved.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | Summary doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | Header has no `name` column |
/// | [`IoError::LabelCountMismatch`] | Project IDs and labels differ in length |
/// | [`IoError::WriteCsv`] | Output cannot be written |
pub struct SummaryExporter {
    input: PathBuf,
    output: PathBuf,
}

impl SummaryExporter {
    /// Export in place: read and overwrite the same file.
    pub fn new(path: &Path) -> Self {
        Self {
            input: path.to_path_buf(),
            output: path.to_path_buf(),
        }
    }

    /// Write the result to a different file instead of overwriting the input.
    #[must_use]
    pub fn with_output(mut self, path: &Path) -> Self {
        self.output = path.to_path_buf();
        self
    }

    /// Attach `labels[i]` to the row named `project_ids[i]` and return the
    /// number of rows written.
    #[instrument(skip_all, fields(input = %self.input.display(), output = %self.output.display()))]
    pub fn export(&self, project_ids: &[ProjectId], labels: &[ClusterLabel]) -> Result<usize, IoError> {
        if project_ids.len() != labels.len() {
            return Err(IoError::LabelCountMismatch {
                n_projects: project_ids.len(),
                n_labels: labels.len(),
            });
        }
        let by_name: HashMap<&str, ClusterLabel> = project_ids
            .iter()
            .map(ProjectId::as_str)
            .zip(labels.iter().copied())
            .collect();

        let file = std::fs::File::open(&self.input).map_err(|e| IoError::FileNotFound {
            path: self.input.clone(),
            source: e,
        })?;
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut header = rdr.headers().map_err(|e| self.parse_error(e))?.clone();
        let name_col = header
            .iter()
            .position(|h| h == NAME_COLUMN)
            .ok_or_else(|| IoError::MissingColumn {
                path: self.input.clone(),
                column: NAME_COLUMN.to_string(),
            })?;
        let cluster_col = header.iter().position(|h| h == CLUSTER_COLUMN);
        if cluster_col.is_none() {
            header.push_field(CLUSTER_COLUMN);
        }

        // Read fully before writing so in-place export never truncates its input.
        let mut rows = Vec::new();
        let mut n_dropped = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| self.parse_error(e))?;
            let Some(label) = record.get(name_col).and_then(|name| by_name.get(name)) else {
                n_dropped += 1;
                continue;
            };
            let label = label.index().to_string();
            let row: csv::StringRecord = match cluster_col {
                Some(col) => record
                    .iter()
                    .enumerate()
                    .map(|(i, field)| if i == col { label.as_str() } else { field })
                    .collect(),
                None => record.iter().chain(std::iter::once(label.as_str())).collect(),
            };
            rows.push(row);
        }

        let write_error = |e: csv::Error| IoError::WriteCsv {
            path: self.output.clone(),
            source: e,
        };
        let mut wtr = csv::Writer::from_path(&self.output).map_err(write_error)?;
        wtr.write_record(&header).map_err(write_error)?;
        for row in &rows {
            wtr.write_record(row).map_err(write_error)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: self.output.clone(),
            source: e,
        })?;

        if n_dropped > 0 {
            warn!(n_dropped, "summary rows without a cluster assignment dropped");
        }
        info!(n_written = rows.len(), "summary exported");
        Ok(rows.len())
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.input.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ids(names: &[&str]) -> Vec<ProjectId> {
        names.iter().copied().map(ProjectId::new).collect()
    }

    fn labels(values: &[usize]) -> Vec<ClusterLabel> {
        values.iter().copied().map(ClusterLabel::new).collect()
    }

    #[test]
    fn adds_cluster_column_and_drops_unmatched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        fs::write(&path, "name,stars,age\nrails,100,12\norphan,5,1\ndjango,80,10\n").unwrap();

        let n = SummaryExporter::new(&path)
            .export(&ids(&["django", "rails"]), &labels(&[1, 0]))
            .unwrap();
        assert_eq!(n, 2);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "name,stars,age,cluster\nrails,100,12,0\ndjango,80,10,1\n");
    }

    #[test]
    fn overwrites_existing_cluster_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        fs::write(&path, "name,cluster,stars\nrails,7,100\n").unwrap();

        SummaryExporter::new(&path)
            .export(&ids(&["rails"]), &labels(&[2]))
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "name,cluster,stars\nrails,2,100\n");
    }

    #[test]
    fn writes_to_separate_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("summary.csv");
        let output = dir.path().join("clustered.csv");
        let original = "name,stars\nrails,100\n";
        fs::write(&input, original).unwrap();

        SummaryExporter::new(&input)
            .with_output(&output)
            .export(&ids(&["rails"]), &labels(&[0]))
            .unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap(), original);
        assert_eq!(fs::read_to_string(&output).unwrap(), "name,stars,cluster\nrails,100,0\n");
    }

    #[test]
    fn error_missing_name_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        fs::write(&path, "project,stars\nrails,100\n").unwrap();

        let result = SummaryExporter::new(&path).export(&ids(&["rails"]), &labels(&[0]));
        assert!(matches!(result, Err(IoError::MissingColumn { .. })));
    }

    #[test]
    fn error_label_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        fs::write(&path, "name\nrails\n").unwrap();

        let result = SummaryExporter::new(&path).export(&ids(&["rails", "django"]), &labels(&[0]));
        assert!(matches!(
            result,
            Err(IoError::LabelCountMismatch { n_projects: 2, n_labels: 1 })
        ));
    }

    #[test]
    fn error_summary_not_found() {
        let result = SummaryExporter::new(Path::new("/nonexistent/summary.csv"))
            .export(&ids(&["rails"]), &labels(&[0]));
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }
}
