//! JSON result writer for clustering and βCV scan outputs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use inflow_cluster::{ClusteringResult, ScoreCurve};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ExperimentName, ProjectId};

/// Writes clustering and scan results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_cluster.json` and
/// `{experiment}_scan.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a clustering result to `{experiment}_cluster.json` and return its path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::LabelCountMismatch`] | `project_ids` and the result differ in length |
    /// | [`IoError::Serialize`] | Artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | File cannot be written |
    #[instrument(skip_all, fields(k = result.k()))]
    pub fn write_cluster(
        &self,
        project_ids: &[ProjectId],
        result: &ClusteringResult,
    ) -> Result<PathBuf, IoError> {
        let assignment = &result.assignment;
        if project_ids.len() != assignment.len() {
            return Err(IoError::LabelCountMismatch {
                n_projects: project_ids.len(),
                n_labels: assignment.len(),
            });
        }

        let projects: BTreeMap<&str, ProjectEntry> = project_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let entry = ProjectEntry {
                    cluster: assignment.labels()[i].index(),
                    shift: assignment.shifts()[i],
                    distance: assignment.distances()[i],
                };
                (id.as_str(), entry)
            })
            .collect();

        let centroids: Vec<&[f64]> = result.centroids.iter().map(AsRef::as_ref).collect();

        let artifact = ClusterArtifact {
            experiment: self.experiment.as_str(),
            k: result.k(),
            objective: result.objective.value(),
            converged: result.converged,
            iterations: result.iterations,
            reseeds: result.reseeds,
            restarts_used: result.restarts_used,
            cluster_sizes: result.cluster_sizes(),
            assignments: projects,
            centroids,
        };

        let path = self.artifact_path("cluster");
        write_json(&path, &artifact)?;
        info!(path = %path.display(), "cluster result written");
        Ok(path)
    }

    /// Write a βCV score curve to `{experiment}_scan.json` and return its path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | Artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | File cannot be written |
    #[instrument(skip_all, fields(points = curve.len()))]
    pub fn write_scan(&self, n_projects: usize, curve: &ScoreCurve) -> Result<PathBuf, IoError> {
        let points: Vec<ScoreEntry> = curve
            .points
            .iter()
            .map(|p| ScoreEntry {
                k: p.k,
                beta_cv: p.beta_cv,
                objective: p.objective.value(),
                converged: p.converged,
            })
            .collect();

        let artifact = ScanArtifact {
            experiment: self.experiment.as_str(),
            n_projects,
            method: curve.method.to_string(),
            points,
            omitted: &curve.omitted,
        };

        let path = self.artifact_path("scan");
        write_json(&path, &artifact)?;
        info!(path = %path.display(), "scan result written");
        Ok(path)
    }

    fn artifact_path(&self, kind: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()))
    }
}

fn write_json<T: Serialize>(path: &Path, artifact: &T) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct ClusterArtifact<'a> {
    experiment: &'a str,
    k: usize,
    objective: f64,
    converged: bool,
    iterations: usize,
    reseeds: usize,
    restarts_used: usize,
    cluster_sizes: Vec<usize>,
    assignments: BTreeMap<&'a str, ProjectEntry>,
    centroids: Vec<&'a [f64]>,
}

#[derive(Serialize)]
struct ProjectEntry {
    cluster: usize,
    shift: isize,
    distance: f64,
}

#[derive(Serialize)]
struct ScanArtifact<'a> {
    experiment: &'a str,
    n_projects: usize,
    method: String,
    points: Vec<ScoreEntry>,
    omitted: &'a [usize],
}

#[derive(Serialize)]
struct ScoreEntry {
    k: usize,
    beta_cv: f64,
    objective: f64,
    converged: bool,
}
