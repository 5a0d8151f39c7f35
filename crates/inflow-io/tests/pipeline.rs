//! End-to-end integration tests: CSV -> cluster/scan -> JSON / summary CSV.

use std::fs;
use std::path::{Path, PathBuf};

use inflow_cluster::{KscConfig, ScanConfig};
use inflow_io::{ExperimentName, InflowReader, IoError, ResultWriter, SummaryExporter};
use inflow_shape::ShiftBound;
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn cluster_round_trip() {
    // 1. Read CSV (nine projects: scaled copies of a decay, a ramp and a peak)
    let dataset = InflowReader::new(&fixture_path("inflow_9x12.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(dataset.len(), 9);
    assert_eq!(dataset.n_weeks(), 12);
    assert!(
        dataset
            .sequences
            .iter()
            .all(|s| s.as_ref().iter().all(|&v| v > 0.0)),
        "zeros must be substituted"
    );

    // 2. Cluster with k=3
    let result = KscConfig::new(3, ShiftBound::Unbounded)
        .unwrap()
        .with_seed(42)
        .with_n_init(10)
        .fit(&dataset.sequences)
        .unwrap();

    // 3. Write JSON artifact
    let dir = TempDir::new().unwrap();
    let experiment = ExperimentName::new("cluster_rt".into()).unwrap();
    let writer = ResultWriter::new(dir.path(), experiment).unwrap();
    let json_path = writer.write_cluster(&dataset.project_ids, &result).unwrap();

    // 4. Deserialize back and verify
    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(content["experiment"], "cluster_rt");
    assert_eq!(content["k"].as_u64().unwrap(), 3);

    let assignments = content["assignments"].as_object().unwrap();
    assert_eq!(assignments.len(), 9);
    let label = |name: &str| assignments[name]["cluster"].as_u64().unwrap();

    for family in ["decay", "ramp", "peak"] {
        let l0 = label(&format!("{family}-0"));
        assert_eq!(l0, label(&format!("{family}-1")), "{family} split");
        assert_eq!(l0, label(&format!("{family}-2")), "{family} split");
    }
    let mut distinct = vec![label("decay-0"), label("ramp-0"), label("peak-0")];
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 3, "families should have distinct labels");

    for centroid in content["centroids"].as_array().unwrap() {
        assert_eq!(centroid.as_array().unwrap().len(), 12);
    }
    let total: u64 = content["cluster_sizes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(total, 9);
}

#[test]
fn scan_round_trip() {
    let dataset = InflowReader::new(&fixture_path("inflow_9x12.csv"))
        .read()
        .expect("fixture should parse");

    let curve = ScanConfig::new(1, 5, ShiftBound::Unbounded)
        .unwrap()
        .with_seed(42)
        .with_n_init(5)
        .fit(&dataset.sequences)
        .unwrap();

    let dir = TempDir::new().unwrap();
    let experiment = ExperimentName::new("scan_rt".into()).unwrap();
    let writer = ResultWriter::new(dir.path(), experiment).unwrap();
    let json_path = writer.write_scan(dataset.len(), &curve).unwrap();

    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(content["experiment"], "scan_rt");
    assert_eq!(content["n_projects"].as_u64().unwrap(), 9);
    assert_eq!(content["method"], "pairwise");

    let omitted: Vec<u64> = content["omitted"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k.as_u64().unwrap())
        .collect();
    assert!(omitted.contains(&1), "k=1 must be omitted");

    let k_values: Vec<u64> = content["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["k"].as_u64().unwrap())
        .collect();
    assert_eq!(k_values.len() + omitted.len(), 4);
    assert!(k_values.windows(2).all(|w| w[0] < w[1]), "k must ascend");
    for entry in content["points"].as_array().unwrap() {
        let beta_cv = entry["beta_cv"].as_f64().unwrap();
        assert!(beta_cv.is_finite() && beta_cv >= 0.0);
    }
}

#[test]
fn summary_export_round_trip() {
    let dataset = InflowReader::new(&fixture_path("inflow_9x12.csv"))
        .read()
        .unwrap();
    let result = KscConfig::new(3, ShiftBound::Unbounded)
        .unwrap()
        .with_n_init(10)
        .fit(&dataset.sequences)
        .unwrap();

    let dir = TempDir::new().unwrap();
    let summary = dir.path().join("summary.csv");
    fs::copy(fixture_path("summary.csv"), &summary).unwrap();

    let written = SummaryExporter::new(&summary)
        .export(&dataset.project_ids, result.labels())
        .unwrap();
    assert_eq!(written, 9, "the unclustered row is dropped");

    let mut rdr = csv::Reader::from_path(&summary).unwrap();
    let header = rdr.headers().unwrap().clone();
    assert_eq!(
        header.iter().collect::<Vec<_>>(),
        ["name", "stars", "age", "main_language", "cluster"]
    );
    for record in rdr.records() {
        let record = record.unwrap();
        let name = &record[0];
        let index = dataset
            .project_ids
            .iter()
            .position(|id| id.as_str() == name)
            .expect("exported row must be a clustered project");
        let cluster: usize = record[4].parse().unwrap();
        assert_eq!(cluster, result.labels()[index].index());
    }
}

#[test]
fn reader_fixture_files_match_expected_errors() {
    let result = InflowReader::new(&fixture_path("ragged.csv")).read();
    assert!(
        matches!(result, Err(IoError::InconsistentRowLength { row_index: 1, .. })),
        "ragged.csv should give InconsistentRowLength, got: {result:?}"
    );

    let result = InflowReader::new(&fixture_path("missing.csv")).read();
    assert!(
        matches!(result, Err(IoError::FileNotFound { .. })),
        "missing.csv should give FileNotFound, got: {result:?}"
    );
}
