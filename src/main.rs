use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use inflow_cluster::{BetaCvMethod, KscConfig, ScanConfig};
use inflow_io::{
    DEFAULT_ZERO_SUBSTITUTE, Dataset, ExperimentName, InflowReader, ResultWriter, SummaryExporter,
};
use inflow_shape::ShiftBound;

#[derive(Parser)]
#[command(name = "inflow")]
#[command(about = "Shape-based clustering of newcomer-inflow time series")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared tuning parameters for K-SC clustering.
#[derive(Args, Debug, Clone)]
struct TuningArgs {
    /// Number of independent K-SC restarts (lowest objective kept)
    #[arg(long, default_value_t = 1)]
    n_init: usize,

    /// Maximum iterations per K-SC run
    #[arg(long, default_value_t = 100)]
    max_iter: usize,

    /// Largest shift tried when aligning two sequences (unbounded if not set)
    #[arg(long)]
    max_shift: Option<usize>,

    /// Minimum overlap length of a shifted alignment (defaults to half the length)
    #[arg(long)]
    min_overlap: Option<usize>,

    /// Fail instead of warning when a run hits --max-iter without converging
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Value substituted for zero weekly counts
    #[arg(long, default_value_t = DEFAULT_ZERO_SUBSTITUTE)]
    zero_substitute: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Score every k in [min-k, max-k) with βCV to choose the cluster count
    Scan {
        /// Path to the inflow CSV file (project,<week columns...>)
        #[arg(long)]
        data: PathBuf,

        /// Smallest number of clusters to try
        #[arg(long, default_value_t = 2)]
        min_k: usize,

        /// Upper bound (exclusive) on the number of clusters
        #[arg(long)]
        max_k: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Distance populations for βCV: "pairwise" or "centroid"
        #[arg(long, default_value = "pairwise")]
        method: String,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Cluster projects into k inflow shapes
    Cluster {
        /// Path to the inflow CSV file (project,<week columns...>)
        #[arg(long)]
        data: PathBuf,

        /// Number of clusters
        #[arg(long)]
        k: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Summary CSV keyed by `name` that receives a `cluster` column in place
        #[arg(long)]
        summary: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ScanOutput {
    experiment: String,
    n_projects: usize,
    method: String,
    scores: Vec<ScoreOutput>,
    omitted: Vec<usize>,
    artifact: PathBuf,
}

#[derive(Serialize)]
struct ScoreOutput {
    k: usize,
    beta_cv: f64,
}

#[derive(Serialize)]
struct ClusterOutput {
    experiment: String,
    k: usize,
    objective: f64,
    n_projects: usize,
    converged: bool,
    reseeds: usize,
    cluster_sizes: Vec<usize>,
    summary_rows: Option<usize>,
    artifact: PathBuf,
}

fn parse_method(s: &str) -> Result<BetaCvMethod> {
    match s {
        "centroid" => Ok(BetaCvMethod::Centroid),
        "pairwise" => Ok(BetaCvMethod::Pairwise),
        other => anyhow::bail!("unknown βCV method: {other} (expected centroid or pairwise)"),
    }
}

fn read_dataset(data: &Path, tuning: &TuningArgs) -> Result<Dataset> {
    let dataset = InflowReader::new(data)
        .with_zero_substitute(tuning.zero_substitute)
        .read()
        .context("failed to read inflow CSV")?;
    info!(
        n_projects = dataset.len(),
        n_weeks = dataset.n_weeks(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn ksc_config(k: usize, tuning: &TuningArgs, seed: u64) -> Result<KscConfig> {
    let mut config = KscConfig::new(k, ShiftBound::from_radius(tuning.max_shift))?
        .with_n_init(tuning.n_init)
        .with_max_iter(tuning.max_iter)
        .with_strict(tuning.strict)
        .with_seed(seed);
    if let Some(min_overlap) = tuning.min_overlap {
        config = config.with_min_overlap(min_overlap);
    }
    Ok(config)
}

fn scan_config(
    min_k: usize,
    max_k: usize,
    method: BetaCvMethod,
    tuning: &TuningArgs,
    seed: u64,
) -> Result<ScanConfig> {
    let mut config = ScanConfig::new(min_k, max_k, ShiftBound::from_radius(tuning.max_shift))?
        .with_n_init(tuning.n_init)
        .with_max_iter(tuning.max_iter)
        .with_strict(tuning.strict)
        .with_seed(seed)
        .with_method(method);
    if let Some(min_overlap) = tuning.min_overlap {
        config = config.with_min_overlap(min_overlap);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Scan {
            data,
            min_k,
            max_k,
            experiment,
            output_dir,
            method,
            tuning,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let method = parse_method(&method)?;
            let dataset = read_dataset(&data, &tuning)?;

            let curve = scan_config(min_k, max_k, method, &tuning, cli.seed)?
                .fit(&dataset.sequences)
                .context("βCV scan failed")?;

            for point in &curve.points {
                info!(k = point.k, beta_cv = point.beta_cv, converged = point.converged, "score");
            }

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let artifact = writer
                .write_scan(dataset.len(), &curve)
                .context("failed to write scan result")?;

            let output = ScanOutput {
                experiment,
                n_projects: dataset.len(),
                method: curve.method.to_string(),
                scores: curve
                    .pairs()
                    .into_iter()
                    .map(|(k, beta_cv)| ScoreOutput { k, beta_cv })
                    .collect(),
                omitted: curve.omitted,
                artifact,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Cluster {
            data,
            k,
            experiment,
            output_dir,
            summary,
            tuning,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let dataset = read_dataset(&data, &tuning)?;

            let result = ksc_config(k, &tuning, cli.seed)?
                .fit(&dataset.sequences)
                .context("clustering failed")?;

            let cluster_sizes = result.cluster_sizes();
            for (cluster, &size) in cluster_sizes.iter().enumerate() {
                info!(cluster, size, "cluster size");
            }

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let artifact = writer
                .write_cluster(&dataset.project_ids, &result)
                .context("failed to write cluster result")?;

            let summary_rows = summary
                .map(|path| {
                    SummaryExporter::new(&path)
                        .export(&dataset.project_ids, result.labels())
                        .with_context(|| format!("failed to export clusters to {}", path.display()))
                })
                .transpose()?;

            let output = ClusterOutput {
                experiment,
                k: result.k(),
                objective: result.objective.value(),
                n_projects: dataset.len(),
                converged: result.converged,
                reseeds: result.reseeds,
                cluster_sizes,
                summary_rows,
                artifact,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
