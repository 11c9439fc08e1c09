use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use cc_lab_abstract::{Catalog, ExperimentLayout, LayoutOverride, RunOutcome, RunRecord};
use cc_lab_analysis::aggregate::AggregateDataset;
use cc_lab_analysis::summary;
use cc_lab_runner::{MahimahiLauncher, TestRunner};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless congestion-control evaluation harness")]
struct Args {
    /// Path to an experiment TOML file overriding the built-in catalog,
    /// layout, or scheme command.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-run artifact tree (default `results/`).
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Summary artifact directory (default `graphs/`).
    #[arg(long)]
    graphs_dir: Option<PathBuf>,

    /// Shared metrics scan area written by the schemes (default `logs/`).
    #[arg(long)]
    metrics_dir: Option<PathBuf>,

    /// Shell template for the scheme under test; `{scheme}` is substituted.
    #[arg(long)]
    scheme_command: Option<String>,

    /// Write the per-run provenance records as JSON after execution.
    #[arg(long)]
    records_out: Option<PathBuf>,

    /// Aggregate existing per-run artifacts without launching any runs.
    #[arg(long, default_value_t = false)]
    skip_run: bool,

    /// Print the evaluation matrix and exit.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

/// Experiment TOML file: every section optional, overriding the defaults.
#[derive(Debug, Default, Deserialize)]
struct ExperimentFile {
    catalog: Option<Catalog>,
    #[serde(default)]
    layout: LayoutOverride,
    scheme_command: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();
    info!("cc-lab-eval-host starting...");

    let (catalog, layout, scheme_command) = build_setup(&args)?;
    catalog.validate().context("Invalid run descriptor catalog")?;

    if args.dry_run {
        for (profile, scheme) in catalog.pairs() {
            info!(
                profile = %profile.id,
                name = %profile.name,
                latency_ms = profile.latency_ms,
                scheme,
                "would run"
            );
        }
        return Ok(());
    }

    fs::create_dir_all(&layout.results_dir).context("Failed to create results directory")?;
    fs::create_dir_all(&layout.graphs_dir).context("Failed to create graphs directory")?;

    if !args.skip_run {
        let launcher = MahimahiLauncher::new(scheme_command);
        let runner = TestRunner::new(catalog.clone(), layout.clone(), Box::new(launcher));
        let records = runner.run_all().context("Experiment execution failed")?;
        log_tally(&records);
        if let Some(path) = &args.records_out {
            write_records(path, &records)?;
        }
    }

    info!("collecting and processing test results");
    let dataset = AggregateDataset::collect(&catalog, &layout);
    if dataset.is_empty() {
        warn!("no data collected; check per-run logs and metrics output");
        return Ok(());
    }
    info!(rows = dataset.len(), "aggregate dataset assembled");

    let rtt = summary::rtt_summaries(&catalog, &dataset);
    summary::write_rtt_summary(&layout.rtt_summary_path(), &rtt)?;

    let comparison = summary::comparison_records(&catalog, &dataset);
    summary::write_comparison(&layout.comparison_path(), &comparison)?;

    info!(
        groups = comparison.len(),
        graphs_dir = %layout.graphs_dir.display(),
        "analysis complete"
    );
    Ok(())
}

fn build_setup(args: &Args) -> Result<(Catalog, ExperimentLayout, String)> {
    let file = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read experiment file {}", path.display()))?;
            toml::from_str::<ExperimentFile>(&content)
                .with_context(|| format!("Failed to parse experiment file {}", path.display()))?
        }
        None => ExperimentFile::default(),
    };

    let catalog = file.catalog.unwrap_or_else(Catalog::builtin);

    let mut layout = ExperimentLayout::default();
    file.layout.apply_to(&mut layout);
    let cli_override = LayoutOverride {
        results_dir: args.results_dir.clone(),
        graphs_dir: args.graphs_dir.clone(),
        metrics_dir: args.metrics_dir.clone(),
    };
    cli_override.apply_to(&mut layout);

    let scheme_command = args
        .scheme_command
        .clone()
        .or(file.scheme_command)
        .unwrap_or_else(|| "test_schemes --schemes {scheme}".to_string());

    Ok((catalog, layout, scheme_command))
}

fn write_records(path: &Path, records: &[RunRecord]) -> Result<()> {
    let data =
        serde_json::to_vec_pretty(records).context("Failed to serialize run records")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write records file {}", path.display()))?;
    Ok(())
}

fn log_tally(records: &[RunRecord]) {
    let completed = records.iter().filter(|r| r.has_metrics()).count();
    let degraded = records
        .iter()
        .filter(|r| r.outcome == RunOutcome::Degraded)
        .count();
    let failed = records.iter().filter(|r| r.failed()).count();
    info!(
        total = records.len(),
        completed, degraded, failed, "experiment matrix finished"
    );
    for record in records.iter().filter(|r| r.failed()) {
        if let RunOutcome::Failed { reason } = &record.outcome {
            warn!(
                profile = %record.profile_id,
                scheme = %record.scheme,
                %reason,
                "run failed"
            );
        }
    }
}
