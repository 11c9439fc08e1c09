use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use cc_lab_abstract::Catalog;

use crate::aggregate::AggregateDataset;
use crate::stats;

/// Per-group RTT statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RttSummary {
    pub scheme: String,
    pub profile_id: String,
    pub profile_name: String,
    pub latency_ms: u64,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub std_dev_ms: f64,
    pub p95_ms: f64,
    pub jitter_ms: f64,
}

/// Per-group comparison metrics across schemes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub profile_id: String,
    pub profile_name: String,
    pub scheme: String,
    pub mean_throughput_mbps: f64,
    pub throughput_std_dev: f64,
    pub mean_rtt_ms: f64,
    /// Percentage; 0 when no row in the group carries a loss value.
    pub mean_loss_pct: f64,
    pub p90_throughput_mbps: f64,
}

/// Compute one RTT summary per (profile, scheme) group present in the
/// dataset, in catalog order. An empty dataset yields no records.
pub fn rtt_summaries(catalog: &Catalog, dataset: &AggregateDataset) -> Vec<RttSummary> {
    let mut records = Vec::new();

    for (profile, scheme) in catalog.pairs() {
        let group = dataset.group(&profile.id, scheme);
        if group.is_empty() {
            continue;
        }
        let rtts: Vec<f64> = group.iter().map(|r| r.rtt_ms).collect();

        records.push(RttSummary {
            scheme: scheme.to_string(),
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            latency_ms: profile.latency_ms,
            mean_ms: stats::mean(&rtts),
            min_ms: stats::min(&rtts),
            max_ms: stats::max(&rtts),
            median_ms: stats::median(&rtts),
            std_dev_ms: stats::std_dev(&rtts),
            p95_ms: stats::quantile(&rtts, 0.95),
            jitter_ms: stats::jitter(&rtts),
        });
    }

    if records.is_empty() {
        warn!("no RTT data available for summary");
    }
    records
}

/// Compute one comparison record per (profile, scheme) group present in the
/// dataset, in catalog order.
pub fn comparison_records(catalog: &Catalog, dataset: &AggregateDataset) -> Vec<ComparisonRecord> {
    let mut records = Vec::new();

    for (profile, scheme) in catalog.pairs() {
        let group = dataset.group(&profile.id, scheme);
        if group.is_empty() {
            continue;
        }
        let throughputs: Vec<f64> = group.iter().map(|r| r.throughput_mbps).collect();
        let rtts: Vec<f64> = group.iter().map(|r| r.rtt_ms).collect();
        // Rows without a loss value are excluded from the mean; a group with
        // none at all reports 0.
        let losses: Vec<f64> = group.iter().filter_map(|r| r.loss_rate).collect();
        let mean_loss_pct = if losses.is_empty() {
            0.0
        } else {
            stats::mean(&losses) * 100.0
        };

        records.push(ComparisonRecord {
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            scheme: scheme.to_string(),
            mean_throughput_mbps: stats::mean(&throughputs),
            throughput_std_dev: stats::std_dev(&throughputs),
            mean_rtt_ms: stats::mean(&rtts),
            mean_loss_pct,
            p90_throughput_mbps: stats::quantile(&throughputs, 0.9),
        });
    }

    if records.is_empty() {
        warn!("no data available for comparison table");
    }
    records
}

/// Write `graphs/rtt_summary.csv`. Skipped (with a warning already emitted by
/// the computation) when there are no records.
pub fn write_rtt_summary(path: &Path, records: &[RttSummary]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let mut out = String::from(
        "Algorithm,Profile,Latency (ms),Avg RTT (ms),Min RTT (ms),Max RTT (ms),\
         Median RTT (ms),Std Dev (ms),95th %ile (ms),Jitter (ms)\n",
    );
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            r.scheme.to_uppercase(),
            r.profile_name,
            r.latency_ms,
            r.mean_ms,
            r.min_ms,
            r.max_ms,
            r.median_ms,
            r.std_dev_ms,
            r.p95_ms,
            r.jitter_ms,
        ));
    }

    write_table(path, &out)?;
    info!(path = %path.display(), groups = records.len(), "RTT summary written");
    Ok(())
}

/// Write `graphs/algorithm_comparison.csv`.
pub fn write_comparison(path: &Path, records: &[ComparisonRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let mut out = String::from(
        "Profile,Algorithm,Avg Throughput (Mbps),Throughput Std Dev,Avg RTT (ms),\
         Avg Loss Rate (%),90% Throughput (Mbps)\n",
    );
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.profile_name,
            r.scheme.to_uppercase(),
            r.mean_throughput_mbps,
            r.throughput_std_dev,
            r.mean_rtt_ms,
            r.mean_loss_pct,
            r.p90_throughput_mbps,
        ));
    }

    write_table(path, &out)?;
    info!(path = %path.display(), groups = records.len(), "comparison table written");
    Ok(())
}

fn write_table(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output dir {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write summary file {}", path.display()))
}
