use serde::Serialize;
use tracing::{debug, warn};

use cc_lab_abstract::{Catalog, ExperimentLayout};

use crate::parse::parse_metrics_csv;

/// One metric sample tagged with its run's metadata.
///
/// `sequence_index` is zero-based row order within the source artifact and
/// reconstructs the run's time axis; rows from different runs carry no
/// relative ordering guarantee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub profile_id: String,
    pub profile_name: String,
    pub latency_ms: u64,
    pub scheme: String,
    pub sequence_index: usize,
    pub throughput_mbps: f64,
    pub rtt_ms: f64,
    pub loss_rate: Option<f64>,
    pub queueing_delay_ms: Option<f64>,
}

/// The unioned, metadata-tagged samples of every run that produced a
/// parseable metrics artifact.
///
/// Empty is a documented no-data value, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateDataset {
    rows: Vec<AggregateRow>,
}

impl AggregateDataset {
    /// Probe every catalog pair's per-run slot and union what parses.
    ///
    /// Missing artifacts and parse failures are logged and skipped; only
    /// catalog pairs are probed, so no row can carry metadata outside the
    /// catalog.
    pub fn collect(catalog: &Catalog, layout: &ExperimentLayout) -> Self {
        let mut rows = Vec::new();

        for (profile, scheme) in catalog.pairs() {
            let path = layout.run_metrics_path(&profile.id, scheme);
            if !path.is_file() {
                debug!(
                    scheme,
                    profile = %profile.id,
                    path = %path.display(),
                    "no metrics artifact for pair"
                );
                continue;
            }

            let records = match parse_metrics_csv(&path) {
                Ok(records) => records,
                Err(e) => {
                    warn!(
                        scheme,
                        profile = %profile.id,
                        path = %path.display(),
                        error = %e,
                        "failed to process metrics artifact, skipping run"
                    );
                    continue;
                }
            };

            rows.extend(records.into_iter().enumerate().map(|(i, r)| AggregateRow {
                profile_id: profile.id.clone(),
                profile_name: profile.name.clone(),
                latency_ms: profile.latency_ms,
                scheme: scheme.to_string(),
                sequence_index: i,
                throughput_mbps: r.throughput,
                rtt_ms: r.rtt,
                loss_rate: r.loss_rate,
                queueing_delay_ms: r.queuing_delay,
            }));
        }

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    /// Rows belonging to one (profile, scheme) group, in sequence order.
    pub fn group(&self, profile_id: &str, scheme: &str) -> Vec<&AggregateRow> {
        self.rows
            .iter()
            .filter(|r| r.profile_id == profile_id && r.scheme == scheme)
            .collect()
    }
}
