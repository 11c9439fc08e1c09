use anyhow::{Context, Result};
use std::fs;
use tracing::{error, info, warn};

use cc_lab_abstract::{Catalog, ExperimentLayout, Profile, RunOutcome, RunRecord};

use crate::artifacts::find_latest_metrics;
use crate::launcher::SchemeLauncher;

/// Drives the full (profile × scheme) matrix, one pair at a time.
///
/// A failing pair is recorded and skipped; it never halts the rest of the
/// matrix. Re-running overwrites the per-pair artifacts, so the runner is
/// safe to invoke repeatedly over the same layout.
pub struct TestRunner {
    catalog: Catalog,
    layout: ExperimentLayout,
    launcher: Box<dyn SchemeLauncher>,
}

impl TestRunner {
    pub fn new(catalog: Catalog, layout: ExperimentLayout, launcher: Box<dyn SchemeLauncher>) -> Self {
        Self {
            catalog,
            layout,
            launcher,
        }
    }

    /// Execute every pair in catalog order and return one provenance record
    /// per pair.
    pub fn run_all(&self) -> Result<Vec<RunRecord>> {
        let mut records = Vec::new();

        for profile in &self.catalog.profiles {
            info!(
                profile = %profile.id,
                name = %profile.name,
                latency_ms = profile.latency_ms,
                "running tests for network profile"
            );
            for scheme in &self.catalog.schemes {
                let outcome = self.run_pair(profile, scheme)?;
                records.push(RunRecord {
                    profile_id: profile.id.clone(),
                    scheme: scheme.clone(),
                    outcome,
                });
            }
        }

        Ok(records)
    }

    /// Run one pair: invoke under emulation, then claim the freshest metrics
    /// artifact from the scan area into the per-run slot.
    ///
    /// Only filesystem setup errors propagate; everything that is the run's
    /// own fault folds into the returned outcome.
    fn run_pair(&self, profile: &Profile, scheme: &str) -> Result<RunOutcome> {
        info!(scheme, "testing congestion control scheme");

        let run_dir = self.layout.run_dir(&profile.id, scheme);
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("Failed to create run dir {}", run_dir.display()))?;

        let log_path = self.layout.log_path(&profile.id, scheme);
        match self.launcher.launch(profile, scheme, &log_path) {
            Ok(status) if status.success() => {}
            Ok(status) => {
                error!(scheme, profile = %profile.id, %status, "emulated run failed");
                return Ok(RunOutcome::Failed {
                    reason: format!("exit status {status}"),
                });
            }
            Err(e) => {
                error!(scheme, profile = %profile.id, error = %e, "emulated run could not be launched");
                return Ok(RunOutcome::Failed {
                    reason: format!("{e:#}"),
                });
            }
        }

        let Some(freshest) = find_latest_metrics(&self.layout.metrics_dir, scheme) else {
            warn!(scheme, profile = %profile.id, "no metrics file found, run is metrics-less");
            return Ok(RunOutcome::Degraded);
        };

        let dest = self.layout.run_metrics_path(&profile.id, scheme);
        if let Err(e) = fs::copy(&freshest, &dest) {
            warn!(
                scheme,
                profile = %profile.id,
                src = %freshest.display(),
                error = %e,
                "failed to claim metrics artifact, run is metrics-less"
            );
            return Ok(RunOutcome::Degraded);
        }

        info!(scheme, profile = %profile.id, metrics = %dest.display(), "metrics file saved");
        Ok(RunOutcome::Completed { metrics: dest })
    }
}
