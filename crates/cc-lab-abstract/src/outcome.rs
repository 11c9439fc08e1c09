use serde::Serialize;
use std::path::PathBuf;

/// How one (profile, scheme) run ended.
///
/// A `Failed` or `Degraded` run is recorded and reported but contributes no
/// rows to the aggregate dataset; it never aborts the remaining pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The emulated invocation succeeded and a metrics artifact was claimed.
    Completed { metrics: PathBuf },
    /// The invocation succeeded but no metrics artifact was found.
    Degraded,
    /// The invocation failed to spawn or exited non-zero.
    Failed { reason: String },
}

/// Provenance record for one run of the evaluation matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub profile_id: String,
    pub scheme: String,
    pub outcome: RunOutcome,
}

impl RunRecord {
    pub fn has_metrics(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed { .. })
    }

    pub fn failed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Failed { .. })
    }
}
