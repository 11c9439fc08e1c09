use serde::Deserialize;
use std::path::{Path, PathBuf};

/// On-disk layout of one experiment.
///
/// Per-run artifacts live at `results/<profile_id>/<scheme>/`: `log.txt`
/// holds the captured output of the emulated invocation and
/// `<scheme>_cc_log.csv` the copied metrics series. Summary artifacts land
/// under `graphs/`. The shared metrics scan area (`logs/` by default) is
/// where externally invoked schemes drop their `metrics_<scheme>_*.csv`
/// files before the runner claims them.
#[derive(Debug, Clone)]
pub struct ExperimentLayout {
    pub results_dir: PathBuf,
    pub graphs_dir: PathBuf,
    pub metrics_dir: PathBuf,
}

impl Default for ExperimentLayout {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            graphs_dir: PathBuf::from("graphs"),
            metrics_dir: PathBuf::from("logs"),
        }
    }
}

impl ExperimentLayout {
    pub fn run_dir(&self, profile_id: &str, scheme: &str) -> PathBuf {
        self.results_dir.join(profile_id).join(scheme)
    }

    pub fn log_path(&self, profile_id: &str, scheme: &str) -> PathBuf {
        self.run_dir(profile_id, scheme).join("log.txt")
    }

    pub fn run_metrics_path(&self, profile_id: &str, scheme: &str) -> PathBuf {
        self.run_dir(profile_id, scheme)
            .join(format!("{scheme}_cc_log.csv"))
    }

    pub fn rtt_summary_path(&self) -> PathBuf {
        self.graphs_dir.join("rtt_summary.csv")
    }

    pub fn comparison_path(&self) -> PathBuf {
        self.graphs_dir.join("algorithm_comparison.csv")
    }
}

/// Optional layout overrides loaded from the experiment TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutOverride {
    pub results_dir: Option<PathBuf>,
    pub graphs_dir: Option<PathBuf>,
    pub metrics_dir: Option<PathBuf>,
}

impl LayoutOverride {
    pub fn apply_to(&self, layout: &mut ExperimentLayout) {
        if let Some(v) = &self.results_dir {
            layout.results_dir = v.clone();
        }
        if let Some(v) = &self.graphs_dir {
            layout.graphs_dir = v.clone();
        }
        if let Some(v) = &self.metrics_dir {
            layout.metrics_dir = v.clone();
        }
    }

    /// Rebase every configured directory under `root`. Used by tests and by
    /// `--skip-run` aggregation over a foreign results tree.
    pub fn rooted(root: &Path) -> Self {
        Self {
            results_dir: Some(root.join("results")),
            graphs_dir: Some(root.join("graphs")),
            metrics_dir: Some(root.join("logs")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_run_paths_follow_the_artifact_contract() {
        let layout = ExperimentLayout::default();
        assert_eq!(
            layout.log_path("1", "cubic"),
            PathBuf::from("results/1/cubic/log.txt")
        );
        assert_eq!(
            layout.run_metrics_path("2", "vegas"),
            PathBuf::from("results/2/vegas/vegas_cc_log.csv")
        );
        assert_eq!(
            layout.comparison_path(),
            PathBuf::from("graphs/algorithm_comparison.csv")
        );
    }

    #[test]
    fn override_applies_only_set_fields() {
        let mut layout = ExperimentLayout::default();
        let over = LayoutOverride {
            results_dir: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };
        over.apply_to(&mut layout);
        assert_eq!(layout.results_dir, PathBuf::from("/tmp/out"));
        assert_eq!(layout.graphs_dir, PathBuf::from("graphs"));
    }
}
