use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::debug;

use cc_lab_abstract::Profile;

/// Seam to the external network-emulation tooling.
///
/// The runner only requires that launching a (profile, scheme) pair blocks
/// until the invocation finishes and reports its exit status; what actually
/// runs underneath is this trait's business.
pub trait SchemeLauncher {
    fn launch(&self, profile: &Profile, scheme: &str, log_path: &Path) -> Result<ExitStatus>;
}

/// Launches schemes inside a mahimahi shell: `mm-delay` for the profile's
/// one-way latency, `mm-link` for its trace pair, with the scheme command's
/// combined output redirected into the run log.
pub struct MahimahiLauncher {
    /// Shell command template for the scheme under test; `{scheme}` is
    /// substituted with the scheme identifier.
    scheme_command: String,
}

impl MahimahiLauncher {
    pub fn new(scheme_command: impl Into<String>) -> Self {
        Self {
            scheme_command: scheme_command.into(),
        }
    }

    fn compose(&self, profile: &Profile, scheme: &str, log_path: &Path) -> String {
        let inner = self.scheme_command.replace("{scheme}", scheme);
        format!(
            "mm-delay {} mm-link {} {} -- sh -c '{} > {} 2>&1'",
            profile.latency_ms,
            profile.downlink_trace.display(),
            profile.uplink_trace.display(),
            inner,
            log_path.display(),
        )
    }
}

impl Default for MahimahiLauncher {
    fn default() -> Self {
        Self::new("test_schemes --schemes {scheme}")
    }
}

impl SchemeLauncher for MahimahiLauncher {
    fn launch(&self, profile: &Profile, scheme: &str, log_path: &Path) -> Result<ExitStatus> {
        let command_line = self.compose(profile, scheme, log_path);
        debug!(%command_line, "launching emulated run");
        Command::new("sh")
            .arg("-c")
            .arg(&command_line)
            .status()
            .with_context(|| format!("Failed to launch emulated run: {command_line}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn profile() -> Profile {
        Profile {
            id: "1".to_string(),
            name: "LTE (Low Latency)".to_string(),
            latency_ms: 5,
            downlink_trace: PathBuf::from("traces/lte.down"),
            uplink_trace: PathBuf::from("traces/lte.up"),
        }
    }

    #[test]
    fn composed_command_embeds_profile_and_scheme() {
        let launcher = MahimahiLauncher::new("run_scheme --schemes {scheme}");
        let line = launcher.compose(&profile(), "cubic", Path::new("results/1/cubic/log.txt"));
        assert_eq!(
            line,
            "mm-delay 5 mm-link traces/lte.down traces/lte.up -- \
             sh -c 'run_scheme --schemes cubic > results/1/cubic/log.txt 2>&1'"
        );
    }
}
