use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Find the most recently modified `metrics_<scheme>_*.csv` in the shared
/// scan area.
///
/// The scan area is written by the externally invoked scheme process, so
/// selection is last-writer-wins by modification time. That is only sound
/// because the runner executes pairs strictly sequentially; with parallel
/// runs two schemes could interleave writes and the newest file need not
/// belong to this run.
pub fn find_latest_metrics(scan_dir: &Path, scheme: &str) -> Option<PathBuf> {
    let prefix = format!("metrics_{scheme}_");
    let entries = match fs::read_dir(scan_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %scan_dir.display(), error = %e, "metrics scan area unreadable");
            return None;
        }
    };

    entries
        .flatten()
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(&prefix) && name.ends_with(".csv")
        })
        .filter_map(|entry| {
            let mtime = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((entry.path(), mtime))
        })
        .max_by_key(|(_, mtime)| *mtime)
        .map(|(path, _): (PathBuf, SystemTime)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn picks_newest_matching_artifact() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("metrics_cubic_1.csv"), "old").unwrap();
        // Coarse mtime resolution on some filesystems.
        sleep(Duration::from_millis(30));
        fs::write(dir.path().join("metrics_cubic_2.csv"), "new").unwrap();
        fs::write(dir.path().join("metrics_vegas_9.csv"), "other scheme").unwrap();
        fs::write(dir.path().join("metrics_cubic_3.txt"), "not csv").unwrap();

        let found = find_latest_metrics(dir.path(), "cubic").unwrap();
        assert_eq!(found.file_name().unwrap(), "metrics_cubic_2.csv");
    }

    #[test]
    fn empty_or_missing_scan_area_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_latest_metrics(dir.path(), "cubic").is_none());
        assert!(find_latest_metrics(&dir.path().join("nope"), "cubic").is_none());
    }
}
