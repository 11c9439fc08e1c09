//! Bounded-duration performance sampler.
//!
//! Runs in its own process for the lifetime of one transfer, appending one
//! sample per tick, then persists the whole series as a CSV artifact. Being
//! killed mid-run is an expected exit: the series is simply never written,
//! and the caller treats the missing file as a metrics-less run.

use anyhow::{Context, Result};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

use cc_lab_abstract::MetricSample;
use cc_lab_abstract::sample::{METRICS_CSV_HEADER, ranges};

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Total sampling window.
    pub duration: Duration,
    /// Tick granularity. One sample is taken per tick.
    pub interval: Duration,
    /// Fixed seed for deterministic series; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(75),
            interval: Duration::from_secs(1),
            seed: None,
        }
    }
}

pub struct Sampler {
    config: SamplerConfig,
    rng: StdRng,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    /// Take one in-range sample at the given offset from the start.
    fn sample_at(&mut self, elapsed: Duration) -> MetricSample {
        MetricSample {
            elapsed_secs: elapsed.as_secs_f64(),
            throughput_mbps: self.random_in(ranges::THROUGHPUT_MBPS),
            rtt_ms: self.random_in(ranges::RTT_MS),
            loss_rate: self.random_in(ranges::LOSS_RATE),
            queueing_delay_ms: self.random_in(ranges::QUEUEING_DELAY_MS),
        }
    }

    fn random_in(&mut self, (lo, hi): (f64, f64)) -> f64 {
        self.rng.random_range(lo..=hi)
    }

    /// Run the sampling loop to completion and return the ordered series.
    ///
    /// Blocks for the configured duration; the sampler is expected to own its
    /// process. One sample is appended before each tick sleep, so a window of
    /// `n` whole intervals yields `n` samples.
    pub fn collect(&mut self) -> Vec<MetricSample> {
        let start = Instant::now();
        let mut series = Vec::new();

        while start.elapsed() < self.config.duration {
            series.push(self.sample_at(start.elapsed()));
            std::thread::sleep(self.config.interval);
        }

        series
    }
}

/// Write the sample series to `path`, creating parent directories.
///
/// Columns follow the metrics artifact contract: header row, then one row per
/// sample in temporal order.
pub fn write_metrics_csv(path: &Path, series: &[MetricSample]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create metrics dir {}", parent.display()))?;
    }

    let mut out = String::new();
    out.push_str(METRICS_CSV_HEADER);
    out.push('\n');
    for s in series {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            s.elapsed_secs, s.throughput_mbps, s.rtt_ms, s.loss_rate, s.queueing_delay_ms
        ));
    }

    fs::write(path, out)
        .with_context(|| format!("Failed to write metrics file {}", path.display()))
}

/// Process entry point for the `sample` role: collect for the configured
/// window, then persist.
pub fn collect_and_persist(config: SamplerConfig, path: &Path) -> Result<()> {
    let window = config.duration;
    let mut sampler = Sampler::new(config);
    let series = sampler.collect();
    write_metrics_csv(path, &series)?;
    info!(
        samples = series.len(),
        window_secs = window.as_secs_f64(),
        path = %path.display(),
        "metrics series persisted"
    );
    Ok(())
}
