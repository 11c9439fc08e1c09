use serde::{Deserialize, Serialize};

/// One performance observation taken by the metrics sampler.
///
/// Values are synthetic (or, with a real transport underneath, measured) and
/// stay within the documented ranges in [`ranges`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Seconds since sampling started.
    pub elapsed_secs: f64,
    pub throughput_mbps: f64,
    pub rtt_ms: f64,
    /// Fraction in [0, 1].
    pub loss_rate: f64,
    pub queueing_delay_ms: f64,
}

/// Documented value ranges for synthetic samples, `(min, max)`.
pub mod ranges {
    pub const THROUGHPUT_MBPS: (f64, f64) = (1.0, 10.0);
    pub const RTT_MS: (f64, f64) = (100.0, 300.0);
    pub const LOSS_RATE: (f64, f64) = (0.0, 0.02);
    pub const QUEUEING_DELAY_MS: (f64, f64) = (0.0, 50.0);
}

impl MetricSample {
    pub fn in_documented_ranges(&self) -> bool {
        let within = |v: f64, (lo, hi): (f64, f64)| v >= lo && v <= hi;
        within(self.throughput_mbps, ranges::THROUGHPUT_MBPS)
            && within(self.rtt_ms, ranges::RTT_MS)
            && within(self.loss_rate, ranges::LOSS_RATE)
            && within(self.queueing_delay_ms, ranges::QUEUEING_DELAY_MS)
    }
}

/// Header of a metrics artifact. Row order is temporal order; the
/// `timestamp` column carries elapsed seconds.
pub const METRICS_CSV_HEADER: &str = "timestamp,throughput,rtt,loss_rate,queuing_delay";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check_rejects_out_of_band_values() {
        let sample = MetricSample {
            elapsed_secs: 0.0,
            throughput_mbps: 5.0,
            rtt_ms: 150.0,
            loss_rate: 0.01,
            queueing_delay_ms: 20.0,
        };
        assert!(sample.in_documented_ranges());

        let bad = MetricSample {
            rtt_ms: 350.0,
            ..sample
        };
        assert!(!bad.in_documented_ranges());
    }
}
