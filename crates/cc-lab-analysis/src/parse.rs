use std::fs;
use std::path::Path;
use thiserror::Error;

/// One parsed row of a per-run metrics artifact.
///
/// Only `throughput` and `rtt` are mandatory; degraded artifacts may omit
/// the other columns entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRecord {
    pub timestamp: Option<f64>,
    pub throughput: f64,
    pub rtt: f64,
    pub loss_rate: Option<f64>,
    pub queuing_delay: Option<f64>,
}

#[derive(Debug, Error)]
pub enum MetricsCsvError {
    #[error("metrics file is empty")]
    Empty,
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: expected {expected} fields, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: bad value `{value}` in column `{column}`")]
    BadValue {
        line: usize,
        column: String,
        value: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Positions of the known columns within one artifact's header.
struct ColumnMap {
    timestamp: Option<usize>,
    throughput: usize,
    rtt: usize,
    loss_rate: Option<usize>,
    queuing_delay: Option<usize>,
    width: usize,
}

impl ColumnMap {
    fn from_header(header: &str) -> Result<Self, MetricsCsvError> {
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let position = |wanted: &str| names.iter().position(|n| *n == wanted);

        Ok(Self {
            timestamp: position("timestamp"),
            throughput: position("throughput")
                .ok_or(MetricsCsvError::MissingColumn("throughput"))?,
            rtt: position("rtt").ok_or(MetricsCsvError::MissingColumn("rtt"))?,
            loss_rate: position("loss_rate"),
            queuing_delay: position("queuing_delay"),
            width: names.len(),
        })
    }
}

/// Parse a metrics artifact: header row, then one sample per row in temporal
/// order.
///
/// Any malformed row invalidates the whole artifact; the caller is expected
/// to skip that run and continue.
pub fn parse_metrics_csv(path: &Path) -> Result<Vec<MetricsRecord>, MetricsCsvError> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines().enumerate();

    let (_, header) = lines.next().ok_or(MetricsCsvError::Empty)?;
    let columns = ColumnMap::from_header(header)?;

    let mut records = Vec::new();
    for (idx, raw) in lines {
        if raw.trim().is_empty() {
            continue;
        }
        let line = idx + 1;
        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
        if fields.len() < columns.width {
            return Err(MetricsCsvError::ShortRow {
                line,
                expected: columns.width,
                found: fields.len(),
            });
        }

        let value = |col: usize, name: &str| -> Result<f64, MetricsCsvError> {
            fields[col]
                .parse::<f64>()
                .map_err(|_| MetricsCsvError::BadValue {
                    line,
                    column: name.to_string(),
                    value: fields[col].to_string(),
                })
        };
        let optional = |col: Option<usize>, name: &str| -> Result<Option<f64>, MetricsCsvError> {
            col.map(|c| value(c, name)).transpose()
        };

        records.push(MetricsRecord {
            timestamp: optional(columns.timestamp, "timestamp")?,
            throughput: value(columns.throughput, "throughput")?,
            rtt: value(columns.rtt, "rtt")?,
            loss_rate: optional(columns.loss_rate, "loss_rate")?,
            queuing_delay: optional(columns.queuing_delay, "queuing_delay")?,
        });
    }

    Ok(records)
}
