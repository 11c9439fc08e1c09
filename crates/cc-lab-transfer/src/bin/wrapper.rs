//! Transfer-peer wrapper.
//!
//! Wraps the underlying transfer tool (a `ucat`-style byte pump, overridable
//! via `CC_LAB_TRANSFER_BIN`) in the supervised sender/receiver lifecycle,
//! with the metrics sampler running alongside as a second process. The
//! `sample` role is that second process's entry point.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::info;

use cc_lab_sampler::{SamplerConfig, collect_and_persist};
use cc_lab_transfer::{TransferRole, TransferTask};

#[derive(Parser, Debug)]
#[command(author, version, about = "Supervised transfer peer for cc-lab runs")]
struct Args {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Listen for an incoming transfer and discard received bytes.
    Receiver {
        #[arg(long)]
        port: u16,

        /// Where the sampler writes its metrics series.
        #[arg(long, default_value = "logs/wrapper_metrics.csv")]
        metrics_out: PathBuf,

        /// Transfer window in seconds.
        #[arg(long, default_value_t = 75)]
        duration: u64,
    },
    /// Connect to a receiver and push payload at full speed until the deadline.
    Sender {
        #[arg(long)]
        ip: String,

        #[arg(long)]
        port: u16,

        #[arg(long, default_value = "logs/wrapper_metrics.csv")]
        metrics_out: PathBuf,

        #[arg(long, default_value_t = 75)]
        duration: u64,
    },
    /// Run the metrics sampler in-process and persist the series.
    Sample {
        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value_t = 75)]
        duration: u64,

        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();

    match args.role {
        Role::Receiver {
            port,
            metrics_out,
            duration,
        } => {
            info!(port, "starting receiver transfer");
            let transfer = transfer_command(&["-l", "-p", &port.to_string()]);
            let task = TransferTask::new(
                TransferRole::Receiver,
                transfer,
                sampler_command(&metrics_out, duration)?,
            )
            .with_deadline(Duration::from_secs(duration));
            task.run()
        }
        Role::Sender {
            ip,
            port,
            metrics_out,
            duration,
        } => {
            info!(%ip, port, "starting sender transfer");
            let transfer = transfer_command(&[&ip, &port.to_string()]);
            let task = TransferTask::new(
                TransferRole::Sender,
                transfer,
                sampler_command(&metrics_out, duration)?,
            )
            .with_deadline(Duration::from_secs(duration));
            task.run()
        }
        Role::Sample {
            output,
            duration,
            interval_ms,
        } => {
            let config = SamplerConfig {
                duration: Duration::from_secs(duration),
                interval: Duration::from_millis(interval_ms),
                ..Default::default()
            };
            collect_and_persist(config, &output)
        }
    }
}

/// Command for the underlying transfer tool.
fn transfer_command(args: &[&str]) -> Command {
    let bin = std::env::var("CC_LAB_TRANSFER_BIN").unwrap_or_else(|_| "ucat".to_string());
    let mut cmd = Command::new(bin);
    cmd.args(args);
    cmd
}

/// Command that re-invokes this binary in the `sample` role.
fn sampler_command(output: &Path, duration: u64) -> Result<Command> {
    let exe = std::env::current_exe()?;
    let mut cmd = Command::new(exe);
    cmd.arg("sample")
        .arg("--output")
        .arg(output)
        .arg("--duration")
        .arg(duration.to_string());
    Ok(cmd)
}
