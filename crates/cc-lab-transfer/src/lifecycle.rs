//! Transfer lifecycle supervision.
//!
//! One invocation owns exactly two child processes: the foreground transfer
//! peer and the background metrics sampler. The supervisor is single-threaded
//! and blocks on the transfer side; the sampler is released through a drop
//! guard so that every exit path (normal return, error, deadline expiry,
//! panic) terminates it exactly once.

use anyhow::{Context, Result};
use bytes::BytesMut;
use rand::RngCore;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Payload chunk size pumped into the transfer peer in sender mode.
pub const CHUNK_LEN: usize = 1024;

/// Poll cadence while waiting for a child to exit on its own.
const EXIT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRole {
    /// Pump opaque payload into the peer's stdin until the deadline.
    Sender,
    /// Block on the peer until it exits, discarding its output.
    Receiver,
}

/// One supervised transfer: a foreground peer command, a background sampler
/// command, and the deadline bounding the sender's pump loop.
pub struct TransferTask {
    role: TransferRole,
    transfer: Command,
    sampler: Command,
    deadline: Duration,
}

impl TransferTask {
    pub fn new(role: TransferRole, transfer: Command, sampler: Command) -> Self {
        Self {
            role,
            transfer,
            sampler,
            deadline: Duration::from_secs(75),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Bring up both children, run the role loop, and guarantee both are no
    /// longer running on return.
    ///
    /// Spawn failures are fatal and propagated; a mid-transfer write failure
    /// kills the peer before propagating; deadline expiry is a normal exit.
    pub fn run(mut self) -> Result<()> {
        let mut transfer = match self.role {
            TransferRole::Sender => self
                .transfer
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .context("Failed to spawn transfer peer (sender)")?,
            TransferRole::Receiver => self
                .transfer
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .context("Failed to spawn transfer peer (receiver)")?,
        };

        // The sampler is a resource owned by this invocation: acquired here,
        // released exactly once by the guard no matter how we leave.
        let sampler = self
            .sampler
            .spawn()
            .map_err(|e| {
                terminate(&mut transfer);
                e
            })
            .context("Failed to spawn metrics sampler")?;
        let _sampler = SamplerGuard::new(sampler);

        match self.role {
            TransferRole::Sender => {
                let outcome = pump_until(&mut transfer, self.deadline);
                if let Err(e) = outcome {
                    terminate(&mut transfer);
                    return Err(e).context("Transfer write loop failed");
                }
                // Deadline reached: close the pipe and give the peer a short
                // window to drain before forcing it down.
                if wait_with_timeout(&mut transfer, Duration::from_secs(5)).is_err() {
                    debug!("transfer peer did not exit after stdin close, killing");
                    terminate(&mut transfer);
                }
                info!("sender transfer finished");
            }
            TransferRole::Receiver => {
                let status = transfer
                    .wait()
                    .context("Failed waiting on transfer peer (receiver)")?;
                info!(?status, "receiver transfer peer exited");
            }
        }

        Ok(())
    }
}

/// Write fixed-size random chunks into the child's stdin as fast as it will
/// accept them, until the deadline elapses or a write fails.
///
/// An already-expired deadline sends nothing and returns immediately.
fn pump_until(transfer: &mut Child, deadline: Duration) -> Result<()> {
    let Some(mut stdin) = transfer.stdin.take() else {
        anyhow::bail!("transfer peer has no stdin pipe");
    };

    let mut rng = rand::rng();
    let mut chunk = BytesMut::zeroed(CHUNK_LEN);
    let start = Instant::now();
    let mut chunks = 0u64;

    while start.elapsed() < deadline {
        rng.fill_bytes(&mut chunk);
        stdin
            .write_all(&chunk)
            .with_context(|| format!("Payload write failed after {chunks} chunks"))?;
        chunks += 1;
    }
    stdin.flush().ok();
    debug!(chunks, "send deadline reached");

    // Dropping stdin here closes the pipe, signalling EOF to the peer.
    Ok(())
}

/// Kill a child and reap it. A request against an already-exited child is a
/// no-op.
fn terminate(child: &mut Child) {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(?status, "child already exited");
        }
        _ => {
            if let Err(e) = child.kill() {
                debug!(error = %e, "kill was a no-op");
            }
            if let Err(e) = child.wait() {
                warn!(error = %e, "failed to reap child");
            }
        }
    }
}

/// Poll for a voluntary exit, bounded by `timeout`.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait().context("Failed to poll child status")? {
            Some(_) => return Ok(()),
            None => {
                if Instant::now() >= deadline {
                    anyhow::bail!("timeout waiting for child process");
                }
                std::thread::sleep(EXIT_POLL);
            }
        }
    }
}

/// Owns the running sampler child; dropping it terminates the sampler.
struct SamplerGuard {
    child: Option<Child>,
}

impl SamplerGuard {
    fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }
}

impl Drop for SamplerGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!("releasing metrics sampler");
            terminate(&mut child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn expired_deadline_returns_promptly_with_children_torn_down() {
        let task = TransferTask::new(TransferRole::Sender, sh("cat > /dev/null"), sh("sleep 60"))
            .with_deadline(Duration::ZERO);

        let start = Instant::now();
        task.run().unwrap();
        // The 60 s sampler must have been killed, not waited on.
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn sender_propagates_write_failure_after_peer_exits() {
        // Peer exits at once; the pipe buffer fills and writes start failing.
        let task = TransferTask::new(TransferRole::Sender, sh("exit 0"), sh("sleep 60"))
            .with_deadline(Duration::from_secs(30));

        let start = Instant::now();
        let err = task.run().unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(20), "run hung");
        assert!(format!("{err:#}").contains("write"), "unexpected error: {err:#}");
    }

    #[test]
    fn receiver_returns_when_peer_exits() {
        let task = TransferTask::new(TransferRole::Receiver, sh("exit 0"), sh("sleep 60"));
        let start = Instant::now();
        task.run().unwrap();
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn sampler_spawn_failure_is_fatal_and_tears_down_transfer() {
        let task = TransferTask::new(
            TransferRole::Receiver,
            sh("sleep 60"),
            Command::new("/nonexistent/cc-lab-no-such-binary"),
        );
        let start = Instant::now();
        assert!(task.run().is_err());
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
