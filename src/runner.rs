use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, trace, warn};

use crate::config::BenchConfig;
use crate::error::{BootError, Result};
use crate::prober::Prober;
use crate::stats::{Measurement, RunSet, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    DryRun,
    Counted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    PhaseStarted(Phase),
    Measured {
        phase: Phase,
        index: u32,
        measurement: Measurement,
    },
}

/// Drives the boot-and-measure cycle. Runs never overlap: each child is reaped
/// before the next one is spawned.
pub struct Runner {
    config: BenchConfig,
}

impl Runner {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    /// Spawns the server and busy-polls it until a probe succeeds.
    pub async fn measure_once(&self) -> Result<Measurement> {
        let prober = Prober::new(self.config.mode, &self.config.target)?;

        let start = Instant::now();
        let mut child = Command::new(&self.config.executable)
            .args(&self.config.args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BootError::Spawn {
                executable: self.config.executable.clone(),
                source,
            })?;
        debug!(pid = child.id(), executable = %self.config.executable, "spawned server");

        // With max_wait set, every attempt is bounded too: a server that accepts
        // but never answers must not outlive the deadline.
        let deadline = self.config.max_wait.map(|max_wait| start + max_wait);
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            let attempt = match deadline {
                Some(deadline) => match timeout_at(deadline, prober.probe()).await {
                    Ok(attempt) => attempt,
                    Err(_) => return give_up(&mut child, start).await,
                },
                None => prober.probe().await,
            };
            match attempt {
                Ok(conn) => {
                    let elapsed = start.elapsed();
                    if let Err(e) = conn.release().await {
                        warn!("releasing {} probe failed: {:?}", prober.mode(), e);
                    }
                    teardown(&mut child).await?;
                    return Ok(Measurement { elapsed, attempts });
                }
                Err(e) => trace!(attempts, "probe not ready: {:?}", e),
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return give_up(&mut child, start).await;
            }
            // No sleep between attempts, only let the runtime make progress.
            tokio::task::yield_now().await;
        }
    }

    /// Dry runs, then counted runs, then statistics over the counted runs.
    pub async fn benchmark<F>(&self, mut observer: F) -> Result<Summary>
    where
        F: FnMut(RunEvent),
    {
        info!(
            mode = %self.config.mode,
            target = %self.config.target,
            dry_runs = self.config.dry_runs,
            runs = self.config.runs,
            "starting benchmark"
        );

        observer(RunEvent::PhaseStarted(Phase::DryRun));
        for index in 0..self.config.dry_runs {
            let measurement = self.measure_once().await?;
            observer(RunEvent::Measured {
                phase: Phase::DryRun,
                index,
                measurement,
            });
            self.pause().await;
        }

        let mut runs = RunSet::with_capacity(self.config.runs as usize);
        observer(RunEvent::PhaseStarted(Phase::Counted));
        for index in 0..self.config.runs {
            let measurement = self.measure_once().await?;
            runs.push(measurement);
            observer(RunEvent::Measured {
                phase: Phase::Counted,
                index,
                measurement,
            });
            self.pause().await;
        }

        let summary = Summary::compute(&runs)?;
        info!(runs = summary.count, median = ?summary.median, "benchmark finished");
        Ok(summary)
    }

    async fn pause(&self) {
        if !self.config.pause.is_zero() {
            sleep(self.config.pause).await;
        }
    }
}

async fn give_up(child: &mut Child, start: Instant) -> Result<Measurement> {
    let waited = start.elapsed();
    teardown(child).await?;
    Err(BootError::Timeout { waited })
}

async fn teardown(child: &mut Child) -> Result<()> {
    let pid = child.id();
    // kill() sends SIGKILL and waits for the exit, so the next spawn never overlaps.
    child.kill().await.map_err(BootError::Teardown)?;
    debug!(pid, "server stopped");
    Ok(())
}
