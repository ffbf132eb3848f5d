use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::common::Task;
use crate::config::RunConfig;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Map => "Map",
            Phase::Reduce => "Reduce",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How one worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Succeeded,
    /// Nonzero exit code, or `None` when killed by a signal
    Exited(Option<i32>),
    SpawnFailed(String),
    WaitFailed(String),
    TimedOut(Duration),
}

impl WorkerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerOutcome::Succeeded)
    }
}

impl fmt::Display for WorkerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerOutcome::Succeeded => write!(f, "succeeded"),
            WorkerOutcome::Exited(Some(code)) => write!(f, "exited with status {code}"),
            WorkerOutcome::Exited(None) => write!(f, "terminated by signal"),
            WorkerOutcome::SpawnFailed(e) => write!(f, "could not be started: {e}"),
            WorkerOutcome::WaitFailed(e) => write!(f, "could not be waited on: {e}"),
            WorkerOutcome::TimedOut(limit) => write!(f, "killed after {}s", limit.as_secs()),
        }
    }
}

#[async_trait]
pub trait WorkerLauncher: Send + Sync {
    /// Runs `task` to completion. Never returns before the worker is gone.
    async fn launch(&self, index: usize, task: &Task) -> WorkerOutcome;
}

/// Runs each task as a `logmr-map` / `logmr-reduce` child process.
pub struct ProcessLauncher {
    map_bin: PathBuf,
    reduce_bin: PathBuf,
    timeout: Option<Duration>,
    log_filter: Option<String>,
}

impl ProcessLauncher {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            map_bin: config.map_bin.clone(),
            reduce_bin: config.reduce_bin.clone(),
            timeout: config.worker_timeout,
            log_filter: config.log_filter.clone(),
        }
    }

    fn command(&self, task: &Task) -> Command {
        let mut cmd = match task {
            Task::Map(output, inputs) => {
                let mut cmd = Command::new(&self.map_bin);
                cmd.arg(output).args(inputs);
                cmd
            }
            Task::Reduce(input_dir, output, range) => {
                let mut cmd = Command::new(&self.reduce_bin);
                cmd.arg(input_dir)
                    .arg(output)
                    .arg(range.start.to_string())
                    .arg(range.end.to_string());
                cmd
            }
        };
        if let Some(filter) = &self.log_filter {
            cmd.env("RUST_LOG", filter);
        }
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl WorkerLauncher for ProcessLauncher {
    async fn launch(&self, index: usize, task: &Task) -> WorkerOutcome {
        let mut child = match self.command(task).spawn() {
            Ok(child) => child,
            Err(e) => return WorkerOutcome::SpawnFailed(e.to_string()),
        };
        debug!(index, pid = ?child.id(), "worker started");

        let status = match self.timeout {
            None => child.wait().await,
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        warn!(index, "failed to kill timed out worker: {}", e);
                    }
                    return WorkerOutcome::TimedOut(limit);
                }
            },
        };

        match status {
            Ok(status) if status.success() => WorkerOutcome::Succeeded,
            Ok(status) => WorkerOutcome::Exited(status.code()),
            Err(e) => WorkerOutcome::WaitFailed(e.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct PhaseReport {
    pub phase: Phase,
    pub outcomes: Vec<WorkerOutcome>,
}

impl PhaseReport {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    pub fn ensure_success(&self) -> crate::error::Result<()> {
        match self.failed() {
            0 => Ok(()),
            failed => Err(Error::ProcessFailure {
                phase: self.phase.name(),
                failed,
                total: self.outcomes.len(),
            }),
        }
    }
}

pub struct WorkerPool {
    launcher: Arc<dyn WorkerLauncher>,
}

impl WorkerPool {
    pub fn new(launcher: Arc<dyn WorkerLauncher>) -> WorkerPool {
        WorkerPool { launcher }
    }

    /// Starts every task, then waits for all of them, failed or not.
    pub async fn run_phase(&self, phase: Phase, tasks: &[Task]) -> PhaseReport {
        info!(%phase, workers = tasks.len(), "starting phase");
        let runs = tasks.iter().enumerate().map(|(index, task)| {
            let launcher = Arc::clone(&self.launcher);
            async move {
                let outcome = launcher.launch(index, task).await;
                if outcome.is_success() {
                    debug!(%phase, index, "worker done");
                } else {
                    warn!(
                        %phase,
                        index,
                        output = %task.output().display(),
                        "worker {}",
                        outcome
                    );
                }
                outcome
            }
        });
        let outcomes = join_all(runs).await;
        let report = PhaseReport { phase, outcomes };
        info!(%phase, failed = report.failed(), "phase finished");
        report
    }
}
