//! Orchestrator command line and the resolved run configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

pub const MAP_BIN: &str = "logmr-map";
pub const REDUCE_BIN: &str = "logmr-reduce";

/// Upper bound on mappers and on reducers for one run.
pub const MAX_WORKERS: i64 = 4096;

#[derive(Parser, Debug)]
#[command(name = "logmr", about = "Count requests per client IP with map/reduce workers")]
pub struct Cli {
    /// Directory of access-log files
    pub input_dir: PathBuf,

    /// Number of map workers
    #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_WORKERS))]
    pub mappers: u32,

    /// Number of reduce workers
    #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_WORKERS))]
    pub reducers: u32,

    /// Where the intermediate/ and out/ staging directories are created
    #[arg(long, env = "LOGMR_WORK_DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Map worker executable (default: next to this binary)
    #[arg(long, env = "LOGMR_MAP_BIN")]
    pub map_bin: Option<PathBuf>,

    /// Reduce worker executable (default: next to this binary)
    #[arg(long, env = "LOGMR_REDUCE_BIN")]
    pub reduce_bin: Option<PathBuf>,

    /// Kill any worker still running after this many seconds
    #[arg(long, env = "LOGMR_WORKER_TIMEOUT")]
    pub worker_timeout: Option<u64>,

    /// Count in-process without spawning workers
    #[arg(long)]
    pub sequential: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub mappers: usize,
    pub reducers: usize,
    pub work_dir: PathBuf,
    pub map_bin: PathBuf,
    pub reduce_bin: PathBuf,
    pub worker_timeout: Option<Duration>,
    /// Filter handed to workers through `RUST_LOG`
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn into_config(self, log_filter: Option<String>) -> anyhow::Result<RunConfig> {
        let map_bin = match self.map_bin {
            Some(path) => path,
            None => sibling_exe(MAP_BIN)?,
        };
        let reduce_bin = match self.reduce_bin {
            Some(path) => path,
            None => sibling_exe(REDUCE_BIN)?,
        };
        Ok(RunConfig {
            input_dir: self.input_dir,
            mappers: self.mappers as usize,
            reducers: self.reducers as usize,
            work_dir: self.work_dir,
            map_bin,
            reduce_bin,
            worker_timeout: self.worker_timeout.map(Duration::from_secs),
            log_filter,
        })
    }
}

/// `name` in the directory of the running executable.
pub fn sibling_exe(name: &str) -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("failed to locate current executable")?;
    Ok(exe.with_file_name(format!("{}{}", name, std::env::consts::EXE_SUFFIX)))
}

impl RunConfig {
    pub fn intermediate_dir(&self) -> PathBuf {
        self.work_dir.join("intermediate")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.work_dir.join("out")
    }

    pub fn intermediate_path(&self, index: usize) -> PathBuf {
        indexed(&self.intermediate_dir(), index)
    }

    pub fn output_path(&self, index: usize) -> PathBuf {
        indexed(&self.output_dir(), index)
    }
}

fn indexed(dir: &Path, index: usize) -> PathBuf {
    dir.join(index.to_string())
}
