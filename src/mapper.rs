//! Map worker: parse a block of input files into one table and write it out.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::common::MapReduceApp;
use crate::error::{Error, Result};
use crate::table::Table;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapStats {
    pub lines: u64,
    pub skipped: u64,
    pub keys: usize,
}

/// Feeds every line of `path` through `app`, counting keys into `table`.
pub fn map_file(
    app: &dyn MapReduceApp,
    table: &mut Table,
    path: &Path,
    stats: &mut MapStats,
) -> Result<()> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| Error::io(path, e))?;
        if n == 0 {
            break;
        }
        stats.lines += 1;
        let line = String::from_utf8_lossy(&buf);
        match app.map(line.trim_end_matches('\n')) {
            Some(key) => table.upsert(&key)?,
            None => stats.skipped += 1,
        }
    }
    debug!(path = %path.display(), lines = stats.lines, "mapped file");
    Ok(())
}

/// Builds one table over all `inputs` and serializes it to `output`.
pub fn run_map(app: &dyn MapReduceApp, output: &Path, inputs: &[PathBuf]) -> Result<MapStats> {
    let mut table = Table::create()?;
    let mut stats = MapStats::default();
    for input in inputs {
        map_file(app, &mut table, input, &mut stats)?;
    }
    table.serialize(output)?;
    stats.keys = table.len();
    info!(
        output = %output.display(),
        files = inputs.len(),
        lines = stats.lines,
        skipped = stats.skipped,
        keys = stats.keys,
        "map task finished"
    );
    Ok(stats)
}
