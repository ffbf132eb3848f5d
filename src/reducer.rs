//! Reduce worker: merge the keys of one range from every intermediate
//! artifact into a single table.

use std::ops::Range;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::common::{read_files_from_dir, MapReduceApp};
use crate::table::Table;

/// Merges the buckets of `src` whose partition key lies in `range`.
/// Returns how many buckets were kept.
pub fn reduce_table(
    app: &dyn MapReduceApp,
    acc: &mut Table,
    src: &Table,
    range: &Range<i64>,
) -> crate::error::Result<usize> {
    let mut kept = 0;
    for bucket in src.iter() {
        if range.contains(&app.partition_key(&bucket.key)) {
            acc.merge_count(&bucket.key, bucket.count)?;
            kept += 1;
        }
    }
    Ok(kept)
}

/// Reads every artifact in `input_dir`, keeps the keys in `range` and
/// writes the merged table to `output`.
pub fn run_reduce(
    app: &dyn MapReduceApp,
    input_dir: &Path,
    output: &Path,
    range: Range<i64>,
) -> anyhow::Result<Table> {
    let artifacts = read_files_from_dir(input_dir)?;
    let mut table = Table::create()?;
    for path in &artifacts {
        let src = Table::deserialize(path)
            .with_context(|| format!("failed to reduce file {}", path.display()))?;
        let kept = reduce_table(app, &mut table, &src, &range)?;
        debug!(path = %path.display(), buckets = src.len(), kept, "reduced artifact");
    }
    table
        .serialize(output)
        .context("failed to write output file")?;
    info!(
        output = %output.display(),
        artifacts = artifacts.len(),
        start = range.start,
        end = range.end,
        keys = table.len(),
        "reduce task finished"
    );
    Ok(table)
}
