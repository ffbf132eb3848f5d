use std::io::{self, Write};

use anyhow::Context;
use tracing::{debug, info};

use crate::common::{fresh_dir, read_files_from_dir, Task};
use crate::config::RunConfig;
use crate::partition::{partition_files, partition_keyspace};
use crate::table::Table;

use super::worker_pool::{Phase, WorkerPool};

pub struct Coordinator {
    config: RunConfig,
    key_space: usize,
    pool: WorkerPool,
}

impl Coordinator {
    pub fn new(config: RunConfig, key_space: usize, pool: WorkerPool) -> Self {
        Self {
            config,
            key_space,
            pool,
        }
    }

    /// Map phase, barrier, reduce phase, barrier, then load the results.
    /// A failed phase stops the run before the next one starts.
    pub async fn start(&self) -> anyhow::Result<Vec<Table>> {
        let files = read_files_from_dir(&self.config.input_dir)?;
        info!(
            input = %self.config.input_dir.display(),
            files = files.len(),
            mappers = self.config.mappers,
            reducers = self.config.reducers,
            "discovered input files"
        );

        let map_tasks = self.map_tasks(&files);
        fresh_dir(self.config.intermediate_dir())?;
        self.pool
            .run_phase(Phase::Map, &map_tasks)
            .await
            .ensure_success()?;

        let reduce_tasks = self.reduce_tasks();
        fresh_dir(self.config.output_dir())?;
        self.pool
            .run_phase(Phase::Reduce, &reduce_tasks)
            .await
            .ensure_success()?;

        self.collect_results()
    }

    fn map_tasks(&self, files: &[std::path::PathBuf]) -> Vec<Task> {
        partition_files(files, self.config.mappers)
            .into_iter()
            .enumerate()
            .filter_map(|(i, block)| {
                if block.is_empty() {
                    debug!(mapper = i, "no files left, mapper not started");
                    return None;
                }
                Some(Task::Map(self.config.intermediate_path(i), block))
            })
            .collect()
    }

    fn reduce_tasks(&self) -> Vec<Task> {
        partition_keyspace(self.key_space, self.config.reducers)
            .into_iter()
            .enumerate()
            .filter_map(|(i, range)| {
                if range.is_empty() {
                    debug!(reducer = i, "empty key range, reducer not started");
                    return None;
                }
                Some(Task::Reduce(
                    self.config.intermediate_dir(),
                    self.config.output_path(i),
                    range,
                ))
            })
            .collect()
    }

    fn collect_results(&self) -> anyhow::Result<Vec<Table>> {
        let mut tables = Vec::new();
        for path in read_files_from_dir(self.config.output_dir())? {
            let table = Table::deserialize(&path)
                .with_context(|| format!("Failed to read output file: {}", path.display()))?;
            tables.push(table);
        }
        Ok(tables)
    }
}

/// Writes `<key> - <count>` for every bucket, table by table.
pub fn render_results(tables: &[Table], out: &mut impl Write) -> io::Result<()> {
    for table in tables {
        for bucket in table.iter() {
            writeln!(out, "{} - {}", bucket.key, bucket.count)?;
        }
    }
    out.flush()
}
